//! Validation utilities for user-entered dashboard data
//!
//! Everything here runs before a request is built, so a failure means no
//! network call is made.

use thiserror::Error;

use crate::types::IndianState;

/// A rejected user entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate the town name (non-empty after trimming)
pub fn validate_town(town: &str) -> Result<(), ValidationError> {
    if town.trim().is_empty() {
        return Err(ValidationError::new("town", "Town is required"));
    }
    Ok(())
}

/// Validate and resolve the state picked from the fixed list
pub fn validate_state(state: &str) -> Result<IndianState, ValidationError> {
    if state.trim().is_empty() {
        return Err(ValidationError::new("state", "State is required"));
    }
    state
        .parse()
        .map_err(|e: crate::types::UnknownState| ValidationError::new("state", e.to_string()))
}

// ============================================================================
// Prediction Form Validations
// ============================================================================

/// Validate a required free-text form field
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    Ok(())
}

/// Parse the days-to-harvest entry as a whole number of days
///
/// Anything that is not a plain integer (including decimals and empty
/// text) is rejected instead of being submitted as a sentinel. This is
/// stricter than a browser `parseInt`, which would truncate `"12.5"` to 12,
/// read `"120 days"` as 120 and let `-3` through.
pub fn parse_days_to_harvest(value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Days_to_Harvest", "This field is required"));
    }
    let days: i64 = trimmed.parse().map_err(|_| {
        ValidationError::new(
            "Days_to_Harvest",
            format!("'{}' is not a whole number of days", trimmed),
        )
    })?;
    if days < 0 {
        return Err(ValidationError::new(
            "Days_to_Harvest",
            "Days to harvest cannot be negative",
        ));
    }
    Ok(days)
}

// ============================================================================
// Assistant Validations
// ============================================================================

/// Whether a question has any content worth sending
pub fn is_askable(question: &str) -> bool {
    !question.trim().is_empty()
}
