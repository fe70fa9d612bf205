//! Error handling for the Krishi Mitra dashboard
//!
//! Validation and stage-gate errors are returned to the caller before any
//! network call is made. Transport and server errors never leave an
//! operation: they are turned into display text with [`DashboardError::user_message`]
//! and stored in the slot the success value would have occupied.

use std::time::Duration;

use shared::{NormalizeError, Operation, ValidationError};
use thiserror::Error;

/// Dashboard error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    // Errors raised before a request is issued
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // Errors produced by the network boundary
    #[error("Server responded with {status}")]
    Server { status: u16, detail: Option<String> },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DashboardError {
    /// Human-readable text for the operation's display slot
    ///
    /// Prefers the server's own `detail`; otherwise uses the operation's
    /// generic fallback.
    pub fn user_message(&self, op: Operation) -> String {
        match self {
            DashboardError::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            DashboardError::Server { .. } | DashboardError::Transport(_) => {
                op.fallback_error().to_string()
            }
            DashboardError::Timeout(limit) => {
                format!("The {} request timed out after {}.", op, describe(*limit))
            }
            DashboardError::MalformedResponse(reason) => reason.clone(),
            DashboardError::Validation(e) => e.message.clone(),
            DashboardError::InvalidStateTransition(msg) | DashboardError::Configuration(msg) => {
                msg.clone()
            }
        }
    }

    /// Whether this error was raised before any request left the dashboard
    pub fn is_rejected_before_request(&self) -> bool {
        matches!(
            self,
            DashboardError::Validation(_) | DashboardError::InvalidStateTransition(_)
        )
    }
}

fn describe(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{} seconds", limit.as_secs())
    } else {
        format!("{} ms", limit.as_millis())
    }
}

impl From<NormalizeError> for DashboardError {
    fn from(e: NormalizeError) -> Self {
        DashboardError::MalformedResponse(e.to_string())
    }
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_detail_wins_over_fallback() {
        let err = DashboardError::Server {
            status: 404,
            detail: Some("Could not fetch weather for town 'Atlantis'.".to_string()),
        };
        assert_eq!(
            err.user_message(Operation::Weather),
            "Could not fetch weather for town 'Atlantis'."
        );
    }

    #[test]
    fn test_fallback_messages() {
        let err = DashboardError::Server {
            status: 500,
            detail: None,
        };
        assert_eq!(
            err.user_message(Operation::Weather),
            "Weather data could not be fetched."
        );
        assert_eq!(
            err.user_message(Operation::Prediction),
            "Prediction request failed."
        );
        assert_eq!(
            DashboardError::Transport("connection refused".to_string())
                .user_message(Operation::Ask),
            "AI assistant is currently offline."
        );
    }

    #[test]
    fn test_blank_detail_falls_back() {
        let err = DashboardError::Server {
            status: 502,
            detail: Some("  ".to_string()),
        };
        assert_eq!(err.user_message(Operation::Ask), "AI assistant is currently offline.");
    }

    #[test]
    fn test_timeout_message() {
        let err = DashboardError::Timeout(Duration::from_secs(30));
        assert_eq!(
            err.user_message(Operation::Prediction),
            "The prediction request timed out after 30 seconds."
        );
    }
}
