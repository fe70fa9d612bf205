//! Location models

use serde::{Deserialize, Serialize};

use crate::types::IndianState;
use crate::validation::{validate_state, validate_town, ValidationError};

/// The user's farm location, captured once per session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub town: String,
    pub state: IndianState,
}

impl Location {
    /// Build a location from the picker's raw entries
    ///
    /// The town is trimmed; the state must be one of [`IndianState::ALL`].
    pub fn new(town: &str, state: &str) -> Result<Self, ValidationError> {
        validate_town(town)?;
        let state = validate_state(state)?;
        Ok(Self {
            town: town.trim().to_string(),
            state,
        })
    }
}
