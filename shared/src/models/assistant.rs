//! Agronomy assistant models

use serde::{Deserialize, Serialize};

/// Request body for the assistant endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
}

/// Outcome of the most recent question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AiAnswer {
    Answer(String),
    Error(String),
}

impl AiAnswer {
    /// Text to show in the answer panel, whichever variant this is
    pub fn text(&self) -> &str {
        match self {
            AiAnswer::Answer(text) | AiAnswer::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AiAnswer::Error(_))
    }
}
