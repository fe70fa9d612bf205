//! Operation families and their status

use std::fmt;

use serde::{Deserialize, Serialize};

/// An independently tracked asynchronous activity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Weather,
    Prediction,
    Ask,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Weather, Operation::Prediction, Operation::Ask];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Weather => "weather",
            Operation::Prediction => "prediction",
            Operation::Ask => "ask",
        }
    }

    /// Message shown when the server gives no reason for a failure
    pub fn fallback_error(&self) -> &'static str {
        match self {
            Operation::Weather => "Weather data could not be fetched.",
            Operation::Prediction => "Prediction request failed.",
            Operation::Ask => "AI assistant is currently offline.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loading and error state of one operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationState {
    pub in_flight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Status of every operation family; keys are fixed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationStatus {
    pub weather: OperationState,
    pub prediction: OperationState,
    pub ask: OperationState,
}

impl OperationStatus {
    pub fn get(&self, op: Operation) -> &OperationState {
        match op {
            Operation::Weather => &self.weather,
            Operation::Prediction => &self.prediction,
            Operation::Ask => &self.ask,
        }
    }

    pub fn get_mut(&mut self, op: Operation) -> &mut OperationState {
        match op {
            Operation::Weather => &mut self.weather,
            Operation::Prediction => &mut self.prediction,
            Operation::Ask => &mut self.ask,
        }
    }

    pub fn in_flight(&self, op: Operation) -> bool {
        self.get(op).in_flight
    }

    pub fn any_in_flight(&self) -> bool {
        Operation::ALL.iter().any(|op| self.in_flight(*op))
    }
}
