//! Crop yield prediction models

use serde::{Deserialize, Serialize};

use crate::types::Region;

/// Raw entries of the prediction modal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionForm {
    pub soil_type: String,
    pub crop: String,
    pub fertilizer_used: bool,
    pub irrigation_used: bool,
    /// Typed text; parsed when the input is built
    pub days_to_harvest: String,
}

/// Request body for the prediction endpoint
///
/// Field names on the wire are fixed by the model service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionInput {
    #[serde(rename = "Soil_Type")]
    pub soil_type: String,
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Fertilizer_Used")]
    pub fertilizer_used: bool,
    #[serde(rename = "Irrigation_Used")]
    pub irrigation_used: bool,
    #[serde(rename = "Days_to_Harvest")]
    pub days_to_harvest: i64,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Town")]
    pub town: String,
    #[serde(rename = "Temperature_Celsius")]
    pub temperature_celsius: f64,
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: String,
}

/// A successful yield prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldPrediction {
    pub predicted_yield_tons_per_hectare: f64,
    /// The input that was submitted for this prediction
    pub input_features: PredictionInput,
    pub live_rainfall_used_mm: f64,
    /// Features as the model service echoed them back
    #[serde(default)]
    pub model_features: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Result of the most recent prediction request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictionResult {
    Report(YieldPrediction),
    Error { error: String },
}

impl PredictionResult {
    pub fn error(message: impl Into<String>) -> Self {
        PredictionResult::Error {
            error: message.into(),
        }
    }

    pub fn report(&self) -> Option<&YieldPrediction> {
        match self {
            PredictionResult::Report(prediction) => Some(prediction),
            PredictionResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionResult::Report(_) => None,
            PredictionResult::Error { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PredictionResult::Error { .. })
    }
}
