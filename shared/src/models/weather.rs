//! Weather data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the short-range forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    /// Display clock time, `HH:MM`
    pub time: String,
    pub temperature_c: f64,
    pub rain_probability_percent: f64,
    pub wind_speed_kmh: f64,
}

/// Fully populated current conditions plus forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub condition: String,
    /// Rain chance of the first forecast entry
    pub rain_probability_percent: f64,
    pub wind_speed_kmh: f64,
    pub humidity_percent: f64,
    pub fetched_at: DateTime<Utc>,
    pub forecast: Vec<ForecastPoint>,
}

/// Result of the most recent weather fetch
///
/// Replaced wholesale on every settlement; never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WeatherSnapshot {
    Report(WeatherReport),
    Error { error: String },
}

impl WeatherSnapshot {
    pub fn error(message: impl Into<String>) -> Self {
        WeatherSnapshot::Error {
            error: message.into(),
        }
    }

    /// The report, if this snapshot is not an error
    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            WeatherSnapshot::Report(report) => Some(report),
            WeatherSnapshot::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            WeatherSnapshot::Report(_) => None,
            WeatherSnapshot::Error { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WeatherSnapshot::Error { .. })
    }
}

/// Convert a wind speed from metres per second to kilometres per hour
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * 3.6
}
