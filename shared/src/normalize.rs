//! Response normalization
//!
//! Reshapes the raw JSON bodies of the weather, prediction and assistant
//! endpoints into the dashboard's models. Every function here is pure: no
//! I/O, no clock, no shared state. Malformed payloads fail closed into the
//! error shape of the target model instead of being patched with defaults.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    mps_to_kmh, AiAnswer, ForecastPoint, Location, PredictionForm, PredictionInput,
    PredictionResult, WeatherReport, WeatherSnapshot, YieldPrediction,
};
use crate::types::IndianState;
use crate::validation::{parse_days_to_harvest, validate_required, ValidationError};

/// Naive timestamp layouts the forecast feed is known to emit
const NAIVE_FORECAST_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Why a payload could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{payload} response was malformed: {reason}")]
    Malformed {
        payload: &'static str,
        reason: String,
    },

    #[error("Weather forecast contained no entries")]
    EmptyForecast,

    #[error("Forecast time '{0}' could not be read")]
    InvalidTimestamp(String),

    /// The service answered successfully but reported its own failure
    #[error("{0}")]
    Rejected(String),
}

// ============================================================================
// Raw payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawWeatherPayload {
    current: RawCurrent,
    forecast: RawForecast,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    current_conditions: RawConditions,
}

#[derive(Debug, Deserialize)]
struct RawConditions {
    temperature_celsius: f64,
    description: String,
    wind_speed_mps: f64,
    humidity_percent: f64,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    forecast: Vec<RawForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct RawForecastEntry {
    datetime: String,
    temperature_celsius: f64,
    // The upstream forecast feed omits wind and occasionally rain chance
    #[serde(default)]
    rain_chance_percent: Option<f64>,
    #[serde(default)]
    wind_speed_mps: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    predicted_yield_tons_per_hectare: f64,
    live_rainfall_used_mm: f64,
    #[serde(default)]
    input_features: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAnswer {
    answer: String,
}

// ============================================================================
// Weather
// ============================================================================

/// Normalize a `/weather` body into a snapshot
///
/// Total: any failure becomes [`WeatherSnapshot::Error`].
pub fn normalize_weather(raw: &Value, fetched_at: DateTime<Utc>) -> WeatherSnapshot {
    match try_normalize_weather(raw, fetched_at) {
        Ok(report) => WeatherSnapshot::Report(report),
        Err(e) => WeatherSnapshot::error(e.to_string()),
    }
}

/// Normalize a `/weather` body, keeping the failure reason
pub fn try_normalize_weather(
    raw: &Value,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherReport, NormalizeError> {
    let payload = RawWeatherPayload::deserialize(raw).map_err(|e| NormalizeError::Malformed {
        payload: "Weather",
        reason: e.to_string(),
    })?;

    let conditions = payload.current.current_conditions;
    let first = payload
        .forecast
        .forecast
        .first()
        .ok_or(NormalizeError::EmptyForecast)?;
    let rain_probability_percent = first.rain_chance_percent.unwrap_or(0.0);

    let forecast = payload
        .forecast
        .forecast
        .iter()
        .map(|entry| {
            Ok(ForecastPoint {
                time: format_forecast_time(&entry.datetime)?,
                temperature_c: entry.temperature_celsius,
                rain_probability_percent: entry.rain_chance_percent.unwrap_or(0.0),
                wind_speed_kmh: mps_to_kmh(entry.wind_speed_mps.unwrap_or(0.0)),
            })
        })
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    Ok(WeatherReport {
        temperature_c: conditions.temperature_celsius,
        condition: conditions.description,
        rain_probability_percent,
        wind_speed_kmh: mps_to_kmh(conditions.wind_speed_mps),
        humidity_percent: conditions.humidity_percent,
        fetched_at,
        forecast,
    })
}

/// Format a forecast timestamp as a two-digit `HH:MM` clock time
///
/// Offset-qualified timestamps keep the wall clock of their own offset;
/// naive ones are taken as already local to the forecast location.
pub fn format_forecast_time(raw: &str) -> Result<String, NormalizeError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.format("%H:%M").to_string());
    }
    NAIVE_FORECAST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .ok_or_else(|| NormalizeError::InvalidTimestamp(raw.to_string()))
}

// ============================================================================
// Prediction
// ============================================================================

/// Merge the form with the current location and weather into a request
///
/// Takes a point-in-time copy of the location and report; later weather
/// refreshes do not affect an input that was already built.
pub fn build_prediction_input(
    form: &PredictionForm,
    location: &Location,
    weather: &WeatherReport,
) -> Result<PredictionInput, ValidationError> {
    validate_required("Soil_Type", &form.soil_type)?;
    validate_required("Crop", &form.crop)?;
    let days_to_harvest = parse_days_to_harvest(&form.days_to_harvest)?;

    Ok(PredictionInput {
        soil_type: form.soil_type.clone(),
        crop: form.crop.clone(),
        fertilizer_used: form.fertilizer_used,
        irrigation_used: form.irrigation_used,
        days_to_harvest,
        state: location.state.name().to_string(),
        town: location.town.clone(),
        temperature_celsius: weather.temperature_c,
        weather_condition: weather.condition.clone(),
    })
}

/// Normalize a `/predict` body for the input that produced it
pub fn normalize_prediction(raw: &Value, submitted: &PredictionInput) -> PredictionResult {
    match try_normalize_prediction(raw, submitted) {
        Ok(prediction) => PredictionResult::Report(prediction),
        Err(e) => PredictionResult::error(e.to_string()),
    }
}

/// Normalize a `/predict` body, keeping the failure reason
pub fn try_normalize_prediction(
    raw: &Value,
    submitted: &PredictionInput,
) -> Result<YieldPrediction, NormalizeError> {
    // The model service answers 200 with an `error` field when it cannot predict
    if let Some(error) = raw.get("error").and_then(Value::as_str) {
        return Err(NormalizeError::Rejected(error.to_string()));
    }

    let payload = RawPrediction::deserialize(raw).map_err(|e| NormalizeError::Malformed {
        payload: "Prediction",
        reason: e.to_string(),
    })?;

    Ok(YieldPrediction {
        predicted_yield_tons_per_hectare: payload.predicted_yield_tons_per_hectare,
        input_features: submitted.clone(),
        live_rainfall_used_mm: payload.live_rainfall_used_mm,
        model_features: payload.input_features.unwrap_or_default(),
        region: submitted
            .state
            .parse::<IndianState>()
            .ok()
            .map(|state| state.region()),
    })
}

// ============================================================================
// Assistant
// ============================================================================

/// Normalize an `/ask` body; the answer text is kept verbatim
pub fn normalize_answer(raw: &Value) -> AiAnswer {
    match RawAnswer::deserialize(raw) {
        Ok(payload) => AiAnswer::Answer(payload.answer),
        Err(e) => AiAnswer::Error(
            NormalizeError::Malformed {
                payload: "Assistant",
                reason: e.to_string(),
            }
            .to_string(),
        ),
    }
}
