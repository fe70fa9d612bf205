//! WebAssembly module for the Krishi Mitra dashboard
//!
//! Lets the browser views run the same checks and reshaping as the
//! orchestrator:
//! - Location and prediction form validation
//! - Normalization of raw endpoint bodies
//! - State and region lookups
//!
//! Values cross the boundary as JSON strings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::{build_prediction_input, normalize_answer, normalize_prediction, normalize_weather};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("krishi-mitra-wasm loaded"));
}

/// Normalize a raw `/weather` body into a weather snapshot (JSON)
///
/// Never fails: unreadable bodies become an error snapshot.
#[wasm_bindgen]
pub fn normalize_weather_payload(raw_json: &str) -> String {
    let fetched_at = DateTime::from_timestamp_millis(js_sys::Date::now() as i64)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let snapshot = weather_snapshot(raw_json, fetched_at);
    if let Some(error) = snapshot.error_message() {
        warn(error);
    }
    to_json(&snapshot)
}

/// Normalize a raw `/predict` body for the input that was submitted
#[wasm_bindgen]
pub fn normalize_prediction_payload(raw_json: &str, input_json: &str) -> Result<String, JsValue> {
    prediction_result_json(raw_json, input_json).map_err(to_js_error)
}

/// Normalize a raw `/ask` body
#[wasm_bindgen]
pub fn normalize_answer_payload(raw_json: &str) -> String {
    let raw = serde_json::from_str(raw_json).unwrap_or(Value::Null);
    to_json(&normalize_answer(&raw))
}

/// Build the `/predict` request body from the form, location and weather
#[wasm_bindgen]
pub fn build_prediction_request(
    form_json: &str,
    location_json: &str,
    weather_json: &str,
) -> Result<String, JsValue> {
    prediction_request_json(form_json, location_json, weather_json).map_err(to_js_error)
}

/// Validate the location modal; returns the saved location as JSON
#[wasm_bindgen]
pub fn validate_location(town: &str, state: &str) -> Result<String, JsValue> {
    Location::new(town, state)
        .map(|location| to_json(&location))
        .map_err(|e| to_js_error(e.to_string()))
}

/// Whether the "predict yield" action may be offered
#[wasm_bindgen]
pub fn prediction_unlocked(location_json: &str, weather_json: &str) -> bool {
    let location = serde_json::from_str::<Location>(location_json).ok();
    let weather = serde_json::from_str::<WeatherSnapshot>(weather_json).ok();
    location.is_some() && weather.as_ref().and_then(WeatherSnapshot::report).is_some()
}

/// Whether a question should be sent to the assistant
#[wasm_bindgen]
pub fn is_askable_question(question: &str) -> bool {
    is_askable(question)
}

/// Region of a state, or `undefined` for an unknown name
#[wasm_bindgen]
pub fn region_for_state(state: &str) -> Option<String> {
    state
        .parse::<IndianState>()
        .ok()
        .map(|state| state.region().to_string())
}

/// Names offered by the state picker, as a JSON array
#[wasm_bindgen]
pub fn indian_states() -> String {
    let names: Vec<&str> = IndianState::ALL.iter().map(IndianState::name).collect();
    to_json(&names)
}

/// Generic failure text for `weather`, `prediction` or `ask`
#[wasm_bindgen]
pub fn fallback_error(operation: &str) -> Option<String> {
    parse_operation(operation).map(|op| op.fallback_error().to_string())
}

// ============================================================================
// JSON plumbing
// ============================================================================

fn parse_operation(name: &str) -> Option<Operation> {
    Operation::ALL
        .into_iter()
        .find(|op| op.name().eq_ignore_ascii_case(name.trim()))
}

fn weather_snapshot(raw_json: &str, fetched_at: DateTime<Utc>) -> WeatherSnapshot {
    match serde_json::from_str::<Value>(raw_json) {
        Ok(raw) => normalize_weather(&raw, fetched_at),
        Err(_) => WeatherSnapshot::error(Operation::Weather.fallback_error()),
    }
}

fn prediction_result_json(raw_json: &str, input_json: &str) -> Result<String, String> {
    let input: PredictionInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid prediction input: {}", e))?;
    let raw = serde_json::from_str(raw_json).unwrap_or(Value::Null);
    Ok(to_json(&normalize_prediction(&raw, &input)))
}

fn prediction_request_json(
    form_json: &str,
    location_json: &str,
    weather_json: &str,
) -> Result<String, String> {
    let form: PredictionForm =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form: {}", e))?;
    let location: Location =
        serde_json::from_str(location_json).map_err(|e| format!("Invalid location: {}", e))?;
    let weather: WeatherSnapshot =
        serde_json::from_str(weather_json).map_err(|e| format!("Invalid weather: {}", e))?;
    let report = weather
        .report()
        .ok_or_else(|| "Weather must load successfully before predicting.".to_string())?;

    build_prediction_input(&form, &location, report)
        .map(|input| to_json(&input))
        .map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn to_js_error(message: String) -> JsValue {
    warn(&message);
    JsValue::from_str(&message)
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}
