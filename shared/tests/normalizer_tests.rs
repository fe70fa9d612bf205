//! Response normalizer tests
//!
//! Covers:
//! - Weather reshaping: field mapping, forecast order, unit conversion
//! - Failing closed on malformed payloads
//! - Prediction and assistant bodies

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{
    format_forecast_time, normalize_answer, normalize_prediction, normalize_weather,
    try_normalize_weather, AiAnswer, NormalizeError, PredictionInput, WeatherSnapshot,
};

fn fetched_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 3, 6, 0, 0).unwrap()
}

fn input() -> PredictionInput {
    PredictionInput {
        soil_type: "Clay".to_string(),
        crop: "Rice".to_string(),
        fertilizer_used: true,
        irrigation_used: true,
        days_to_harvest: 95,
        state: "West Bengal".to_string(),
        town: "Bardhaman".to_string(),
        temperature_celsius: 27.0,
        weather_condition: "Mist".to_string(),
    }
}

/// Forecast entry as (hour, temperature, rain chance, wind m/s)
type Entry = (u32, f64, Option<f64>, Option<f64>);

fn weather_body(temperature: f64, wind_mps: f64, humidity: f64, entries: &[Entry]) -> Value {
    let forecast: Vec<Value> = entries
        .iter()
        .map(|(hour, temp, rain, wind)| {
            let mut entry = json!({
                "datetime": format!("2024-11-03 {:02}:00:00", hour),
                "temperature_celsius": temp,
            });
            if let Some(rain) = rain {
                entry["rain_chance_percent"] = json!(rain);
            }
            if let Some(wind) = wind {
                entry["wind_speed_mps"] = json!(wind);
            }
            entry
        })
        .collect();

    json!({
        "current": {
            "current_conditions": {
                "temperature_celsius": temperature,
                "description": "Partly cloudy",
                "wind_speed_mps": wind_mps,
                "humidity_percent": humidity
            }
        },
        "forecast": { "forecast": forecast }
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test a typical feed entry without wind
    #[test]
    fn test_forecast_entry_without_wind() {
        let body = weather_body(24.0, 3.0, 70.0, &[(9, 25.0, Some(10.0), None)]);
        let report = try_normalize_weather(&body, fetched_at()).unwrap();

        assert_eq!(report.forecast.len(), 1);
        assert_eq!(report.forecast[0].time, "09:00");
        assert_eq!(report.forecast[0].wind_speed_kmh, 0.0);
        assert!((report.wind_speed_kmh - 10.8).abs() < 1e-9);
        assert_eq!(report.humidity_percent, 70.0);
    }

    /// Test missing rain chance on the first entry
    #[test]
    fn test_missing_rain_chance_defaults_to_zero() {
        let body = weather_body(24.0, 3.0, 70.0, &[(9, 25.0, None, None)]);
        let report = try_normalize_weather(&body, fetched_at()).unwrap();
        assert_eq!(report.rain_probability_percent, 0.0);
    }

    /// Test that an empty body is an error, not a zeroed report
    #[test]
    fn test_empty_object_is_error() {
        let snapshot = normalize_weather(&json!({}), fetched_at());
        assert!(snapshot.is_error());
        assert!(snapshot.report().is_none());
    }

    /// Test that an empty forecast is rejected
    #[test]
    fn test_empty_forecast() {
        let body = weather_body(24.0, 3.0, 70.0, &[]);
        assert_eq!(
            try_normalize_weather(&body, fetched_at()),
            Err(NormalizeError::EmptyForecast)
        );
        assert_eq!(
            normalize_weather(&body, fetched_at()),
            WeatherSnapshot::error("Weather forecast contained no entries")
        );
    }

    /// Test forecast time parsing failures
    #[test]
    fn test_unreadable_forecast_time() {
        assert!(format_forecast_time("").is_err());
        assert!(format_forecast_time("noon").is_err());
        assert!(format_forecast_time("2024-13-40 25:00:00").is_err());
    }

    /// Test that the region follows the submitted state
    #[test]
    fn test_prediction_region_follows_state() {
        let raw = json!({
            "predicted_yield_tons_per_hectare": 5.2,
            "live_rainfall_used_mm": 0.0
        });
        let result = normalize_prediction(&raw, &input());
        let prediction = result.report().unwrap();
        assert_eq!(prediction.region, Some(shared::Region::East));
        assert!(prediction.model_features.is_empty());
    }

    /// Test that a prediction body missing its yield fails closed
    #[test]
    fn test_prediction_without_yield() {
        let raw = json!({ "live_rainfall_used_mm": 3.0 });
        assert!(normalize_prediction(&raw, &input()).is_error());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn entry_strategy() -> impl Strategy<Value = Entry> {
        (
            0u32..24,
            -10.0f64..50.0,
            proptest::option::of(0.0f64..100.0),
            proptest::option::of(0.0f64..40.0),
        )
    }

    proptest! {
        /// A well-formed body maps field by field and keeps forecast order
        #[test]
        fn prop_weather_is_reshaped_faithfully(
            temperature in -10.0f64..50.0,
            wind in 0.0f64..40.0,
            humidity in 0.0f64..100.0,
            entries in prop::collection::vec(entry_strategy(), 1..10),
        ) {
            let body = weather_body(temperature, wind, humidity, &entries);
            let report = try_normalize_weather(&body, fetched_at()).unwrap();

            prop_assert_eq!(report.temperature_c, temperature);
            prop_assert_eq!(report.condition.as_str(), "Partly cloudy");
            prop_assert_eq!(report.humidity_percent, humidity);
            prop_assert!((report.wind_speed_kmh - wind * 3.6).abs() < 1e-9);
            prop_assert_eq!(report.rain_probability_percent, entries[0].2.unwrap_or(0.0));
            prop_assert_eq!(report.fetched_at, fetched_at());
            prop_assert_eq!(report.forecast.len(), entries.len());

            for (point, (hour, temp, rain, wind)) in report.forecast.iter().zip(&entries) {
                prop_assert_eq!(point.time.clone(), format!("{:02}:00", hour));
                prop_assert_eq!(point.temperature_c, *temp);
                prop_assert_eq!(point.rain_probability_percent, rain.unwrap_or(0.0));
                prop_assert!((point.wind_speed_kmh - wind.unwrap_or(0.0) * 3.6).abs() < 1e-9);
            }
        }

        /// Dropping any required field yields an error, never a partial report
        #[test]
        fn prop_missing_required_field_fails_closed(
            field in prop::sample::select(vec![
                "temperature_celsius",
                "description",
                "wind_speed_mps",
                "humidity_percent",
            ]),
        ) {
            let mut body = weather_body(30.0, 2.0, 50.0, &[(12, 31.0, Some(5.0), None)]);
            body["current"]["current_conditions"]
                .as_object_mut()
                .unwrap()
                .remove(field);

            let snapshot = normalize_weather(&body, fetched_at());
            prop_assert!(snapshot.is_error());
        }

        /// Arbitrary scalar bodies never normalize into a report
        #[test]
        fn prop_scalar_bodies_are_errors(text in ".*", number in any::<i64>()) {
            prop_assert!(normalize_weather(&json!(text), fetched_at()).is_error());
            prop_assert!(normalize_weather(&json!(number), fetched_at()).is_error());
            prop_assert!(normalize_prediction(&json!(number), &input()).is_error());
        }

        /// The assistant's answer is passed through verbatim
        #[test]
        fn prop_answer_text_is_verbatim(text in ".*") {
            let answer = normalize_answer(&json!({ "answer": text.clone() }));
            prop_assert_eq!(answer, AiAnswer::Answer(text));
        }

        /// A model-service error body always becomes the prediction error
        #[test]
        fn prop_prediction_error_body_wins(message in "[A-Za-z .]{1,40}") {
            let raw = json!({
                "error": message.clone(),
                "predicted_yield_tons_per_hectare": 1.0,
                "live_rainfall_used_mm": 0.0
            });
            let result = normalize_prediction(&raw, &input());
            prop_assert_eq!(result.error_message(), Some(message.as_str()));
        }
    }
}
