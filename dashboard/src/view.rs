//! Text rendering of the dashboard
//!
//! Stateless: every function takes a published [`DashboardView`] (or part
//! of it) and returns what the terminal should show.

use shared::{AiAnswer, Operation, PredictionResult, WeatherSnapshot};

use crate::workflow::{DashboardView, Stage};

pub const WEATHER_PLACEHOLDER: &str = "Please set your location to get weather data.";
pub const PREDICTION_PLACEHOLDER: &str = "Type `predict` to generate a yield prediction.";
pub const ANSWER_PLACEHOLDER: &str = "Ask me a question about agriculture!";

/// Render the whole dashboard
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();

    out.push_str("== Krishi Mitra ==\n");
    if let Some(location) = &view.location {
        out.push_str(&format!("Location: {}, {}\n", location.town, location.state));
    }
    if let Some(prompt) = stage_prompt(view.stage) {
        out.push_str(prompt);
        out.push('\n');
    }

    out.push_str("\n-- Weather --\n");
    out.push_str(&render_weather(
        view.weather.as_ref(),
        view.status.in_flight(Operation::Weather),
    ));

    out.push_str("\n-- Yield Prediction --\n");
    out.push_str(&render_prediction(
        view.prediction.as_ref(),
        view.status.in_flight(Operation::Prediction),
    ));
    out.push_str(&format!("[{}]\n", prediction_action_label(view)));

    out.push_str("\n-- Ask KrishiMitra AI --\n");
    out.push_str(&render_answer(
        view.answer.as_ref(),
        view.status.in_flight(Operation::Ask),
    ));

    out
}

fn stage_prompt(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::AwaitingLocation => {
            Some("Set your location first: location <town>, <state>  (see `states`)")
        }
        Stage::AwaitingPredictionInput => Some("Prediction form is open."),
        Stage::AwaitingWeather | Stage::Ready => None,
    }
}

/// Render the weather panel
pub fn render_weather(weather: Option<&WeatherSnapshot>, loading: bool) -> String {
    let report = match weather {
        None if loading => return "Loading weather...\n".to_string(),
        None => return format!("{}\n", WEATHER_PLACEHOLDER),
        Some(WeatherSnapshot::Error { error }) => return format!("{}\n", error),
        Some(WeatherSnapshot::Report(report)) => report,
    };

    let mut out = format!(
        "{:.0}°C  {}{}\n{:.0}% rain  {:.0} km/h wind  {:.0}% humidity\nUpdated {}\n",
        report.temperature_c,
        report.condition,
        if loading { "  (refreshing...)" } else { "" },
        report.rain_probability_percent,
        report.wind_speed_kmh,
        report.humidity_percent,
        report.fetched_at.format("%H:%M:%S UTC"),
    );
    for point in &report.forecast {
        out.push_str(&format!(
            "  {}  {:>5.1}°C  {:>3.0}% rain  {:>4.0} km/h\n",
            point.time, point.temperature_c, point.rain_probability_percent, point.wind_speed_kmh
        ));
    }
    out
}

/// Render the prediction panel
pub fn render_prediction(prediction: Option<&PredictionResult>, loading: bool) -> String {
    if loading {
        return "Calculating...\n".to_string();
    }
    match prediction {
        None => format!("{}\n", PREDICTION_PLACEHOLDER),
        Some(PredictionResult::Error { error }) => format!("{}\n", error),
        Some(PredictionResult::Report(prediction)) => {
            let mut out = format!(
                "Predicted yield for {}: {} tons/ha\nCalculated using {}mm of live rainfall data.\n",
                prediction.input_features.crop,
                prediction.predicted_yield_tons_per_hectare,
                prediction.live_rainfall_used_mm,
            );
            if let Some(region) = prediction.region {
                out.push_str(&format!("Region: {}\n", region));
            }
            out
        }
    }
}

/// Label of the prediction action, reflecting whether it is available
pub fn prediction_action_label(view: &DashboardView) -> String {
    if view.status.in_flight(Operation::Prediction) {
        return "Calculating...".to_string();
    }
    let town = view
        .location
        .as_ref()
        .map(|l| l.town.as_str())
        .unwrap_or("your town");
    if view.prediction_unlocked {
        format!("Predict Yield in {}", town)
    } else {
        format!("Predict Yield in {} (unavailable)", town)
    }
}

/// Render the assistant panel
pub fn render_answer(answer: Option<&AiAnswer>, loading: bool) -> String {
    if loading {
        return "Thinking...\n".to_string();
    }
    match answer {
        None => format!("{}\n", ANSWER_PLACEHOLDER),
        Some(AiAnswer::Answer(text)) => format!("{}\n", text),
        Some(AiAnswer::Error(text)) => format!("(unavailable) {}\n", text),
    }
}
