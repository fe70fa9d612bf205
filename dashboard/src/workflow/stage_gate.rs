//! Stage gate
//!
//! Orders the dashboard's stages so a prediction can only be requested once
//! a location is set and a weather report has loaded without error. The two
//! blocking modals of the dashboard (location capture and prediction input)
//! are states of this machine:
//!
//! ```text
//! AwaitingLocation -> AwaitingWeather -> Ready <-> AwaitingPredictionInput
//!                           ^              |
//!                           +-- refresh ---+
//! ```

use serde::{Deserialize, Serialize};
use shared::{Location, WeatherSnapshot};

use crate::error::{DashboardError, DashboardResult};

/// Current stage of the dashboard session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Location modal is open and blocks everything else
    #[default]
    AwaitingLocation,
    /// Weather is loading; the dashboard is browsable
    AwaitingWeather,
    Ready,
    /// Prediction modal is open
    AwaitingPredictionInput,
}

impl Stage {
    pub fn location_modal_open(&self) -> bool {
        matches!(self, Stage::AwaitingLocation)
    }

    pub fn prediction_modal_open(&self) -> bool {
        matches!(self, Stage::AwaitingPredictionInput)
    }
}

/// State machine enforcing the location -> weather -> prediction ordering
#[derive(Debug, Clone, Default)]
pub struct StageGate {
    stage: Stage,
}

impl StageGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the prediction action may be offered at all
    pub fn prediction_unlocked(
        location: Option<&Location>,
        weather: Option<&WeatherSnapshot>,
    ) -> bool {
        location.is_some() && weather.and_then(WeatherSnapshot::report).is_some()
    }

    /// Save the location modal; single-shot per session
    pub fn save_location(&mut self, town: &str, state: &str) -> DashboardResult<Location> {
        if self.stage != Stage::AwaitingLocation {
            return Err(DashboardError::InvalidStateTransition(
                "Location has already been set for this session".to_string(),
            ));
        }
        let location = Location::new(town, state)?;
        self.stage = Stage::AwaitingWeather;
        Ok(location)
    }

    /// Weather settled, successfully or not; both unblock the dashboard
    pub fn weather_settled(&mut self) {
        if self.stage == Stage::AwaitingWeather {
            self.stage = Stage::Ready;
        }
    }

    /// Start an explicit weather retry for the saved location
    pub fn begin_weather_refresh(&mut self) -> DashboardResult<()> {
        match self.stage {
            Stage::AwaitingLocation => Err(DashboardError::InvalidStateTransition(
                "Set your location first.".to_string(),
            )),
            Stage::AwaitingPredictionInput => Err(DashboardError::InvalidStateTransition(
                "Close the prediction form before refreshing the weather.".to_string(),
            )),
            Stage::AwaitingWeather | Stage::Ready => {
                self.stage = Stage::AwaitingWeather;
                Ok(())
            }
        }
    }

    /// Check that a prediction may be requested right now
    pub fn check_prediction(
        &self,
        location: Option<&Location>,
        weather: Option<&WeatherSnapshot>,
    ) -> DashboardResult<()> {
        if location.is_none() {
            return Err(DashboardError::InvalidStateTransition(
                "Set your location first.".to_string(),
            ));
        }
        match weather {
            None => {
                return Err(DashboardError::InvalidStateTransition(
                    "Wait for the weather data to load.".to_string(),
                ))
            }
            Some(snapshot) if snapshot.is_error() => {
                return Err(DashboardError::InvalidStateTransition(
                    "Weather must load successfully before predicting.".to_string(),
                ))
            }
            Some(_) => {}
        }
        match self.stage {
            Stage::Ready | Stage::AwaitingPredictionInput => Ok(()),
            Stage::AwaitingLocation | Stage::AwaitingWeather => Err(
                DashboardError::InvalidStateTransition("Wait for the weather data to load.".to_string()),
            ),
        }
    }

    /// Open the prediction modal
    pub fn open_prediction_form(
        &mut self,
        location: Option<&Location>,
        weather: Option<&WeatherSnapshot>,
    ) -> DashboardResult<()> {
        self.check_prediction(location, weather)?;
        self.stage = Stage::AwaitingPredictionInput;
        Ok(())
    }

    /// Close the prediction modal; returns whether it was open
    pub fn close_prediction_form(&mut self) -> bool {
        if self.stage == Stage::AwaitingPredictionInput {
            self.stage = Stage::Ready;
            true
        } else {
            false
        }
    }
}
