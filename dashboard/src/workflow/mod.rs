//! Asynchronous workflow orchestration
//!
//! The orchestrator owns every piece of session state and republishes it to
//! the views as an immutable [`DashboardView`] after each change.

pub mod orchestrator;
pub mod stage_gate;
pub mod teardown;
pub mod tracker;

use serde::Serialize;
use shared::{AiAnswer, Location, OperationStatus, PredictionResult, WeatherSnapshot};

pub use orchestrator::{OrchestratorSettings, WorkflowOrchestrator};
pub use stage_gate::{Stage, StageGate};
pub use teardown::TeardownToken;
pub use tracker::OperationTracker;

/// Read-only snapshot handed to the presentational layer
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardView {
    pub stage: Stage,
    pub location: Option<Location>,
    pub weather: Option<WeatherSnapshot>,
    pub prediction: Option<PredictionResult>,
    pub answer: Option<AiAnswer>,
    pub status: OperationStatus,
    /// Whether the "predict yield" action may be offered
    pub prediction_unlocked: bool,
}

/// What became of an operation's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result was stored and published
    Applied,
    /// The result was dropped: the view was torn down, or a newer request
    /// of the same operation superseded it
    Discarded,
    /// Nothing to do (e.g. a blank question)
    Skipped,
}
