//! Workflow orchestrator
//!
//! Turns the three user intents (save location, submit the prediction form,
//! ask a question) into network calls, normalizes what comes back and
//! publishes the consolidated state.
//!
//! Operations of different families run concurrently; nothing here holds a
//! lock across an `.await`. Each call is bounded by the configured request
//! timeout. Once the orchestrator is torn down, new intents are ignored and
//! results of calls already in flight are dropped before they touch state.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use shared::{
    build_prediction_input, is_askable, normalize_answer, normalize_prediction, normalize_weather,
    AiAnswer, AskRequest, Location, Operation, PredictionForm, PredictionResult, WeatherSnapshot,
};
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use super::stage_gate::StageGate;
use super::teardown::TeardownToken;
use super::tracker::OperationTracker;
use super::{DashboardView, Settlement};
use crate::config::{Config, ResponseOrdering, WorkflowConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::external::{AgriApi, HttpAgriApi, WeatherRequest};

/// Tunables for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub request_timeout: Duration,
    pub response_ordering: ResponseOrdering,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for OrchestratorSettings {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            response_ordering: config.response_ordering,
        }
    }
}

/// Handle to the dashboard's workflow; clones share the same session
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn AgriApi>,
    settings: OrchestratorSettings,
    teardown: TeardownToken,
    state: Mutex<WorkflowState>,
    view: watch::Sender<DashboardView>,
}

#[derive(Default)]
struct WorkflowState {
    gate: StageGate,
    tracker: OperationTracker,
    location: Option<Location>,
    weather: Option<WeatherSnapshot>,
    prediction: Option<PredictionResult>,
    answer: Option<AiAnswer>,
    /// Issue counter per operation, indexed by [`generation_slot`]
    generations: [u64; 3],
}

impl WorkflowState {
    fn view(&self) -> DashboardView {
        DashboardView {
            stage: self.gate.stage(),
            location: self.location.clone(),
            weather: self.weather.clone(),
            prediction: self.prediction.clone(),
            answer: self.answer.clone(),
            status: self.tracker.status(),
            prediction_unlocked: self.gate.stage() == super::Stage::Ready
                && StageGate::prediction_unlocked(self.location.as_ref(), self.weather.as_ref()),
        }
    }
}

fn generation_slot(op: Operation) -> usize {
    match op {
        Operation::Weather => 0,
        Operation::Prediction => 1,
        Operation::Ask => 2,
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Republish the state unless the view is gone
    fn publish(&self, state: &WorkflowState) {
        if self.teardown.is_cancelled() {
            return;
        }
        self.view.send_replace(state.view());
    }
}

/// One begin/finish pair of an operation
///
/// Dropping an unsettled ticket (e.g. the caller's future was dropped)
/// still finishes the operation, so `in_flight` cannot stay set.
struct OperationTicket<'a> {
    inner: &'a Inner,
    op: Operation,
    generation: u64,
    call_id: Uuid,
    teardown: TeardownToken,
    settled: bool,
}

impl Drop for OperationTicket<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.inner.lock_state();
        state.tracker.finish(self.op);
        self.inner.publish(&state);
        tracing::debug!(op = %self.op, call_id = %self.call_id, "operation abandoned");
    }
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with its own teardown token
    pub fn new(api: Arc<dyn AgriApi>, settings: OrchestratorSettings) -> Self {
        Self::with_teardown(api, settings, TeardownToken::new())
    }

    /// Create an orchestrator bound to a view-owned teardown token
    pub fn with_teardown(
        api: Arc<dyn AgriApi>,
        settings: OrchestratorSettings,
        teardown: TeardownToken,
    ) -> Self {
        let state = WorkflowState::default();
        let (view, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(Inner {
                api,
                settings,
                teardown,
                state: Mutex::new(state),
                view,
            }),
        }
    }

    /// Create an orchestrator talking HTTP to the configured back end
    pub fn from_config(config: &Config) -> DashboardResult<Self> {
        let api = HttpAgriApi::new(config.api.base_url.clone(), config.api.connect_timeout())?;
        Ok(Self::new(
            Arc::new(api),
            OrchestratorSettings::from(&config.workflow),
        ))
    }

    pub fn settings(&self) -> OrchestratorSettings {
        self.inner.settings
    }

    /// The most recently published view state
    pub fn view(&self) -> DashboardView {
        self.inner.view.borrow().clone()
    }

    /// Receive every published view state
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.inner.view.subscribe()
    }

    pub fn teardown_token(&self) -> TeardownToken {
        self.inner.teardown.clone()
    }

    /// Signal that the owning view is gone
    pub fn teardown(&self) {
        self.inner.teardown.cancel();
        tracing::info!("dashboard torn down; pending results will be dropped");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.teardown.is_cancelled()
    }

    // ------------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------------

    /// Save the location and fetch its weather
    pub async fn submit_location(&self, town: &str, state: &str) -> DashboardResult<Settlement> {
        if self.is_torn_down() {
            tracing::debug!("location ignored after teardown");
            return Ok(Settlement::Discarded);
        }

        let location = {
            let mut guard = self.inner.lock_state();
            let location = guard.gate.save_location(town, state)?;
            guard.location = Some(location.clone());
            self.inner.publish(&guard);
            location
        };

        tracing::info!(town = %location.town, state = %location.state, "location saved");
        self.fetch_weather(location).await
    }

    /// Fetch the weather again for the saved location
    pub async fn refresh_weather(&self) -> DashboardResult<Settlement> {
        if self.is_torn_down() {
            return Ok(Settlement::Discarded);
        }

        let location = {
            let mut guard = self.inner.lock_state();
            let location = guard.location.clone().ok_or_else(|| {
                DashboardError::InvalidStateTransition("Set your location first.".to_string())
            })?;
            guard.gate.begin_weather_refresh()?;
            self.inner.publish(&guard);
            location
        };

        self.fetch_weather(location).await
    }

    /// Open the prediction modal
    pub fn open_prediction_form(&self) -> DashboardResult<()> {
        if self.is_torn_down() {
            return Err(DashboardError::InvalidStateTransition(
                "The dashboard has been closed.".to_string(),
            ));
        }
        let mut guard = self.inner.lock_state();
        let state = &mut *guard;
        state
            .gate
            .open_prediction_form(state.location.as_ref(), state.weather.as_ref())?;
        self.inner.publish(state);
        Ok(())
    }

    /// Close the prediction modal without submitting
    pub fn dismiss_prediction_form(&self) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let mut guard = self.inner.lock_state();
        let closed = guard.gate.close_prediction_form();
        if closed {
            self.inner.publish(&guard);
        }
        closed
    }

    /// Submit the prediction form
    ///
    /// The modal closes as soon as the input is accepted, before the
    /// request settles.
    pub async fn submit_prediction(&self, form: PredictionForm) -> DashboardResult<Settlement> {
        if self.is_torn_down() {
            tracing::debug!("prediction ignored after teardown");
            return Ok(Settlement::Discarded);
        }

        let input = {
            let mut guard = self.inner.lock_state();
            let state = &mut *guard;
            state
                .gate
                .check_prediction(state.location.as_ref(), state.weather.as_ref())?;
            let input = match (
                state.location.as_ref(),
                state.weather.as_ref().and_then(WeatherSnapshot::report),
            ) {
                (Some(location), Some(report)) => build_prediction_input(&form, location, report)?,
                _ => {
                    return Err(DashboardError::InvalidStateTransition(
                        "Weather must load successfully before predicting.".to_string(),
                    ))
                }
            };
            state.gate.close_prediction_form();
            self.inner.publish(state);
            input
        };

        let Some(ticket) = self.begin(Operation::Prediction) else {
            return Ok(Settlement::Discarded);
        };
        let span = tracing::info_span!(
            "prediction",
            call_id = %ticket.call_id,
            crop = %input.crop,
            town = %input.town
        );

        async move {
            tracing::info!(days_to_harvest = input.days_to_harvest, "requesting yield prediction");
            let result = match self.bounded(self.inner.api.predict(&input)).await {
                Ok(raw) => normalize_prediction(&raw, &input),
                Err(e) => PredictionResult::error(e.user_message(Operation::Prediction)),
            };
            match &result {
                PredictionResult::Report(p) => tracing::info!(
                    tons_per_hectare = p.predicted_yield_tons_per_hectare,
                    "prediction received"
                ),
                PredictionResult::Error { error } => tracing::warn!(%error, "prediction failed"),
            }

            Ok::<_, DashboardError>(self.settle(ticket, move |state| {
                if let Some(error) = result.error_message() {
                    state.tracker.record_error(Operation::Prediction, error);
                }
                state.prediction = Some(result);
            }))
        }
        .instrument(span)
        .await
    }

    /// Ask the agronomy assistant; blank questions are ignored
    pub async fn ask_question(&self, question: &str) -> DashboardResult<Settlement> {
        if !is_askable(question) {
            return Ok(Settlement::Skipped);
        }
        if self.is_torn_down() {
            tracing::debug!("question ignored after teardown");
            return Ok(Settlement::Discarded);
        }

        let Some(ticket) = self.begin(Operation::Ask) else {
            return Ok(Settlement::Discarded);
        };
        let span = tracing::info_span!("ask", call_id = %ticket.call_id);
        let request = AskRequest {
            question: question.to_string(),
        };

        async move {
            tracing::info!(chars = request.question.len(), "asking assistant");
            let answer = match self.bounded(self.inner.api.ask(&request)).await {
                Ok(raw) => normalize_answer(&raw),
                Err(e) => AiAnswer::Error(e.user_message(Operation::Ask)),
            };
            if let AiAnswer::Error(error) = &answer {
                tracing::warn!(%error, "assistant request failed");
            }

            Ok::<_, DashboardError>(self.settle(ticket, move |state| {
                if let AiAnswer::Error(error) = &answer {
                    state.tracker.record_error(Operation::Ask, error.clone());
                }
                state.answer = Some(answer);
            }))
        }
        .instrument(span)
        .await
    }

    // ------------------------------------------------------------------------
    // Operation plumbing
    // ------------------------------------------------------------------------

    async fn fetch_weather(&self, location: Location) -> DashboardResult<Settlement> {
        let Some(ticket) = self.begin(Operation::Weather) else {
            return Ok(Settlement::Discarded);
        };
        let span = tracing::info_span!(
            "weather",
            call_id = %ticket.call_id,
            town = %location.town
        );
        let request = WeatherRequest {
            town: location.town,
        };

        async move {
            let snapshot = match self.bounded(self.inner.api.weather(&request)).await {
                Ok(raw) => normalize_weather(&raw, Utc::now()),
                Err(e) => WeatherSnapshot::error(e.user_message(Operation::Weather)),
            };
            match &snapshot {
                WeatherSnapshot::Report(report) => tracing::info!(
                    temperature_c = report.temperature_c,
                    condition = %report.condition,
                    forecast_points = report.forecast.len(),
                    "weather received"
                ),
                WeatherSnapshot::Error { error } => tracing::warn!(%error, "weather fetch failed"),
            }

            Ok::<_, DashboardError>(self.settle(ticket, move |state| {
                if let Some(error) = snapshot.error_message() {
                    state.tracker.record_error(Operation::Weather, error);
                }
                state.weather = Some(snapshot);
                state.gate.weather_settled();
            }))
        }
        .instrument(span)
        .await
    }

    /// Start an operation; `None` once torn down
    fn begin(&self, op: Operation) -> Option<OperationTicket<'_>> {
        let mut state = self.inner.lock_state();
        if self.inner.teardown.is_cancelled() {
            return None;
        }
        state.tracker.begin(op);
        let slot = generation_slot(op);
        state.generations[slot] += 1;
        let generation = state.generations[slot];
        self.inner.publish(&state);

        Some(OperationTicket {
            inner: &*self.inner,
            op,
            generation,
            call_id: Uuid::new_v4(),
            teardown: self.inner.teardown.clone(),
            settled: false,
        })
    }

    /// Finish an operation and apply its result if it is still wanted
    fn settle(
        &self,
        mut ticket: OperationTicket<'_>,
        apply: impl FnOnce(&mut WorkflowState),
    ) -> Settlement {
        ticket.settled = true;
        let op = ticket.op;
        let mut state = self.inner.lock_state();
        state.tracker.finish(op);

        if ticket.teardown.is_cancelled() {
            tracing::debug!(%op, "result dropped after teardown");
            return Settlement::Discarded;
        }

        let current = state.generations[generation_slot(op)];
        if self.inner.settings.response_ordering == ResponseOrdering::LatestIssued
            && current != ticket.generation
        {
            tracing::debug!(
                %op,
                generation = ticket.generation,
                current,
                "superseded result dropped"
            );
            self.inner.publish(&state);
            return Settlement::Discarded;
        }

        apply(&mut state);
        self.inner.publish(&state);
        Settlement::Applied
    }

    /// Run a request under the configured time bound
    async fn bounded<F>(&self, request: F) -> DashboardResult<Value>
    where
        F: Future<Output = DashboardResult<Value>>,
    {
        let limit = self.inner.settings.request_timeout;
        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => Err(DashboardError::Timeout(limit)),
        }
    }
}
