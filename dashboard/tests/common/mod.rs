//! Shared fixtures for the dashboard integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashboard::external::{AgriApi, WeatherRequest};
use dashboard::{DashboardError, DashboardResult};
use serde_json::{json, Value};
use shared::{AskRequest, Operation, PredictionForm, PredictionInput};
use tokio::sync::oneshot;

/// A reply the scripted back end will give to the next call
enum Reply {
    Now(DashboardResult<Value>),
    Held(oneshot::Receiver<DashboardResult<Value>>),
    Never,
}

#[derive(Default)]
struct Endpoint {
    replies: VecDeque<Reply>,
    requests: Vec<Value>,
}

/// In-memory back end whose replies are scripted per operation
///
/// Replies are consumed in call order. A held reply resolves only when the
/// test sends on the returned channel, which lets tests settle overlapping
/// calls in any order.
#[derive(Default)]
pub struct ScriptedApi {
    endpoints: Mutex<[Endpoint; 3]>,
}

fn slot(op: Operation) -> usize {
    match op {
        Operation::Weather => 0,
        Operation::Prediction => 1,
        Operation::Ask => 2,
    }
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, op: Operation, reply: Reply) {
        self.endpoints.lock().unwrap()[slot(op)]
            .replies
            .push_back(reply);
    }

    /// Answer the next call immediately
    pub fn reply(&self, op: Operation, result: DashboardResult<Value>) {
        self.push(op, Reply::Now(result));
    }

    /// Hold the next call open until the returned sender fires
    pub fn hold(&self, op: Operation) -> oneshot::Sender<DashboardResult<Value>> {
        let (tx, rx) = oneshot::channel();
        self.push(op, Reply::Held(rx));
        tx
    }

    /// Never answer the next call
    pub fn hang(&self, op: Operation) {
        self.push(op, Reply::Never);
    }

    pub fn calls(&self, op: Operation) -> usize {
        self.endpoints.lock().unwrap()[slot(op)].requests.len()
    }

    /// Request bodies received so far, in call order
    pub fn requests(&self, op: Operation) -> Vec<Value> {
        self.endpoints.lock().unwrap()[slot(op)].requests.clone()
    }

    /// Wait until at least `count` calls of `op` have been received
    pub async fn wait_for_calls(&self, op: Operation, count: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls(op) < count {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "expected {count} {op} call(s)");
    }

    async fn call(&self, op: Operation, body: Value) -> DashboardResult<Value> {
        let reply = {
            let mut endpoints = self.endpoints.lock().unwrap();
            let endpoint = &mut endpoints[slot(op)];
            endpoint.requests.push(body);
            endpoint.replies.pop_front()
        };

        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Held(rx)) => rx.await.unwrap_or_else(|_| {
                Err(DashboardError::Transport("reply channel dropped".to_string()))
            }),
            Some(Reply::Never) => std::future::pending().await,
            None => Err(DashboardError::Transport(format!("no scripted {op} reply"))),
        }
    }
}

#[async_trait]
impl AgriApi for ScriptedApi {
    async fn weather(&self, request: &WeatherRequest) -> DashboardResult<Value> {
        self.call(Operation::Weather, serde_json::to_value(request).unwrap())
            .await
    }

    async fn predict(&self, input: &PredictionInput) -> DashboardResult<Value> {
        self.call(Operation::Prediction, serde_json::to_value(input).unwrap())
            .await
    }

    async fn ask(&self, request: &AskRequest) -> DashboardResult<Value> {
        self.call(Operation::Ask, serde_json::to_value(request).unwrap())
            .await
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A well-formed `/weather` body
pub fn weather_payload(temperature: f64, description: &str) -> Value {
    json!({
        "current": {
            "current_conditions": {
                "temperature_celsius": temperature,
                "description": description,
                "wind_speed_mps": 5.0,
                "humidity_percent": 40.0
            }
        },
        "forecast": {
            "forecast": [
                {
                    "datetime": "2024-06-01 12:00:00",
                    "temperature_celsius": temperature + 1.0,
                    "rain_chance_percent": 20.0
                },
                {
                    "datetime": "2024-06-01 15:00:00",
                    "temperature_celsius": temperature + 2.0,
                    "rain_chance_percent": 35.0
                }
            ]
        }
    })
}

/// A well-formed `/predict` body
pub fn prediction_payload(tons_per_hectare: f64) -> Value {
    json!({
        "predicted_yield_tons_per_hectare": tons_per_hectare,
        "live_rainfall_used_mm": 1.2,
        "input_features": { "Crop": "Wheat" }
    })
}

pub fn answer_payload(text: &str) -> Value {
    json!({ "answer": text })
}

pub fn wheat_form() -> PredictionForm {
    PredictionForm {
        soil_type: "Loam".to_string(),
        crop: "Wheat".to_string(),
        fertilizer_used: true,
        irrigation_used: false,
        days_to_harvest: "120".to_string(),
    }
}
