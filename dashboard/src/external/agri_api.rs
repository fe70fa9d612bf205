//! Krishi Mitra back-end client
//!
//! JSON-over-HTTP client for the `/weather`, `/predict` and `/ask`
//! endpoints. Bodies are returned raw; reshaping them is the normalizer's
//! job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{AskRequest, PredictionInput};

use crate::error::{DashboardError, DashboardResult};

/// Request body for the weather endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherRequest {
    pub town: String,
}

/// The three calls the dashboard makes against its back end
#[async_trait]
pub trait AgriApi: Send + Sync {
    async fn weather(&self, request: &WeatherRequest) -> DashboardResult<Value>;
    async fn predict(&self, input: &PredictionInput) -> DashboardResult<Value>;
    async fn ask(&self, request: &AskRequest) -> DashboardResult<Value>;
}

/// Error body returned by the back end on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// HTTP implementation of [`AgriApi`]
#[derive(Clone)]
pub struct HttpAgriApi {
    http_client: Client,
    base_url: String,
}

impl HttpAgriApi {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> DashboardResult<Self> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| DashboardError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return the JSON response
    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> DashboardResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Server {
                status: status.as_u16(),
                detail: extract_detail(status, &body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DashboardError::MalformedResponse(format!("{} body: {}", path, e)))
    }
}

/// Pull a display string out of a failure body's `detail`
///
/// FastAPI-style validation failures carry a list here; those are not
/// meant for users and fall back to the generic message.
fn extract_detail(status: StatusCode, body: &str) -> Option<String> {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::debug!(%status, "error body is not JSON");
            return None;
        }
    };
    match parsed.detail {
        Some(Value::String(detail)) => Some(detail),
        _ => None,
    }
}

#[async_trait]
impl AgriApi for HttpAgriApi {
    async fn weather(&self, request: &WeatherRequest) -> DashboardResult<Value> {
        self.post_json("/weather", request).await
    }

    async fn predict(&self, input: &PredictionInput) -> DashboardResult<Value> {
        self.post_json("/predict", input).await
    }

    async fn ask(&self, request: &AskRequest) -> DashboardResult<Value> {
        self.post_json("/ask", request).await
    }
}
