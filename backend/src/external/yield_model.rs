//! Yield Model Client
//!
//! Client for the trained yield prediction microservice (`POST {base}/predict`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::NormalizedPredictionInputs;

use crate::config::ModelConfig;
use crate::error::{AppError, AppResult};
use crate::external::YieldModel;

/// Client for the yield prediction microservice
#[derive(Clone)]
pub struct ModelServiceClient {
    predict_url: String,
    http_client: Client,
}

impl ModelServiceClient {
    /// Create a new model service client
    pub fn new(config: &ModelConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            predict_url: predict_url(&config.base_url),
            http_client,
        })
    }

    /// Send normalized inputs to the model and read back the predicted yield
    pub async fn predict_yield(&self, inputs: &NormalizedPredictionInputs) -> AppResult<f64> {
        let response = self
            .http_client
            .post(&self.predict_url)
            .json(inputs)
            .send()
            .await
            .map_err(|e| AppError::upstream("yield model", format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                "yield model",
                format!("API returned {}: {}", status, body),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::upstream("yield model", format!("failed to parse response: {}", e)))?;

        read_yield(&body)
    }
}

fn predict_url(base_url: &str) -> String {
    format!("{}/predict", base_url.trim_end_matches('/'))
}

/// Extract a finite numeric `yield` from the model response
fn read_yield(body: &Value) -> AppResult<f64> {
    body.get("yield")
        .and_then(Value::as_f64)
        .filter(|y| y.is_finite())
        .ok_or_else(|| AppError::upstream("yield model", "response has no numeric yield"))
}

#[async_trait]
impl YieldModel for ModelServiceClient {
    async fn predict(&self, inputs: &NormalizedPredictionInputs) -> AppResult<f64> {
        self.predict_yield(inputs).await
    }
}
