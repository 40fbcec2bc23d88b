//! Yield prediction service
//!
//! Runs an ordered cascade of strategies and returns the first success:
//! the trained model service, the weather heuristic, and a constant-input safety net.
//! Weather is derived once per request and shared by every tier.

use std::sync::Arc;

use serde_json::Value;
use shared::{
    estimate_yield, safety_net_yield, scale_by_area, ConfidenceTier, CropLabels,
    NormalizedPredictionInputs, PredictionRequest, PredictionResult, ResolvedWeather,
};

use crate::error::{AppError, AppResult};
use crate::external::YieldModel;
use crate::services::weather::WeatherService;

/// Tiers in the order they are attempted
const CASCADE: [ConfidenceTier; 3] = [
    ConfidenceTier::Model,
    ConfidenceTier::Heuristic,
    ConfidenceTier::SafetyNet,
];

/// Yield prediction service
#[derive(Clone)]
pub struct PredictionService {
    weather: WeatherService,
    model: Arc<dyn YieldModel>,
}

/// Why a cascade tier did not produce a result
#[derive(Debug, Clone, PartialEq)]
pub struct TierFailure {
    pub tier: ConfidenceTier,
    pub reason: String,
}

/// The answer together with the tier that produced it and the tiers that failed first
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub tier: ConfidenceTier,
    pub failures: Vec<TierFailure>,
}

/// Everything a tier needs, computed once per request
struct PredictionContext {
    labels: CropLabels,
    weather: ResolvedWeather,
    area: Option<f64>,
}

impl PredictionService {
    /// Create a new PredictionService instance
    pub fn new(weather: WeatherService, model: Arc<dyn YieldModel>) -> Self {
        Self { weather, model }
    }

    /// Validate a raw request body and predict
    pub async fn predict(&self, body: &Value) -> AppResult<PredictionOutcome> {
        let request = PredictionRequest::from_json(body)?;
        self.predict_request(&request).await
    }

    /// Predict for an already recognised request
    pub async fn predict_request(&self, request: &PredictionRequest) -> AppResult<PredictionOutcome> {
        let labels = request.labels();
        let coordinates = self
            .weather
            .resolve_coordinates(request.coordinates(), Some(&labels.district));
        let weather = self
            .weather
            .derive(&request.client_weather(), coordinates)
            .await;

        let context = PredictionContext {
            labels,
            weather,
            area: request.area(),
        };

        let mut failures = Vec::new();
        for tier in CASCADE {
            match self.attempt(tier, &context).await {
                Ok(result) => {
                    tracing::info!(
                        "Prediction served by {} tier (yield {:.3}, season {})",
                        tier,
                        result.yield_estimate,
                        context.labels.season
                    );
                    return Ok(PredictionOutcome {
                        result,
                        tier,
                        failures,
                    });
                }
                Err(failure) => {
                    tracing::warn!("Prediction tier {} failed: {}", tier, failure.reason);
                    failures.push(failure);
                }
            }
        }

        Err(AppError::Internal("Failed to generate prediction".to_string()))
    }

    async fn attempt(
        &self,
        tier: ConfidenceTier,
        context: &PredictionContext,
    ) -> Result<PredictionResult, TierFailure> {
        let season = context.labels.season.as_str();
        let fail = |reason: String| TierFailure { tier, reason };
        match tier {
            ConfidenceTier::Model => {
                let inputs = NormalizedPredictionInputs::new(
                    context.labels.clone(),
                    &context.weather,
                    context.area,
                );
                let per_hectare = self
                    .model
                    .predict(&inputs)
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                finite(scale_by_area(per_hectare, context.area))
                    .map(|y| PredictionResult::from_model(y, season))
                    .map_err(fail)
            }
            ConfidenceTier::Heuristic => {
                if context.weather.is_all_default() {
                    return Err(fail("no client or live weather available".to_string()));
                }
                let estimate = estimate_yield(season, &context.weather.observation, context.area);
                finite(estimate)
                    .map(|y| PredictionResult::from_heuristic(y, season))
                    .map_err(fail)
            }
            ConfidenceTier::SafetyNet => finite(safety_net_yield())
                .map(PredictionResult::from_safety_net)
                .map_err(fail),
        }
    }
}

fn finite(value: f64) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite estimate {}", value))
    }
}
