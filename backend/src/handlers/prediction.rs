//! HTTP handler for yield prediction

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use shared::PredictionResult;

use crate::error::AppResult;
use crate::AppState;

/// Predict the yield for a dataset-shape or legacy-shape request
pub async fn predict_yield(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(body) = body?;
    let outcome = state.prediction_service().predict(&body).await?;
    if !outcome.failures.is_empty() {
        tracing::debug!(
            "Prediction fell through {} tier(s) before {}",
            outcome.failures.len(),
            outcome.tier
        );
    }
    Ok(Json(outcome.result))
}
