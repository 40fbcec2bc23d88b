//! HTTP handlers for weather endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::services::weather::{CurrentParams, DistrictWeather, SeasonalParams};
use crate::AppState;

/// Seasonal forecast passthrough
pub async fn get_seasonal_weather(
    State(state): State<AppState>,
    params: Result<Query<SeasonalParams>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(params) = params?;
    let payload = state.weather_service().seasonal(params).await?;
    Ok(Json(payload))
}

/// Current conditions passthrough
pub async fn get_current_weather(
    State(state): State<AppState>,
    params: Result<Query<CurrentParams>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(params) = params?;
    let payload = state.weather_service().current(params).await?;
    Ok(Json(payload))
}

#[derive(Debug, Deserialize)]
pub struct DistrictQuery {
    #[serde(default)]
    pub district: String,
}

/// Seasonal and current weather for a district
pub async fn get_district_weather(
    State(state): State<AppState>,
    query: Result<Query<DistrictQuery>, QueryRejection>,
) -> AppResult<Json<DistrictWeather>> {
    let Query(query) = query?;
    let weather = state
        .weather_service()
        .district_weather(&query.district)
        .await?;
    Ok(Json(weather))
}
