//! Route definitions for the Farm2Value dashboard

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Yield prediction cascade
        .route("/predict-yield", post(handlers::predict_yield))
        // Weather passthrough
        .route("/seasonal-weather", get(handlers::get_seasonal_weather))
        .route("/current-weather", get(handlers::get_current_weather))
        .route("/district-weather", get(handlers::get_district_weather))
        // Mango counting
        .route("/image-segmentation", post(handlers::segment_image))
}
