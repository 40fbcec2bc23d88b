//! Farm2Value dashboard backend
//!
//! Yield prediction with a model / heuristic / safety-net cascade, weather
//! passthrough for the dashboard, and image-based mango counting.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};

use external::{
    CommandCounter, MangoCounter, ModelServiceClient, WeatherClient, WeatherProvider, YieldModel,
};
use services::{MangoCountService, PredictionService, WeatherService};

/// Largest accepted request body; image uploads dominate
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: Arc<dyn WeatherProvider>,
    pub yield_model: Arc<dyn YieldModel>,
    pub mango_counter: Arc<dyn MangoCounter>,
}

impl AppState {
    /// Build state with the real upstream clients
    pub fn new(config: Config) -> AppResult<Self> {
        let weather = WeatherClient::new(&config.weather)?;
        let yield_model = ModelServiceClient::new(&config.model)?;
        let mango_counter = CommandCounter::new(&config.counting);

        Ok(Self::with_components(
            config,
            Arc::new(weather),
            Arc::new(yield_model),
            Arc::new(mango_counter),
        ))
    }

    /// Build state from explicit collaborators
    pub fn with_components(
        config: Config,
        weather: Arc<dyn WeatherProvider>,
        yield_model: Arc<dyn YieldModel>,
        mango_counter: Arc<dyn MangoCounter>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            weather,
            yield_model,
            mango_counter,
        }
    }

    pub fn weather_service(&self) -> WeatherService {
        WeatherService::new(self.weather.clone(), self.config.defaults.clone())
    }

    pub fn prediction_service(&self) -> PredictionService {
        PredictionService::new(self.weather_service(), self.yield_model.clone())
    }

    pub fn mango_count_service(&self) -> MangoCountService {
        MangoCountService::new(self.mango_counter.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm2Value Mango Yield Dashboard API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
