//! External API integrations
//!
//! Each upstream collaborator sits behind a trait so the cascades can be exercised
//! with in-process fakes.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use shared::NormalizedPredictionInputs;

use crate::error::AppResult;

pub mod mango_counter;
pub mod weather;
pub mod yield_model;

pub use mango_counter::CommandCounter;
pub use weather::{CurrentQuery, SeasonalQuery, WeatherClient};
pub use yield_model::ModelServiceClient;

/// Seasonal aggregate and current snapshot weather services
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Raw seasonal aggregate payload
    async fn seasonal(&self, query: &SeasonalQuery) -> AppResult<Value>;

    /// Raw current conditions payload
    async fn current(&self, query: &CurrentQuery) -> AppResult<Value>;
}

/// Trained yield model service
#[async_trait]
pub trait YieldModel: Send + Sync {
    /// Per-hectare yield predicted for the inputs
    async fn predict(&self, inputs: &NormalizedPredictionInputs) -> AppResult<f64>;
}

/// Procedure that counts mangoes in a segmented image on disk
#[async_trait]
pub trait MangoCounter: Send + Sync {
    async fn count(&self, image_path: &Path) -> AppResult<u32>;
}
