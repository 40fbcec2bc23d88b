//! Shared fixtures for the integration tests: in-process upstream fakes and a
//! configuration that never touches the network.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use farm2value_backend::config::{
    CountingConfig, DefaultsConfig, ModelConfig, ServerConfig, WeatherConfig,
};
use farm2value_backend::external::{
    CurrentQuery, MangoCounter, SeasonalQuery, WeatherProvider, YieldModel,
};
use farm2value_backend::{AppError, AppResult, AppState, Config};
use serde_json::{json, Value};
use shared::NormalizedPredictionInputs;

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        weather: WeatherConfig {
            api_key: "test-key".to_string(),
            current_url: "http://127.0.0.1:9/weather".to_string(),
            seasonal_url: "http://127.0.0.1:9/seasonal".to_string(),
            timeout_secs: 1,
        },
        model: ModelConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        },
        defaults: DefaultsConfig {
            timezone: "Asia/Kolkata".to_string(),
            latitude: None,
            longitude: None,
        },
        counting: CountingConfig {
            program: "definitely-not-a-real-counter".to_string(),
            args: vec![],
            timeout_secs: 1,
        },
    }
}

/// Seasonal payload with a two-month series
pub fn seasonal_payload() -> Value {
    json!({
        "timezone": "Asia/Kolkata",
        "monthly": {
            "temperature_2m_max": [30.0, 32.0],
            "precipitation_sum": [120.0, 180.0]
        }
    })
}

/// Current conditions payload
pub fn current_payload() -> Value {
    json!({ "main": { "temp": 29.5, "humidity": 62.0 } })
}

// ============================================================================
// Weather
// ============================================================================

/// Weather provider returning canned payloads; `None` simulates an outage
#[derive(Default)]
pub struct FakeWeather {
    pub seasonal: Option<Value>,
    pub current: Option<Value>,
    pub seasonal_calls: AtomicUsize,
    pub current_calls: AtomicUsize,
    pub seen_seasonal: Mutex<Vec<SeasonalQuery>>,
}

impl FakeWeather {
    pub fn healthy() -> Self {
        Self {
            seasonal: Some(seasonal_payload()),
            current: Some(current_payload()),
            ..Default::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> (usize, usize) {
        (
            self.seasonal_calls.load(Ordering::SeqCst),
            self.current_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn seasonal(&self, query: &SeasonalQuery) -> AppResult<Value> {
        self.seasonal_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_seasonal.lock().unwrap().push(query.clone());
        self.seasonal
            .clone()
            .ok_or_else(|| AppError::upstream("seasonal weather", "upstream error 503"))
    }

    async fn current(&self, _query: &CurrentQuery) -> AppResult<Value> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.current
            .clone()
            .ok_or_else(|| AppError::upstream("current weather", "upstream error 503"))
    }
}

// ============================================================================
// Yield model
// ============================================================================

/// Yield model returning a fixed per-hectare value, or failing like an HTTP 500
pub struct FakeModel {
    pub per_hectare: Option<f64>,
    pub seen: Mutex<Vec<NormalizedPredictionInputs>>,
}

impl FakeModel {
    pub fn returning(per_hectare: f64) -> Self {
        Self {
            per_hectare: Some(per_hectare),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            per_hectare: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl YieldModel for FakeModel {
    async fn predict(&self, inputs: &NormalizedPredictionInputs) -> AppResult<f64> {
        self.seen.lock().unwrap().push(inputs.clone());
        self.per_hectare
            .ok_or_else(|| AppError::upstream("yield model", "API returned 500: boom"))
    }
}

// ============================================================================
// Mango counter
// ============================================================================

/// Counter returning a fixed count, or failing
pub struct FakeCounter {
    pub count: Option<u32>,
    pub staged_paths: Mutex<Vec<std::path::PathBuf>>,
}

impl FakeCounter {
    pub fn returning(count: u32) -> Self {
        Self {
            count: Some(count),
            staged_paths: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            count: None,
            staged_paths: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MangoCounter for FakeCounter {
    async fn count(&self, image_path: &Path) -> AppResult<u32> {
        assert!(image_path.exists(), "upload must be staged before counting");
        self.staged_paths
            .lock()
            .unwrap()
            .push(image_path.to_path_buf());
        self.count
            .ok_or_else(|| AppError::upstream("mango counter", "exited with 1"))
    }
}

pub fn test_state(weather: Arc<FakeWeather>, model: Arc<FakeModel>, counter: Arc<FakeCounter>) -> AppState {
    AppState::with_components(test_config(), weather, model, counter)
}
