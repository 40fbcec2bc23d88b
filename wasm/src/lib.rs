//! WebAssembly module for the Farm2Value dashboard
//!
//! Lets the browser preview estimates offline:
//! - Weather heuristic yield
//! - Label normalization
//! - Mango count harvest and confidence

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Heuristic yield estimate. `area` is ignored unless it is finite and positive.
#[wasm_bindgen]
pub fn estimate_heuristic_yield(
    season: &str,
    rainfall_mm: f64,
    temperature_c: f64,
    humidity_percent: f64,
    area: f64,
) -> f64 {
    let observation = WeatherObservation::new(rainfall_mm, temperature_c, humidity_percent);
    shared::estimate_yield(&title_case(season), &observation, Some(area))
}

/// Yield the backend falls back to when nothing else is available
#[wasm_bindgen]
pub fn safety_net_estimate() -> f64 {
    shared::safety_net_yield()
}

/// Normalize a free-form label the way the backend does
#[wasm_bindgen]
pub fn normalize_label(value: &str) -> String {
    title_case(value)
}

/// Harvest in kg for a mango count
#[wasm_bindgen]
pub fn harvest_for_count(count: u32) -> f64 {
    yield_for_count(count)
}

/// Confidence the counting program tier would report, without jitter
#[wasm_bindgen]
pub fn count_confidence(count: u32) -> f64 {
    confidence_for_count(count, 0.0)
}

/// Coordinates of a known district as `[latitude, longitude]`
#[wasm_bindgen]
pub fn district_location(district: &str) -> Result<Vec<f64>, JsValue> {
    district_coordinates(district)
        .map(|c| vec![c.latitude, c.longitude])
        .ok_or_else(|| JsValue::from_str(&format!("Unknown district: {}", district)))
}

/// Parse a prediction request and return its normalized labels as JSON
#[wasm_bindgen]
pub fn normalize_request(request_json: &str) -> Result<String, JsValue> {
    let body: serde_json::Value = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid request JSON: {}", e)))?;
    let request = PredictionRequest::from_json(&body)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&request.labels())
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}
