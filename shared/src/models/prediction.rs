//! Yield prediction request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::weather::{ClientWeather, ResolvedWeather};
use crate::types::GpsCoordinates;
use crate::validation::{lenient_number, title_case};

pub const DEFAULT_VARIETY: &str = "Alphonso";
pub const DEFAULT_SOIL_TYPE: &str = "Loamy";

/// Rejection of a prediction request whose shape is not recognised
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestShapeError {
    #[error("Invalid input parameters")]
    InvalidInput,
}

/// Prediction request in the shape of the training dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRequest {
    pub district: String,
    pub season: String,
    pub variety: String,
    pub soil_type: String,
    pub rainfall_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub area: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Prediction request from the older dashboard form
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRequest {
    pub region: String,
    pub season: String,
    pub rainfall: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub area: Option<f64>,
}

/// A prediction request in one of the two accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    Dataset(DatasetRequest),
    Legacy(LegacyRequest),
}

impl PredictionRequest {
    /// Recognise the request shape.
    ///
    /// The dataset shape is chosen when `district`, `season`, `variety` and `soil_type`
    /// are all strings. Otherwise the legacy shape needs non-empty `region` and `season`.
    pub fn from_json(body: &Value) -> Result<Self, RequestShapeError> {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| body.get(key).and_then(lenient_number);
        let strict_number = |key: &str| body.get(key).and_then(Value::as_f64);

        if let (Some(district), Some(season), Some(variety), Some(soil_type)) = (
            text("district"),
            text("season"),
            text("variety"),
            text("soil_type"),
        ) {
            return Ok(PredictionRequest::Dataset(DatasetRequest {
                district,
                season,
                variety,
                soil_type,
                rainfall_mm: number("rainfall_mm"),
                temperature_c: number("temperature_C"),
                humidity_percent: number("humidity_percent"),
                area: number("area"),
                latitude: strict_number("latitude"),
                longitude: strict_number("longitude"),
            }));
        }

        match (text("region"), text("season")) {
            (Some(region), Some(season)) if !region.is_empty() && !season.is_empty() => {
                Ok(PredictionRequest::Legacy(LegacyRequest {
                    region,
                    season,
                    rainfall: number("rainfall"),
                    temperature: number("temperature"),
                    humidity: number("humidity"),
                    area: number("area"),
                }))
            }
            _ => Err(RequestShapeError::InvalidInput),
        }
    }

    /// TitleCased categorical labels, with legacy defaults applied
    pub fn labels(&self) -> CropLabels {
        match self {
            PredictionRequest::Dataset(r) => CropLabels {
                district: title_case(&r.district),
                season: title_case(&r.season),
                variety: title_case(&r.variety),
                soil_type: title_case(&r.soil_type),
            },
            PredictionRequest::Legacy(r) => CropLabels {
                district: title_case(&r.region),
                season: title_case(&r.season),
                variety: DEFAULT_VARIETY.to_string(),
                soil_type: DEFAULT_SOIL_TYPE.to_string(),
            },
        }
    }

    pub fn client_weather(&self) -> ClientWeather {
        match self {
            PredictionRequest::Dataset(r) => ClientWeather {
                rainfall_mm: r.rainfall_mm,
                temperature_c: r.temperature_c,
                humidity_percent: r.humidity_percent,
            },
            PredictionRequest::Legacy(r) => ClientWeather {
                rainfall_mm: r.rainfall,
                temperature_c: r.temperature,
                humidity_percent: r.humidity,
            },
        }
    }

    pub fn area(&self) -> Option<f64> {
        match self {
            PredictionRequest::Dataset(r) => r.area,
            PredictionRequest::Legacy(r) => r.area,
        }
    }

    /// Coordinates supplied with the request, when both are present
    pub fn coordinates(&self) -> Option<GpsCoordinates> {
        match self {
            PredictionRequest::Dataset(DatasetRequest {
                latitude: Some(lat),
                longitude: Some(lon),
                ..
            }) => Some(GpsCoordinates::new(*lat, *lon)),
            _ => None,
        }
    }
}

/// Categorical inputs of the yield model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropLabels {
    pub district: String,
    pub season: String,
    pub variety: String,
    pub soil_type: String,
}

/// Inputs after shape normalization and weather resolution.
///
/// Serializes to the payload the model service expects; `area` stays local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPredictionInputs {
    #[serde(flatten)]
    pub labels: CropLabels,
    pub rainfall_mm: f64,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub humidity_percent: f64,
    #[serde(skip)]
    pub area: Option<f64>,
}

impl NormalizedPredictionInputs {
    pub fn new(labels: CropLabels, weather: &ResolvedWeather, area: Option<f64>) -> Self {
        Self {
            labels,
            rainfall_mm: weather.observation.rainfall_mm,
            temperature_c: weather.observation.temperature_c,
            humidity_percent: weather.observation.humidity_percent,
            area,
        }
    }
}

/// Which cascade tier produced a prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Model,
    Heuristic,
    SafetyNet,
}

impl ConfidenceTier {
    pub fn confidence(&self) -> f64 {
        match self {
            ConfidenceTier::Model => 85.0,
            ConfidenceTier::Heuristic => 70.0,
            ConfidenceTier::SafetyNet => 65.0,
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::Model => write!(f, "model"),
            ConfidenceTier::Heuristic => write!(f, "heuristic"),
            ConfidenceTier::SafetyNet => write!(f, "safety net"),
        }
    }
}

/// Response envelope of the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    #[serde(rename = "yield")]
    pub yield_estimate: f64,
    pub confidence: f64,
    pub analysis: String,
}

impl PredictionResult {
    pub fn from_model(yield_estimate: f64, season: &str) -> Self {
        Self {
            yield_estimate: yield_estimate.max(0.0),
            confidence: ConfidenceTier::Model.confidence(),
            analysis: format!("Predicted yield using trained model. Season: {}.", season),
        }
    }

    pub fn from_heuristic(yield_estimate: f64, season: &str) -> Self {
        Self {
            yield_estimate: yield_estimate.max(0.0),
            confidence: ConfidenceTier::Heuristic.confidence(),
            analysis: format!(
                "Predicted yield using weather-derived heuristic. Season: {}.",
                season
            ),
        }
    }

    pub fn from_safety_net(yield_estimate: f64) -> Self {
        Self {
            yield_estimate: yield_estimate.max(0.0),
            confidence: ConfidenceTier::SafetyNet.confidence(),
            analysis: "Heuristic fallback used. Season: Monsoon.".to_string(),
        }
    }
}
