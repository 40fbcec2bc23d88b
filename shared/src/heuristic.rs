//! Weather-driven yield heuristic for mango orchards
//!
//! A multiplicative piecewise model: a base rate of 12 units per hectare adjusted by
//! season, seasonal rainfall, temperature and humidity. Used whenever the trained
//! model service cannot answer.

use serde::{Deserialize, Serialize};

use crate::models::WeatherObservation;
use crate::types::Season;

/// Base yield per hectare before any adjustment
pub const BASE_YIELD_PER_HECTARE: f64 = 12.0;

/// Adjustment factors applied to the base rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YieldFactors {
    pub season: f64,
    pub rain: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl YieldFactors {
    /// Derive the factors for a season label and a resolved observation
    pub fn for_conditions(season: &str, weather: &WeatherObservation) -> Self {
        Self {
            season: season_factor(Season::from_label(season)),
            rain: rain_factor(weather.rainfall_mm),
            temperature: temperature_factor(weather.temperature_c),
            humidity: humidity_factor(weather.humidity_percent),
        }
    }

    /// Fixed factors used when nothing about the request can be trusted:
    /// Monsoon with 800mm rain, 28°C and 70% humidity.
    pub fn safety_net() -> Self {
        Self {
            season: season_factor(Some(Season::Monsoon)),
            rain: 1.15,
            temperature: 1.1,
            humidity: 1.1,
        }
    }

    /// Per-hectare yield, never negative
    pub fn per_hectare(&self) -> f64 {
        (BASE_YIELD_PER_HECTARE * self.season * self.rain * self.temperature * self.humidity)
            .max(0.0)
    }
}

pub fn season_factor(season: Option<Season>) -> f64 {
    match season {
        Some(Season::Summer) => 1.1,
        Some(Season::Monsoon) => 1.0,
        Some(Season::Winter) => 0.85,
        None => 1.0,
    }
}

/// Seasonal rainfall in mm; 800-1200mm is ideal
pub fn rain_factor(rainfall_mm: f64) -> f64 {
    if rainfall_mm < 400.0 {
        0.6
    } else if rainfall_mm < 800.0 {
        0.9
    } else if rainfall_mm <= 1200.0 {
        1.15
    } else if rainfall_mm <= 1500.0 {
        1.0
    } else {
        0.75
    }
}

/// Air temperature in °C; 24-28°C is ideal
pub fn temperature_factor(temperature_c: f64) -> f64 {
    if temperature_c < 20.0 {
        0.7
    } else if temperature_c < 24.0 {
        0.9
    } else if temperature_c <= 28.0 {
        1.1
    } else if temperature_c <= 32.0 {
        0.9
    } else {
        0.6
    }
}

/// Relative humidity in percent; 60-75% is ideal
pub fn humidity_factor(humidity_percent: f64) -> f64 {
    if humidity_percent < 40.0 {
        0.75
    } else if humidity_percent < 60.0 {
        0.95
    } else if humidity_percent <= 75.0 {
        1.1
    } else if humidity_percent <= 85.0 {
        0.95
    } else {
        0.75
    }
}

/// Scale a per-hectare figure by farm area.
///
/// Area that is absent, non-finite, zero or negative leaves the value unscaled.
pub fn scale_by_area(per_hectare: f64, area: Option<f64>) -> f64 {
    match area {
        Some(a) if a.is_finite() && a > 0.0 => per_hectare * a,
        _ => per_hectare,
    }
}

/// Estimate yield from season and resolved weather, optionally scaled by area
pub fn estimate_yield(season: &str, weather: &WeatherObservation, area: Option<f64>) -> f64 {
    let per_hectare = YieldFactors::for_conditions(season, weather).per_hectare();
    scale_by_area(per_hectare, area)
}

/// The constant-input estimate used as the last cascade tier
pub fn safety_net_yield() -> f64 {
    YieldFactors::safety_net().per_hectare()
}
