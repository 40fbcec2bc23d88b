//! Weather service: upstream passthrough, district summaries and per-request
//! weather derivation for the yield estimators

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    district_coordinates, validate_coordinates, ClientWeather, GpsCoordinates, ResolvedWeather,
    WeatherSummary,
};

use crate::config::DefaultsConfig;
use crate::error::{AppError, AppResult};
use crate::external::{CurrentQuery, SeasonalQuery, WeatherProvider};

/// Weather service over a weather provider
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    defaults: DefaultsConfig,
}

/// Query parameters for the seasonal passthrough
#[derive(Debug, Default, Deserialize)]
pub struct SeasonalParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub timezone: Option<String>,
}

/// Query parameters for the current conditions passthrough
#[derive(Debug, Default, Deserialize)]
pub struct CurrentParams {
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    pub units: Option<String>,
}

/// Compact weather summary for a district
#[derive(Debug, Clone, Serialize)]
pub struct DistrictWeatherSummary {
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "avg_temperature_period_C")]
    pub avg_temperature_period_c: Option<f64>,
    pub total_precipitation_period_mm: Option<f64>,
    #[serde(rename = "current_temperature_C")]
    pub current_temperature_c: Option<f64>,
    pub current_humidity_percent: Option<f64>,
    pub timezone: String,
}

/// District summary together with the raw upstream payloads
#[derive(Debug, Clone, Serialize)]
pub struct DistrictWeather {
    pub summary: DistrictWeatherSummary,
    pub seasonal: Value,
    pub current: Value,
}

impl WeatherService {
    /// Create a new WeatherService instance
    pub fn new(provider: Arc<dyn WeatherProvider>, defaults: DefaultsConfig) -> Self {
        Self { provider, defaults }
    }

    /// Coordinates for weather lookups: the request's own, then the district's,
    /// then the configured defaults
    pub fn resolve_coordinates(
        &self,
        requested: Option<GpsCoordinates>,
        district: Option<&str>,
    ) -> Option<GpsCoordinates> {
        requested
            .filter(|c| validate_coordinates(c.latitude, c.longitude).is_ok())
            .or_else(|| district.and_then(district_coordinates))
            .or_else(|| self.defaults.coordinates())
    }

    // ========================================================================
    // Passthrough
    // ========================================================================

    /// Seasonal forecast payload, verbatim
    pub async fn seasonal(&self, params: SeasonalParams) -> AppResult<Value> {
        let requested = match (params.latitude, params.longitude) {
            (Some(lat), Some(lon)) => Some(GpsCoordinates::new(lat, lon)),
            _ => None,
        };
        let coordinates = requested.or_else(|| self.defaults.coordinates()).ok_or_else(|| {
            AppError::Validation("Missing required query params: latitude, longitude".to_string())
        })?;
        validate_coordinates(coordinates.latitude, coordinates.longitude)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let timezone = params
            .timezone
            .unwrap_or_else(|| self.defaults.timezone.clone());
        let mut query = SeasonalQuery::for_window(coordinates, today(), &timezone);
        if let Some(start) = params.start {
            query.start = start;
        }
        if let Some(end) = params.end {
            query.end = end;
        }

        self.provider.seasonal(&query).await
    }

    /// Current conditions payload, verbatim
    pub async fn current(&self, params: CurrentParams) -> AppResult<Value> {
        let (lat, lon) = match (params.lat, params.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(AppError::Validation("Missing lat/lon".to_string())),
        };
        validate_coordinates(lat, lon).map_err(|e| AppError::Validation(e.to_string()))?;

        let query = CurrentQuery {
            coordinates: GpsCoordinates::new(lat, lon),
            units: params.units.unwrap_or_else(|| "metric".to_string()),
        };
        self.provider.current(&query).await
    }

    /// Seasonal and current weather for a known district
    pub async fn district_weather(&self, district: &str) -> AppResult<DistrictWeather> {
        let key = district.trim();
        if key.is_empty() {
            return Err(AppError::Validation("Missing district".to_string()));
        }
        let coordinates = district_coordinates(key)
            .ok_or_else(|| AppError::NotFound(format!("District {}", key)))?;

        let seasonal_query = SeasonalQuery::for_window(coordinates, today(), &self.defaults.timezone);
        let current_query = CurrentQuery::metric(coordinates);
        let (seasonal, current) = tokio::try_join!(
            self.provider.seasonal(&seasonal_query),
            self.provider.current(&current_query),
        )?;

        let normalized = WeatherSummary::from_payloads(Some(&seasonal), Some(&current));
        let timezone = seasonal
            .get("timezone")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.timezone.clone());

        Ok(DistrictWeather {
            summary: DistrictWeatherSummary {
                district: key.to_string(),
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
                avg_temperature_period_c: normalized.avg_temperature,
                total_precipitation_period_mm: normalized.total_precipitation,
                current_temperature_c: normalized.current_temperature,
                current_humidity_percent: normalized.current_humidity,
                timezone,
            },
            seasonal,
            current,
        })
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Fetch both payloads concurrently. Any failure becomes `None`.
    pub async fn fetch_payloads(
        &self,
        coordinates: Option<GpsCoordinates>,
    ) -> (Option<Value>, Option<Value>) {
        let Some(coordinates) = coordinates else {
            tracing::warn!("No coordinates available, skipping live weather");
            return (None, None);
        };

        let seasonal_query = SeasonalQuery::for_window(coordinates, today(), &self.defaults.timezone);
        let current_query = CurrentQuery::metric(coordinates);
        let (seasonal, current) = tokio::join!(
            self.provider.seasonal(&seasonal_query),
            self.provider.current(&current_query),
        );

        (
            seasonal
                .map_err(|e| tracing::warn!("Seasonal weather unavailable: {}", e))
                .ok(),
            current
                .map_err(|e| tracing::warn!("Current weather unavailable: {}", e))
                .ok(),
        )
    }

    /// Produce a complete observation: client value, then live value, then default.
    /// Never fails.
    pub async fn derive(
        &self,
        client: &ClientWeather,
        coordinates: Option<GpsCoordinates>,
    ) -> ResolvedWeather {
        let (seasonal, current) = self.fetch_payloads(coordinates).await;
        let live = WeatherSummary::from_payloads(seasonal.as_ref(), current.as_ref());
        let resolved = ResolvedWeather::resolve(client, &live);

        tracing::debug!(
            rainfall_mm = resolved.observation.rainfall_mm,
            temperature_c = resolved.observation.temperature_c,
            humidity_percent = resolved.observation.humidity_percent,
            "Derived weather ({:?}/{:?}/{:?})",
            resolved.rainfall_source,
            resolved.temperature_source,
            resolved.humidity_source
        );

        resolved
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
