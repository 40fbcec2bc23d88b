//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap for current conditions and Open-Meteo for the
//! seasonal forecast. Payloads are returned verbatim; normalization happens in
//! `shared::WeatherSummary`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use shared::GpsCoordinates;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::WeatherProvider;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    current_url: String,
    seasonal_url: String,
}

/// Parameters of a seasonal forecast request
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalQuery {
    pub coordinates: GpsCoordinates,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timezone: String,
}

impl SeasonalQuery {
    /// Query covering the default three-month window around `today`
    pub fn for_window(coordinates: GpsCoordinates, today: NaiveDate, timezone: &str) -> Self {
        let (start, end) = seasonal_window(today);
        Self {
            coordinates,
            start,
            end,
            timezone: timezone.to_string(),
        }
    }
}

/// Parameters of a current conditions request
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentQuery {
    pub coordinates: GpsCoordinates,
    pub units: String,
}

impl CurrentQuery {
    pub fn metric(coordinates: GpsCoordinates) -> Self {
        Self {
            coordinates,
            units: "metric".to_string(),
        }
    }
}

/// First day of the current month through the last day of the third month
pub fn seasonal_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let end = start
        .checked_add_months(Months::new(3))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start);
    (start, end)
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            current_url: config.current_url.clone(),
            seasonal_url: config.seasonal_url.clone(),
        })
    }

    /// Fetch the seasonal forecast for a window
    pub async fn get_seasonal(&self, query: &SeasonalQuery) -> AppResult<Value> {
        let params = [
            ("latitude", query.coordinates.latitude.to_string()),
            ("longitude", query.coordinates.longitude.to_string()),
            ("start", query.start.format("%Y-%m-%d").to_string()),
            ("end", query.end.format("%Y-%m-%d").to_string()),
            ("temperature_2m_max", "true".to_string()),
            ("precipitation_sum", "true".to_string()),
            ("timezone", query.timezone.clone()),
        ];

        let response = self
            .client
            .get(&self.seasonal_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream("seasonal weather", e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::upstream(
                "seasonal weather",
                format!("upstream error {}", status),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::upstream("seasonal weather", format!("unreadable body: {}", e)))
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current(&self, query: &CurrentQuery) -> AppResult<Value> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Weather API key not configured".to_string(),
            ));
        }

        let params = [
            ("lat", query.coordinates.latitude.to_string()),
            ("lon", query.coordinates.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", query.units.clone()),
        ];

        let response = self
            .client
            .get(&self.current_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream("current weather", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "current weather",
                format!("upstream error {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::upstream("current weather", format!("unreadable body: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn seasonal(&self, query: &SeasonalQuery) -> AppResult<Value> {
        self.get_seasonal(query).await
    }

    async fn current(&self, query: &CurrentQuery) -> AppResult<Value> {
        self.get_current(query).await
    }
}
