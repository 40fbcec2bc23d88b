//! Configuration management for the Farm2Value dashboard backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with F2V_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::GpsCoordinates;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Upstream weather services
    pub weather: WeatherConfig,

    /// Trained yield model service
    pub model: ModelConfig,

    /// Fallback location and timezone
    pub defaults: DefaultsConfig,

    /// External mango counting program
    pub counting: CountingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// OpenWeather API key; empty when not configured
    pub api_key: String,

    /// Current conditions endpoint
    pub current_url: String,

    /// Seasonal forecast endpoint
    pub seasonal_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Base URL of the model service; `/predict` is appended
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    /// Timezone passed to the seasonal service
    pub timezone: String,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,
}

impl DefaultsConfig {
    /// Fallback coordinates, when both halves are configured
    pub fn coordinates(&self) -> Option<GpsCoordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GpsCoordinates::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CountingConfig {
    /// Program to run; receives the image path as its last argument
    pub program: String,

    /// Arguments placed before the image path
    pub args: Vec<String>,

    /// Timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("F2V_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.api_key", "")?
            .set_default(
                "weather.current_url",
                "https://api.openweathermap.org/data/2.5/weather",
            )?
            .set_default(
                "weather.seasonal_url",
                "https://seasonal-api.open-meteo.com/v1/seasonal",
            )?
            .set_default("weather.timeout_secs", 10)?
            .set_default("model.base_url", "http://127.0.0.1:5000")?
            .set_default("model.timeout_secs", 15)?
            .set_default("defaults.timezone", "Asia/Kolkata")?
            .set_default("counting.program", "python")?
            .set_default("counting.args", vec!["count_mangoes.py"])?
            .set_default("counting.timeout_secs", 60)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (F2V prefix)
            .add_source(
                Environment::with_prefix("F2V")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("counting.args")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
