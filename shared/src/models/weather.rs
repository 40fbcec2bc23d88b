//! Weather data models and upstream payload normalization
//!
//! Upstream weather payloads are loosely shaped: the seasonal service has used several
//! container and series names over time. Every logical field is resolved through an
//! ordered list of candidate keys and yields `None` when nothing usable is present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::positive_finite;

pub const DEFAULT_RAINFALL_MM: f64 = 800.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 28.0;
pub const DEFAULT_HUMIDITY_PERCENT: f64 = 70.0;

/// Container keys of the seasonal payload, in priority order
const SEASONAL_CONTAINER_KEYS: [&str; 2] = ["monthly", "seasonal"];

/// Temperature series aliases, in priority order
const TEMPERATURE_SERIES_KEYS: [&str; 3] = ["temperature_2m_max", "temperature_2m_mean", "t2m"];

/// Precipitation series aliases, in priority order
const PRECIPITATION_SERIES_KEYS: [&str; 2] = ["precipitation_sum", "tp"];

/// Fully resolved weather used by the yield estimators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub rainfall_mm: f64,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub humidity_percent: f64,
}

impl WeatherObservation {
    pub fn new(rainfall_mm: f64, temperature_c: f64, humidity_percent: f64) -> Self {
        Self {
            rainfall_mm,
            temperature_c,
            humidity_percent,
        }
    }
}

impl Default for WeatherObservation {
    fn default() -> Self {
        Self::new(
            DEFAULT_RAINFALL_MM,
            DEFAULT_TEMPERATURE_C,
            DEFAULT_HUMIDITY_PERCENT,
        )
    }
}

/// Seasonal aggregate payload, tagged by the container it was found under
#[derive(Debug, Clone, Copy)]
pub enum SeasonalPayload<'a> {
    Monthly(&'a Map<String, Value>),
    Seasonal(&'a Map<String, Value>),
}

impl<'a> SeasonalPayload<'a> {
    /// Locate the first recognised container object in a raw payload
    pub fn parse(value: &'a Value) -> Option<Self> {
        SEASONAL_CONTAINER_KEYS.iter().find_map(|key| {
            let container = value.get(*key)?.as_object()?;
            Some(match *key {
                "monthly" => SeasonalPayload::Monthly(container),
                _ => SeasonalPayload::Seasonal(container),
            })
        })
    }

    fn container(&self) -> &'a Map<String, Value> {
        match *self {
            SeasonalPayload::Monthly(c) | SeasonalPayload::Seasonal(c) => c,
        }
    }

    /// Temperature series from the first alias holding a numeric array
    pub fn temperature_series(&self) -> Option<Vec<f64>> {
        first_series(self.container(), &TEMPERATURE_SERIES_KEYS)
    }

    /// Precipitation series from the first alias holding a numeric array
    pub fn precipitation_series(&self) -> Option<Vec<f64>> {
        first_series(self.container(), &PRECIPITATION_SERIES_KEYS)
    }
}

/// Read a numeric series from the first candidate key that holds one.
///
/// `null` entries (months without data) are skipped; any other non-numeric entry
/// disqualifies that candidate and the next alias is tried, so a malformed series
/// never shadows a well-formed one under a later key.
fn first_series(container: &Map<String, Value>, candidates: &[&str]) -> Option<Vec<f64>> {
    candidates.iter().find_map(|key| {
        let items = container.get(*key)?.as_array()?;
        items
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
    })
}

/// Current-conditions snapshot (`main.temp`, `main.humidity`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl CurrentSnapshot {
    pub fn parse(value: &Value) -> Self {
        let main = value.get("main");
        Self {
            temperature: main.and_then(|m| m.get("temp")).and_then(Value::as_f64),
            humidity: main.and_then(|m| m.get("humidity")).and_then(Value::as_f64),
        }
    }
}

/// Normalized view over the two upstream weather payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub avg_temperature: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub current_temperature: Option<f64>,
    pub current_humidity: Option<f64>,
}

impl WeatherSummary {
    /// Normalize whatever was retrieved. Missing payloads are tolerated.
    pub fn from_payloads(seasonal: Option<&Value>, current: Option<&Value>) -> Self {
        let seasonal = seasonal.and_then(SeasonalPayload::parse);
        let snapshot = current.map(CurrentSnapshot::parse).unwrap_or_default();

        let temps = seasonal.and_then(|s| s.temperature_series());
        let precip = seasonal.and_then(|s| s.precipitation_series());

        Self {
            avg_temperature: temps.as_deref().and_then(mean),
            total_precipitation: precip.as_deref().and_then(sum),
            current_temperature: snapshot.temperature,
            current_humidity: snapshot.humidity,
        }
    }

    /// Live temperature: the current reading first, then the seasonal mean
    pub fn live_temperature(&self) -> Option<f64> {
        self.current_temperature.or(self.avg_temperature)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// Where a resolved weather field came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    Client,
    Live,
    Default,
}

/// Weather values supplied by the client with the prediction request
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientWeather {
    pub rainfall_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
}

/// A complete observation together with the provenance of each field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeather {
    pub observation: WeatherObservation,
    pub rainfall_source: WeatherSource,
    pub temperature_source: WeatherSource,
    pub humidity_source: WeatherSource,
}

impl ResolvedWeather {
    /// Resolve each field as client value (finite and > 0), then live value, then default
    pub fn resolve(client: &ClientWeather, live: &WeatherSummary) -> Self {
        let (rainfall, rainfall_source) = pick(
            client.rainfall_mm,
            live.total_precipitation,
            DEFAULT_RAINFALL_MM,
        );
        let (temperature, temperature_source) = pick(
            client.temperature_c,
            live.live_temperature(),
            DEFAULT_TEMPERATURE_C,
        );
        let (humidity, humidity_source) = pick(
            client.humidity_percent,
            live.current_humidity,
            DEFAULT_HUMIDITY_PERCENT,
        );

        Self {
            observation: WeatherObservation::new(
                rainfall.max(0.0),
                temperature,
                humidity.clamp(0.0, 100.0),
            ),
            rainfall_source,
            temperature_source,
            humidity_source,
        }
    }

    /// True when every field fell back to the static default
    pub fn is_all_default(&self) -> bool {
        [
            self.rainfall_source,
            self.temperature_source,
            self.humidity_source,
        ]
        .iter()
        .all(|s| *s == WeatherSource::Default)
    }
}

fn pick(client: Option<f64>, live: Option<f64>, default: f64) -> (f64, WeatherSource) {
    if let Some(v) = positive_finite(client) {
        return (v, WeatherSource::Client);
    }
    match live.filter(|v| v.is_finite()) {
        Some(v) => (v, WeatherSource::Live),
        None => (default, WeatherSource::Default),
    }
}
