//! Weather integration tests
//!
//! Tests for weather data including:
//! - Seasonal and current passthrough validation
//! - District summaries
//! - Weather derivation with default substitution

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{test_config, FakeWeather};
use farm2value_backend::services::weather::{CurrentParams, SeasonalParams, WeatherService};
use farm2value_backend::AppError;
use proptest::prelude::*;
use serde_json::json;
use shared::{ClientWeather, GpsCoordinates, WeatherObservation, WeatherSource};

fn service(weather: &Arc<FakeWeather>) -> WeatherService {
    WeatherService::new(weather.clone(), test_config().defaults)
}

fn service_with_default_location(weather: &Arc<FakeWeather>) -> WeatherService {
    let mut defaults = test_config().defaults;
    defaults.latitude = Some(13.0);
    defaults.longitude = Some(76.1);
    WeatherService::new(weather.clone(), defaults)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Seasonal passthrough without coordinates or defaults is a client error
    #[tokio::test]
    async fn test_seasonal_requires_coordinates() {
        let weather = Arc::new(FakeWeather::healthy());
        let result = service(&weather).seasonal(SeasonalParams::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(weather.calls(), (0, 0));
    }

    /// Seasonal passthrough falls back to configured coordinates
    #[tokio::test]
    async fn test_seasonal_uses_default_coordinates() {
        let weather = Arc::new(FakeWeather::healthy());
        let payload = service_with_default_location(&weather)
            .seasonal(SeasonalParams::default())
            .await
            .unwrap();

        assert_eq!(payload, common::seasonal_payload());
        let seen = weather.seen_seasonal.lock().unwrap();
        assert_eq!(seen[0].coordinates, GpsCoordinates::new(13.0, 76.1));
        assert_eq!(seen[0].timezone, "Asia/Kolkata");
    }

    /// Explicit window and timezone are forwarded
    #[tokio::test]
    async fn test_seasonal_explicit_window() {
        let weather = Arc::new(FakeWeather::healthy());
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();

        service(&weather)
            .seasonal(SeasonalParams {
                latitude: Some(12.52),
                longitude: Some(76.9),
                start: Some(start),
                end: Some(end),
                timezone: Some("UTC".to_string()),
            })
            .await
            .unwrap();

        let seen = weather.seen_seasonal.lock().unwrap();
        assert_eq!(seen[0].start, start);
        assert_eq!(seen[0].end, end);
        assert_eq!(seen[0].timezone, "UTC");
    }

    /// Upstream failures surface as upstream errors on the passthrough
    #[tokio::test]
    async fn test_seasonal_upstream_failure() {
        let weather = Arc::new(FakeWeather::down());
        let result = service(&weather)
            .seasonal(SeasonalParams {
                latitude: Some(12.52),
                longitude: Some(76.9),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    /// Current passthrough needs both coordinates in range
    #[tokio::test]
    async fn test_current_validation() {
        let weather = Arc::new(FakeWeather::healthy());
        let svc = service(&weather);

        let missing = svc
            .current(CurrentParams {
                lat: Some(13.0),
                lon: None,
                units: None,
            })
            .await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let out_of_range = svc
            .current(CurrentParams {
                lat: Some(91.0),
                lon: Some(77.0),
                units: None,
            })
            .await;
        assert!(matches!(out_of_range, Err(AppError::Validation(_))));

        let ok = svc
            .current(CurrentParams {
                lat: Some(13.0),
                lon: Some(77.0),
                units: None,
            })
            .await
            .unwrap();
        assert_eq!(ok, common::current_payload());
    }

    /// District summary carries the normalized aggregate
    #[tokio::test]
    async fn test_district_weather_summary() {
        let weather = Arc::new(FakeWeather::healthy());
        let district = service(&weather).district_weather(" Kolar ").await.unwrap();

        let summary = &district.summary;
        assert_eq!(summary.district, "Kolar");
        assert_eq!(summary.latitude, 13.14);
        assert_eq!(summary.longitude, 78.13);
        assert_eq!(summary.avg_temperature_period_c, Some(31.0));
        assert_eq!(summary.total_precipitation_period_mm, Some(300.0));
        assert_eq!(summary.current_temperature_c, Some(29.5));
        assert_eq!(summary.current_humidity_percent, Some(62.0));
        assert_eq!(summary.timezone, "Asia/Kolkata");

        let body = serde_json::to_value(&district).unwrap();
        assert_eq!(body["summary"]["avg_temperature_period_C"], json!(31.0));
        assert_eq!(body["current"], common::current_payload());
    }

    /// Missing and unknown districts are rejected
    #[tokio::test]
    async fn test_district_weather_rejections() {
        let weather = Arc::new(FakeWeather::healthy());
        let svc = service(&weather);

        assert!(matches!(
            svc.district_weather("  ").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.district_weather("Atlantis").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(weather.calls(), (0, 0));
    }

    /// District weather is strict about upstream failures
    #[tokio::test]
    async fn test_district_weather_upstream_failure() {
        let weather = Arc::new(FakeWeather::down());
        let result = service(&weather).district_weather("Mandya").await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    /// Both fetches failing and no client values gives the exact defaults
    #[tokio::test]
    async fn test_derive_defaults_when_everything_fails() {
        let weather = Arc::new(FakeWeather::down());
        let resolved = service(&weather)
            .derive(&ClientWeather::default(), Some(GpsCoordinates::new(13.34, 77.1)))
            .await;

        assert_eq!(resolved.observation, WeatherObservation::new(800.0, 28.0, 70.0));
        assert!(resolved.is_all_default());
        assert_eq!(weather.calls(), (1, 1));
    }

    /// A single healthy upstream is enough to fill its fields
    #[tokio::test]
    async fn test_derive_with_only_seasonal() {
        let weather = Arc::new(FakeWeather {
            seasonal: Some(common::seasonal_payload()),
            ..Default::default()
        });
        let resolved = service(&weather)
            .derive(&ClientWeather::default(), Some(GpsCoordinates::new(13.34, 77.1)))
            .await;

        assert_eq!(resolved.observation.rainfall_mm, 300.0);
        // seasonal mean stands in for the missing current reading
        assert_eq!(resolved.observation.temperature_c, 31.0);
        assert_eq!(resolved.observation.humidity_percent, 70.0);
        assert_eq!(resolved.rainfall_source, WeatherSource::Live);
        assert_eq!(resolved.humidity_source, WeatherSource::Default);
    }

    /// Coordinate resolution order: request, district, configured defaults
    #[test]
    fn test_resolve_coordinates_order() {
        let weather = Arc::new(FakeWeather::healthy());
        let svc = service_with_default_location(&weather);
        let requested = GpsCoordinates::new(12.0, 77.0);

        assert_eq!(
            svc.resolve_coordinates(Some(requested), Some("Kolar")),
            Some(requested)
        );
        assert_eq!(
            svc.resolve_coordinates(None, Some("Kolar")),
            Some(GpsCoordinates::new(13.14, 78.13))
        );
        assert_eq!(
            svc.resolve_coordinates(Some(GpsCoordinates::new(123.0, 77.0)), Some("Atlantis")),
            Some(GpsCoordinates::new(13.0, 76.1))
        );
        assert_eq!(service(&weather).resolve_coordinates(None, Some("Atlantis")), None);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Positive client rainfall always wins over live data
        #[test]
        fn prop_client_rainfall_wins(rainfall in 0.1f64..5000.0) {
            let weather = Arc::new(FakeWeather::healthy());
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let resolved = runtime.block_on(service(&weather).derive(
                &ClientWeather { rainfall_mm: Some(rainfall), ..Default::default() },
                Some(GpsCoordinates::new(13.34, 77.1)),
            ));

            prop_assert_eq!(resolved.observation.rainfall_mm, rainfall);
            prop_assert_eq!(resolved.rainfall_source, WeatherSource::Client);
        }
    }
}
