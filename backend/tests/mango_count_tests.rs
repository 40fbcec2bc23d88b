//! Mango counting integration tests
//!
//! Tests for the three counting tiers:
//! - Counting program result and confidence band
//! - Green-pixel heuristic over the decoded image
//! - Random last resort for undecodable uploads

mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::FakeCounter;
use farm2value_backend::services::MangoCountService;
use image::{ImageFormat, Rgb, RgbImage};
use proptest::prelude::*;

/// 10x10 PNG whose first `green_columns` columns are green-dominant
fn png(green_columns: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(10, 10, |x, _| {
        if x < green_columns {
            Rgb([40, 170, 60])
        } else {
            Rgb([200, 180, 150])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Counting program result is used with a jittered confidence
    #[tokio::test]
    async fn test_counter_tier() {
        let counter = Arc::new(FakeCounter::returning(10));
        let service = MangoCountService::new(counter.clone());

        let result = service.estimate(&png(2), "image/png").await;

        assert_eq!(result.mango_count, 10);
        assert_eq!(result.yield_estimate, 2.5);
        // 86 +/- 3
        assert!((83.0..=89.0).contains(&result.confidence));
        assert!(result.segmented_image.starts_with("data:image/png;base64,"));
        assert!(result.analysis.contains("counting model"));
    }

    /// The staged upload is removed once counting finishes
    #[tokio::test]
    async fn test_staged_upload_cleaned_up() {
        let counter = Arc::new(FakeCounter::returning(4));
        MangoCountService::new(counter.clone())
            .estimate(&png(2), "image/png")
            .await;

        let staged = counter.staged_paths.lock().unwrap();
        assert_eq!(staged.len(), 1);
        let name = staged[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("mango_"));
        assert!(name.ends_with(".png"));
        assert!(!staged[0].exists());
    }

    /// Counting program failure falls back to the green-pixel heuristic
    #[tokio::test]
    async fn test_pixel_heuristic_tier() {
        let service = MangoCountService::new(Arc::new(FakeCounter::failing()));

        let result = service.estimate(&png(4), "image/png").await;

        // 40% green / 4% per fruit
        assert_eq!(result.mango_count, 10);
        assert_eq!(result.yield_estimate, 2.5);
        assert_eq!(result.confidence, 76.0);
        assert!(result.analysis.contains("pixel heuristic"));
    }

    /// An upload that cannot be staged skips the counting program and uses the pixel tier
    #[tokio::test]
    async fn test_staging_failure_falls_to_pixel_tier() {
        let counter = Arc::new(FakeCounter::returning(10));
        let missing_dir = std::env::temp_dir().join("farm2value-missing-staging-dir");
        let service = MangoCountService::new(counter.clone()).with_staging_dir(missing_dir);

        let result = service.estimate(&png(4), "image/png").await;

        assert!(counter.staged_paths.lock().unwrap().is_empty());
        assert_eq!(result.mango_count, 10);
        assert_eq!(result.confidence, 76.0);
        assert!(result.analysis.contains("pixel heuristic"));
    }

    /// Undecodable bytes end at the random tier
    #[tokio::test]
    async fn test_random_tier() {
        let service = MangoCountService::new(Arc::new(FakeCounter::failing()));

        let result = service
            .estimate(b"definitely not an image", "image/jpeg")
            .await;

        assert!((3..=12).contains(&result.mango_count));
        assert_eq!(result.confidence, 60.0);
        assert_eq!(
            result.yield_estimate,
            (result.mango_count as f64 * 0.25 * 100.0).round() / 100.0
        );
        assert!(result.segmented_image.starts_with("data:image/jpeg;base64,"));
    }

    /// Response serializes with the dashboard's field names
    #[tokio::test]
    async fn test_response_field_names() {
        let service = MangoCountService::new(Arc::new(FakeCounter::returning(7)));
        let result = service.estimate(&png(1), "image/png").await;

        let body = serde_json::to_value(&result).unwrap();
        for key in ["mangoCount", "yield", "confidence", "analysis", "segmentedImage"] {
            assert!(body.get(key).is_some(), "missing {}", key);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Confidence always stays inside [60, 98] whatever the counter reports
        #[test]
        fn prop_counter_confidence_bounded(count in 0u32..200) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let service = MangoCountService::new(Arc::new(FakeCounter::returning(count)));
            let result = runtime.block_on(service.estimate(&png(3), "image/png"));

            prop_assert!((60.0..=98.0).contains(&result.confidence));
            prop_assert_eq!(result.mango_count, count);
        }
    }
}
