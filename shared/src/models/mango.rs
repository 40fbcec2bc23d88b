//! Image-based mango counting models

use serde::{Deserialize, Serialize};

/// Average fruit mass used to turn a count into a harvest estimate
pub const AVERAGE_MANGO_MASS_KG: f64 = 0.25;

/// Share of the frame a single fruit covers in a segmented image
pub const MANGO_FRAME_RATIO: f64 = 0.04;

/// Inclusive bounds of the random last-resort count
pub const RANDOM_COUNT_RANGE: (u32, u32) = (3, 12);

/// Maximum absolute jitter added to the primary-tier confidence
pub const CONFIDENCE_JITTER: f64 = 3.0;

const MIN_CONFIDENCE: f64 = 60.0;
const MAX_CONFIDENCE: f64 = 98.0;

/// Which counting tier produced a result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountingTier {
    /// External counting program
    Counter,
    /// Green-pixel ratio over the uploaded image
    PixelHeuristic,
    /// Bounded random guess
    Random,
}

impl std::fmt::Display for CountingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountingTier::Counter => write!(f, "counting model"),
            CountingTier::PixelHeuristic => write!(f, "pixel heuristic"),
            CountingTier::Random => write!(f, "random estimate"),
        }
    }
}

/// Response envelope of the image counting endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MangoCountResult {
    pub mango_count: u32,
    #[serde(rename = "yield")]
    pub yield_estimate: f64,
    pub confidence: f64,
    pub analysis: String,
    /// Data URI of the image the count was taken from
    pub segmented_image: String,
}

impl MangoCountResult {
    pub fn new(tier: CountingTier, mango_count: u32, confidence: f64, segmented_image: String) -> Self {
        let yield_estimate = yield_for_count(mango_count);
        Self {
            mango_count,
            yield_estimate,
            confidence: clamp_confidence(confidence),
            analysis: format!(
                "Detected {} mangoes using {}. Estimated harvest: {} kg.",
                mango_count, tier, yield_estimate
            ),
            segmented_image,
        }
    }
}

/// Harvest estimate in kg, rounded to two decimals
pub fn yield_for_count(count: u32) -> f64 {
    (count as f64 * AVERAGE_MANGO_MASS_KG * 100.0).round() / 100.0
}

/// Tiered confidence score before jitter
pub fn base_confidence(count: u32) -> f64 {
    let mut score = 78.0;
    if count > 8 {
        score += 8.0;
    }
    if count > 15 {
        score += 6.0;
    }
    if count > 25 {
        score += 4.0;
    }
    if count < 5 {
        score -= 15.0;
    }
    if count < 2 {
        score -= 20.0;
    }
    score
}

/// Confidence for the primary tier: tiered score plus jitter, clamped to [60, 98].
///
/// `jitter` is limited to ±3.
pub fn confidence_for_count(count: u32, jitter: f64) -> f64 {
    let jitter = if jitter.is_finite() {
        jitter.clamp(-CONFIDENCE_JITTER, CONFIDENCE_JITTER)
    } else {
        0.0
    };
    clamp_confidence(base_confidence(count) + jitter)
}

pub fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Estimate a count from the share of green-dominant pixels. Never below 1.
///
/// Returns `None` when the image has no pixels.
pub fn count_from_green_ratio(green_pixels: u64, total_pixels: u64) -> Option<u32> {
    if total_pixels == 0 {
        return None;
    }
    let ratio = green_pixels as f64 / total_pixels as f64;
    let estimate = (ratio / MANGO_FRAME_RATIO).round();
    Some((estimate as u32).max(1))
}

/// A pixel counts as green-dominant when its green channel exceeds red and blue by
/// more than 15.
pub fn is_green_dominant(r: u8, g: u8, b: u8) -> bool {
    let g = g as i16;
    g - r as i16 > 15 && g - b as i16 > 15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_confidence_tiers() {
        assert_eq!(base_confidence(1), 43.0);
        assert_eq!(base_confidence(3), 63.0);
        assert_eq!(base_confidence(6), 78.0);
        assert_eq!(base_confidence(10), 86.0);
        assert_eq!(base_confidence(20), 92.0);
        assert_eq!(base_confidence(40), 96.0);
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(confidence_for_count(0, 0.0), 60.0);
        assert_eq!(confidence_for_count(40, 3.0), 98.0);
        assert_eq!(confidence_for_count(40, 50.0), 98.0);
        assert_eq!(confidence_for_count(10, -10.0), 83.0);
        assert_eq!(confidence_for_count(10, f64::NAN), 86.0);
    }

    #[test]
    fn test_green_ratio_count() {
        assert_eq!(count_from_green_ratio(0, 100), Some(1));
        assert_eq!(count_from_green_ratio(20, 100), Some(5));
        assert_eq!(count_from_green_ratio(100, 100), Some(25));
        assert_eq!(count_from_green_ratio(0, 0), None);
    }

    #[test]
    fn test_green_dominance() {
        assert!(is_green_dominant(0, 255, 0));
        assert!(is_green_dominant(100, 140, 90));
        assert!(!is_green_dominant(200, 210, 50));
        assert!(!is_green_dominant(255, 255, 255));
    }

    #[test]
    fn test_result_envelope() {
        let result = MangoCountResult::new(CountingTier::Counter, 12, 99.5, "data:,".to_string());
        assert_eq!(result.confidence, 98.0);
        assert_eq!(result.yield_estimate, 3.0);
        assert!(result.analysis.contains("12 mangoes"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["mangoCount"], 12);
        assert!(value.get("segmentedImage").is_some());
        assert!(value.get("yield").is_some());
    }
}
