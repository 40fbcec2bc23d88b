//! Mango counting service
//!
//! Counts fruit in an uploaded image with three tiers: the external counting
//! program, a green-pixel ratio over the decoded image, and a bounded random guess.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use shared::{
    base_confidence, clamp_confidence, confidence_for_count, count_from_green_ratio,
    is_green_dominant, CountingTier, MangoCountResult, CONFIDENCE_JITTER, RANDOM_COUNT_RANGE,
};

use crate::error::{AppError, AppResult};
use crate::external::MangoCounter;

/// Confidence penalty applied to the pixel heuristic
const PIXEL_CONFIDENCE_PENALTY: f64 = 10.0;

/// Confidence reported for the random tier
const RANDOM_CONFIDENCE: f64 = 60.0;

#[derive(Clone)]
pub struct MangoCountService {
    counter: Arc<dyn MangoCounter>,
    /// Where uploads are staged for the counting program; system temp dir when unset
    staging_dir: Option<PathBuf>,
}

impl MangoCountService {
    pub fn new(counter: Arc<dyn MangoCounter>) -> Self {
        Self {
            counter,
            staging_dir: None,
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Count mangoes in an uploaded image. Every tier failure moves on to the next
    /// tier, so this always answers.
    pub async fn estimate(&self, bytes: &[u8], content_type: &str) -> MangoCountResult {
        let segmented_image = data_uri(bytes, content_type);

        match self.run_counter(bytes, content_type).await {
            Ok(count) => {
                let confidence = confidence_for_count(count, confidence_jitter());
                tracing::info!("Counted {} mangoes with the counting program", count);
                return MangoCountResult::new(
                    CountingTier::Counter,
                    count,
                    confidence,
                    segmented_image,
                );
            }
            Err(e) => tracing::warn!("Counting program failed: {}", e),
        }

        let owned = bytes.to_vec();
        let pixel_count = tokio::task::spawn_blocking(move || count_green_pixels(&owned))
            .await
            .unwrap_or_else(|e| Err(format!("pixel heuristic task failed: {}", e)));

        match pixel_count {
            Ok(count) => {
                let confidence =
                    clamp_confidence(base_confidence(count) - PIXEL_CONFIDENCE_PENALTY);
                tracing::info!("Estimated {} mangoes from green pixel ratio", count);
                MangoCountResult::new(
                    CountingTier::PixelHeuristic,
                    count,
                    confidence,
                    segmented_image,
                )
            }
            Err(reason) => {
                tracing::warn!("Pixel heuristic failed: {}", reason);
                let count = random_count();
                MangoCountResult::new(
                    CountingTier::Random,
                    count,
                    RANDOM_CONFIDENCE,
                    segmented_image,
                )
            }
        }
    }

    /// Stage the upload and run the counting program over it
    async fn run_counter(&self, bytes: &[u8], content_type: &str) -> AppResult<u32> {
        let staged = stage_upload(self.staging_dir.as_deref(), bytes, content_type).await?;
        self.counter.count(staged.path()).await
    }
}

/// Write the upload to a temporary file the counting program can read.
/// The file is removed when the handle drops.
async fn stage_upload(
    dir: Option<&Path>,
    bytes: &[u8],
    content_type: &str,
) -> AppResult<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("mango_").suffix(extension_for(content_type));
    let staged = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;

    tokio::fs::write(staged.path(), bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;
    Ok(staged)
}

pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        _ => ".jpg",
    }
}

/// Inline the upload as a `data:` URI
pub fn data_uri(bytes: &[u8], content_type: &str) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Decode the image and estimate a count from its green-dominant share
pub fn count_green_pixels(bytes: &[u8]) -> Result<u32, String> {
    let rgb = image::load_from_memory(bytes)
        .map_err(|e| format!("undecodable image: {}", e))?
        .to_rgb8();

    let total = rgb.width() as u64 * rgb.height() as u64;
    let green = rgb
        .pixels()
        .filter(|p| is_green_dominant(p[0], p[1], p[2]))
        .count() as u64;

    count_from_green_ratio(green, total).ok_or_else(|| "image has no pixels".to_string())
}

fn confidence_jitter() -> f64 {
    rand::rng().random_range(-CONFIDENCE_JITTER..=CONFIDENCE_JITTER)
}

fn random_count() -> u32 {
    let (low, high) = RANDOM_COUNT_RANGE;
    rand::rng().random_range(low..=high)
}
