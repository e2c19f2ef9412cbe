//! Image strategy: tier -> ffmpeg quality-factor table (`-q:v`, lower is
//! better). Images carry no duration, so a target size is approximated by
//! scaling the quality factor with the requested size ratio instead of a
//! bitrate computation.

use crate::classifier::FileDescriptor;
use crate::settings::{CompressionSettings, QualityTier};

// Usable -q:v range for ffmpeg's image encoders
const Q_BEST: f64 = 2.0;
const Q_WORST: f64 = 31.0;

/// Quality factor per tier. Exhaustive over the tier enum.
fn quality_factor_for(settings: &CompressionSettings) -> u8 {
    match settings.quality_tier {
        QualityTier::High => 2,
        QualityTier::Medium => 5,
        QualityTier::Low => 10,
        QualityTier::Custom => {
            (Q_WORST - settings.custom_quality() as f64 / 100.0 * (Q_WORST - Q_BEST)).round() as u8
        }
    }
}

/// Quality factor derived from the requested output/input size ratio.
///
/// A smaller target pushes the factor toward the lossy end. Heuristic, not
/// exact: images give the encoder no rate control to target bytes with.
fn quality_factor_for_ratio(target_size: u64, input_size: u64) -> u8 {
    let ratio = (target_size as f64 / input_size as f64).clamp(0.0, 1.0);
    (Q_BEST + (1.0 - ratio) * (Q_WORST - Q_BEST)).round() as u8
}

/// Build the ffmpeg argument list for an image encode
pub fn encode_args(settings: &CompressionSettings, descriptor: &FileDescriptor) -> Vec<String> {
    let q = match settings.target_size() {
        Some(target) => quality_factor_for_ratio(target, descriptor.size),
        None => quality_factor_for(settings),
    };

    vec!["-q:v".to_string(), q.to_string()]
}
