//! Audio strategy: tier -> bitrate table, or a bitrate computed from the
//! target byte count over the probed source duration.

use crate::settings::{CompressionSettings, QualityTier};

const MIN_BITRATE: u32 = 32_000;
const MAX_BITRATE: u32 = 320_000;

/// Bitrate per tier in bits/second. Exhaustive over the tier enum.
fn bitrate_for(settings: &CompressionSettings) -> u32 {
    match settings.quality_tier {
        QualityTier::High => 256_000,
        QualityTier::Medium => 128_000,
        QualityTier::Low => 64_000,
        QualityTier::Custom => {
            let quality = settings.custom_quality() as u32;
            (MIN_BITRATE + quality * (MAX_BITRATE - MIN_BITRATE) / 100).min(MAX_BITRATE)
        }
    }
}

fn bitrate_for_target(target_bytes: u64, duration_secs: f64) -> u32 {
    ((target_bytes as f64 * 8.0 / duration_secs) as u32).clamp(MIN_BITRATE, MAX_BITRATE)
}

/// Build the ffmpeg argument list for an audio encode
pub fn encode_args(settings: &CompressionSettings, source_duration: Option<f64>) -> Vec<String> {
    let bitrate = match (settings.target_size(), source_duration) {
        (Some(target), Some(duration)) if duration > 0.0 => bitrate_for_target(target, duration),
        _ => bitrate_for(settings),
    };

    vec![
        "-vn".to_string(),
        "-b:a".to_string(),
        format!("{}k", bitrate / 1000),
    ]
}
