//! Video strategy: tier -> x264 CRF table, or a target bitrate computed
//! from the requested byte count and the probed source duration.

use crate::settings::{CompressionSettings, QualityTier};

const AUDIO_BITRATE: u32 = 128_000;
const MIN_VIDEO_BITRATE: u32 = 100_000;

/// CRF per tier (lower = better quality). Exhaustive over the tier enum.
fn crf_for(settings: &CompressionSettings) -> u8 {
    match settings.quality_tier {
        QualityTier::High => 20,
        QualityTier::Medium => 26,
        QualityTier::Low => 32,
        // Percent quality mapped onto the useful 18..=51 CRF range
        QualityTier::Custom => {
            (51.0 - settings.custom_quality() as f64 / 100.0 * 33.0).round() as u8
        }
    }
}

/// Build the ffmpeg argument list for a video encode
pub fn encode_args(settings: &CompressionSettings, source_duration: Option<f64>) -> Vec<String> {
    let mut args = vec!["-c:v".to_string(), "libx264".to_string()];

    match (settings.target_size(), source_duration) {
        (Some(target), Some(duration)) if duration > 0.0 => {
            let bitrate = video_bitrate_for_target(target, duration);
            args.extend([
                "-b:v".to_string(),
                bitrate.to_string(),
                "-maxrate".to_string(),
                bitrate.to_string(),
                "-bufsize".to_string(),
                (bitrate * 2).to_string(),
            ]);
        }
        _ => {
            args.extend([
                "-preset".to_string(),
                "medium".to_string(),
                "-crf".to_string(),
                crf_for(settings).to_string(),
            ]);
        }
    }

    args.extend([
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", AUDIO_BITRATE / 1000),
    ]);

    args
}

/// Total bits that fit in the target, minus the audio track's share
fn video_bitrate_for_target(target_bytes: u64, duration_secs: f64) -> u32 {
    let total_bitrate = (target_bytes as f64 * 8.0 / duration_secs) as u32;
    total_bitrate
        .saturating_sub(AUDIO_BITRATE)
        .max(MIN_VIDEO_BITRATE)
}
