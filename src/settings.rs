//! # Compression Settings Module
//!
//! Combines a quality tier, optional advanced overrides and the
//! delete-original flag into the immutable settings object shared by an
//! entire batch run.
//!
//! ## Parameters:
//! - `quality_tier`: high | medium | low | custom
//! - `remove_input_file`: delete the source after a successful,
//!   size-reducing compression only (default: false)
//! - `advanced.output_folder`: destination directory override
//! - `advanced.target_size`: desired output byte count, overrides the tier
//!   tables
//! - `advanced.output_format`: desired output container, or keep original
//!
//! ## Validation:
//! - A target size must be strictly smaller than every input it applies to,
//!   checked at input time, never at encode time.

use crate::classifier::FileDescriptor;
use crate::error::SqshError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Coarse preset controlling compression aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    Medium,
    Low,
    Custom,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown quality tier: {other}")),
        }
    }
}

/// Optional overrides shared by the whole batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedSettings {
    /// Destination directory override (None = same directory as input)
    pub output_folder: Option<PathBuf>,
    /// Desired output byte count (None = tier defaults)
    pub target_size: Option<u64>,
    /// Desired output extension without dot (None = keep original)
    pub output_format: Option<String>,
}

/// Immutable settings object consumed by the encoder invocation.
///
/// Resolved once per batch and shared identically across every file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub quality_tier: QualityTier,
    /// Numeric quality override in percent, used by the `Custom` tier
    pub custom_quality: Option<u8>,
    pub remove_input_file: bool,
    pub advanced: Option<AdvancedSettings>,
}

impl CompressionSettings {
    /// Resolve tier + overrides into the shared settings object. Pure.
    pub fn resolve(
        quality_tier: QualityTier,
        custom_quality: Option<u8>,
        remove_input_file: bool,
        advanced: Option<AdvancedSettings>,
    ) -> Self {
        // An all-default advanced block carries no information
        let advanced = advanced.filter(|a| {
            a.output_folder.is_some() || a.target_size.is_some() || a.output_format.is_some()
        });

        Self {
            quality_tier,
            custom_quality: custom_quality.map(|q| q.clamp(1, 100)),
            remove_input_file,
            advanced,
        }
    }

    /// Effective percent quality for the `Custom` tier (midpoint default)
    pub fn custom_quality(&self) -> u8 {
        self.custom_quality.unwrap_or(50)
    }

    pub fn target_size(&self) -> Option<u64> {
        self.advanced.as_ref().and_then(|a| a.target_size)
    }

    pub fn output_format(&self) -> Option<&str> {
        self.advanced
            .as_ref()
            .and_then(|a| a.output_format.as_deref())
    }

    pub fn output_folder(&self) -> Option<&PathBuf> {
        self.advanced.as_ref().and_then(|a| a.output_folder.as_ref())
    }
}

/// Validate a target size against every input it applies to.
///
/// The target must be strictly smaller than each input file's size.
pub fn validate_target_size(
    target: u64,
    descriptors: &[FileDescriptor],
) -> Result<(), SqshError> {
    for descriptor in descriptors {
        if target >= descriptor.size {
            return Err(SqshError::InvalidTargetSize {
                target,
                size: descriptor.size,
                path: descriptor.path.display().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MediaCategory;

    fn descriptor(size: u64) -> FileDescriptor {
        FileDescriptor {
            path: PathBuf::from(format!("/media/file-{size}.mp4")),
            name: format!("file-{size}.mp4"),
            size,
            category: MediaCategory::Video,
            extension: "mp4".to_string(),
        }
    }

    #[test]
    fn test_resolve_drops_empty_advanced() {
        let settings = CompressionSettings::resolve(
            QualityTier::Medium,
            None,
            false,
            Some(AdvancedSettings::default()),
        );
        assert!(settings.advanced.is_none());
        assert!(settings.target_size().is_none());
        assert!(settings.output_format().is_none());
    }

    #[test]
    fn test_resolve_keeps_meaningful_advanced() {
        let settings = CompressionSettings::resolve(
            QualityTier::High,
            None,
            true,
            Some(AdvancedSettings {
                target_size: Some(1_000_000),
                output_format: Some("webm".to_string()),
                ..Default::default()
            }),
        );
        assert!(settings.remove_input_file);
        assert_eq!(settings.target_size(), Some(1_000_000));
        assert_eq!(settings.output_format(), Some("webm"));
    }

    #[test]
    fn test_target_size_must_undercut_every_input() {
        let files = vec![descriptor(5000), descriptor(2000)];

        assert!(validate_target_size(1999, &files).is_ok());
        // Equal is not smaller
        let err = validate_target_size(2000, &files).unwrap_err();
        match err {
            SqshError::InvalidTargetSize { target, size, .. } => {
                assert_eq!(target, 2000);
                assert_eq!(size, 2000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_quality_clamped_and_defaulted() {
        let settings = CompressionSettings::resolve(QualityTier::Custom, Some(0), false, None);
        assert_eq!(settings.custom_quality(), 1);

        let settings = CompressionSettings::resolve(QualityTier::Custom, None, false, None);
        assert_eq!(settings.custom_quality(), 50);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("HIGH".parse::<QualityTier>().unwrap(), QualityTier::High);
        assert_eq!("medium".parse::<QualityTier>().unwrap(), QualityTier::Medium);
        assert!("ultra".parse::<QualityTier>().is_err());
    }
}
