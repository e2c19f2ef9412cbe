//! # Encoder Invocation Service
//!
//! The boundary between the batch orchestrator and the external encoder
//! binary. One in-flight invocation per call; the orchestrator guarantees
//! at most one concurrent invocation process-wide.
//!
//! ## Responsibilities:
//! - Dispatch to a category-specific strategy (video / image / audio)
//! - Drive ffmpeg and forward monotone progress percentages
//! - Size-safety policy: an output that is not strictly smaller than its
//!   input is deleted and the result reshaped to "already optimized"
//! - Delete the original input only after a finalized, size-reducing
//!   success, and only when requested
//! - Delete partial outputs when the encoder fails
//!
//! The `Encoder` trait is the testing seam: the orchestrator only sees the
//! trait, so batch behavior is exercised with stubs and no ffmpeg.

mod audio;
mod ffmpeg;
mod image;
mod video;

use crate::classifier::{FileDescriptor, MediaCategory};
use crate::error::SqshError;
use crate::output_path::OutputPathAllocator;
use crate::settings::CompressionSettings;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Channel end the encoder pushes percentage updates into
pub type ProgressSender = UnboundedSender<u8>;

/// Outcome of one file's compression
#[derive(Debug, Clone, Serialize)]
pub struct CompressionResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input_size: u64,
    pub output_size: u64,
    /// May be negative only transiently inside the service; published
    /// results are either reducing or reshaped to already-optimized
    pub saved_bytes: i64,
    pub saved_percentage: f64,
    /// Wall-clock seconds spent compressing this file
    pub duration: f64,
    pub input_file_removed: bool,
    pub already_optimized: bool,
}

impl CompressionResult {
    fn reduced(
        descriptor: &FileDescriptor,
        output_path: PathBuf,
        output_size: u64,
        duration: f64,
        input_file_removed: bool,
    ) -> Self {
        let saved_bytes = descriptor.size as i64 - output_size as i64;
        Self {
            input_path: descriptor.path.clone(),
            output_path,
            input_size: descriptor.size,
            output_size,
            saved_bytes,
            saved_percentage: saved_bytes as f64 / descriptor.size as f64 * 100.0,
            duration,
            input_file_removed,
            already_optimized: false,
        }
    }

    /// The no-op shape: original preserved, nothing saved, nothing removed
    fn already_optimized(descriptor: &FileDescriptor, duration: f64) -> Self {
        Self {
            input_path: descriptor.path.clone(),
            output_path: descriptor.path.clone(),
            input_size: descriptor.size,
            output_size: descriptor.size,
            saved_bytes: 0,
            saved_percentage: 0.0,
            duration,
            input_file_removed: false,
            already_optimized: true,
        }
    }
}

/// Port for driving one compression invocation
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Compress one file under the shared batch settings.
    ///
    /// Progress percentages sent over `progress` are in `[0, 100]` and
    /// non-decreasing; 100 is emitted before resolution.
    async fn compress(
        &self,
        descriptor: &FileDescriptor,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> Result<CompressionResult, SqshError>;
}

/// Production encoder backed by the external ffmpeg binary
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn compress(
        &self,
        descriptor: &FileDescriptor,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> Result<CompressionResult, SqshError> {
        let started = Instant::now();

        let output_path =
            OutputPathAllocator::allocate(&descriptor.path, settings.advanced.as_ref())?;

        // Source duration is probed lazily: only target-size math and
        // progress attribution for time-based media need it
        let source_duration = match descriptor.category {
            MediaCategory::Video | MediaCategory::Audio => {
                Some(ffmpeg::probe_duration(&descriptor.path).await?)
            }
            MediaCategory::Image => None,
        };

        let args = match descriptor.category {
            MediaCategory::Video => video::encode_args(settings, source_duration),
            MediaCategory::Image => image::encode_args(settings, descriptor),
            MediaCategory::Audio => audio::encode_args(settings, source_duration),
        };

        let encode = ffmpeg::run(
            &descriptor.path,
            &output_path,
            &args,
            source_duration,
            &progress,
        )
        .await;

        if let Err(e) = encode {
            // Don't leave partial artifacts behind
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(e);
        }

        let elapsed = started.elapsed().as_secs_f64();
        let result = finalize(descriptor, settings, output_path, elapsed).await?;
        let _ = progress.send(100);
        Ok(result)
    }
}

/// Shape the final result after the external encoder has written its
/// output, applying the size-safety and input-deletion policies.
async fn finalize(
    descriptor: &FileDescriptor,
    settings: &CompressionSettings,
    output_path: PathBuf,
    elapsed: f64,
) -> Result<CompressionResult, SqshError> {
    let output_size = match tokio::fs::metadata(&output_path).await {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            // An unverifiable output cannot be published; don't leave it behind
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(e.into());
        }
    };

    // Size-safety policy: never leave a larger or equal-size artifact
    if output_size >= descriptor.size {
        debug!(
            "Output not smaller ({} >= {}), discarding: {}",
            output_size,
            descriptor.size,
            output_path.display()
        );
        tokio::fs::remove_file(&output_path).await?;
        return Ok(CompressionResult::already_optimized(descriptor, elapsed));
    }

    // Input deletion is a strict postcondition of a size-reducing success;
    // an already-optimized result never reaches this point
    let mut input_file_removed = false;
    if settings.remove_input_file {
        match tokio::fs::remove_file(&descriptor.path).await {
            Ok(()) => {
                input_file_removed = true;
                info!("Removed original file: {}", descriptor.path.display());
            }
            // The compression itself succeeded; report it as such and keep
            // the result honest about the input still being there
            Err(e) => warn!(
                "Could not remove original file {}: {}",
                descriptor.path.display(),
                e
            ),
        }
    }

    Ok(CompressionResult::reduced(
        descriptor,
        output_path,
        output_size,
        elapsed,
        input_file_removed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MediaCategory;

    fn descriptor() -> FileDescriptor {
        FileDescriptor {
            path: PathBuf::from("/media/clip.mp4"),
            name: "clip.mp4".to_string(),
            size: 100_000_000,
            category: MediaCategory::Video,
            extension: "mp4".to_string(),
        }
    }

    #[test]
    fn test_reduced_result_shape() {
        let result = CompressionResult::reduced(
            &descriptor(),
            PathBuf::from("/media/clip-sqshed.mp4"),
            60_000_000,
            12.5,
            false,
        );
        assert_eq!(result.saved_bytes, 40_000_000);
        assert!((result.saved_percentage - 40.0).abs() < f64::EPSILON);
        assert!(!result.already_optimized);
        assert!(result.output_size < result.input_size);
    }

    #[test]
    fn test_already_optimized_result_shape() {
        let result = CompressionResult::already_optimized(&descriptor(), 3.0);
        assert_eq!(result.output_path, result.input_path);
        assert_eq!(result.output_size, result.input_size);
        assert_eq!(result.saved_bytes, 0);
        assert!(!result.input_file_removed);
        assert!(result.already_optimized);
    }

    async fn fixture(
        dir: &tempfile::TempDir,
        input_bytes: usize,
        output_bytes: usize,
    ) -> (FileDescriptor, PathBuf) {
        let input = dir.path().join("photo.jpg");
        let output = dir.path().join("photo-sqshed.jpg");
        tokio::fs::write(&input, vec![0u8; input_bytes]).await.unwrap();
        tokio::fs::write(&output, vec![0u8; output_bytes]).await.unwrap();

        let descriptor = FileDescriptor {
            path: input,
            name: "photo.jpg".to_string(),
            size: input_bytes as u64,
            category: MediaCategory::Image,
            extension: "jpg".to_string(),
        };
        (descriptor, output)
    }

    fn settings(remove_input_file: bool) -> CompressionSettings {
        CompressionSettings::resolve(
            crate::settings::QualityTier::Medium,
            None,
            remove_input_file,
            None,
        )
    }

    #[tokio::test]
    async fn test_finalize_discards_larger_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 11).await;

        let result = finalize(&descriptor, &settings(false), output.clone(), 1.0)
            .await
            .unwrap();
        assert!(result.already_optimized);
        assert_eq!(result.output_size, 10);
        // The oversized artifact is gone, the original untouched
        assert!(!output.exists());
        assert!(descriptor.path.exists());
    }

    #[tokio::test]
    async fn test_finalize_never_deletes_input_on_optimized_result() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 10).await;

        let result = finalize(&descriptor, &settings(true), output, 1.0)
            .await
            .unwrap();
        assert!(result.already_optimized);
        assert!(!result.input_file_removed);
        assert!(descriptor.path.exists());
    }

    #[tokio::test]
    async fn test_finalize_keeps_smaller_output_and_removes_input_on_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 6).await;

        let result = finalize(&descriptor, &settings(true), output.clone(), 1.0)
            .await
            .unwrap();
        assert!(!result.already_optimized);
        assert_eq!(result.output_size, 6);
        assert_eq!(result.saved_bytes, 4);
        assert!(result.input_file_removed);
        assert!(output.exists());
        assert!(!descriptor.path.exists());
    }

    #[tokio::test]
    async fn test_finalize_reports_success_when_input_removal_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 6).await;
        // Input vanished between encode and cleanup; the unlink will fail
        tokio::fs::remove_file(&descriptor.path).await.unwrap();

        let result = finalize(&descriptor, &settings(true), output.clone(), 1.0)
            .await
            .unwrap();
        assert!(!result.already_optimized);
        assert_eq!(result.saved_bytes, 4);
        assert!(!result.input_file_removed);
        // The valid output stays where the result says it is
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_finalize_errors_on_unreadable_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 6).await;
        tokio::fs::remove_file(&output).await.unwrap();

        let result = finalize(&descriptor, &settings(false), output, 1.0).await;
        assert!(result.is_err());
        assert!(descriptor.path.exists());
    }

    #[tokio::test]
    async fn test_finalize_keeps_input_by_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let (descriptor, output) = fixture(&dir, 10, 6).await;

        let result = finalize(&descriptor, &settings(false), output, 1.0)
            .await
            .unwrap();
        assert!(!result.input_file_removed);
        assert!(descriptor.path.exists());
    }
}
