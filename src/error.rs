//! # Error Types Module
//!
//! All custom error categories used across the application.
//!
//! ## Categories:
//! - `Io`: filesystem failures (missing files, permissions, etc.)
//! - `Classification`: unsupported or missing input path
//! - `InvalidDestination`: output-folder override does not exist or is not a directory
//! - `InvalidTargetSize`: requested target size not smaller than a source file
//! - `BatchValidation`: batch-level rejection before any encoding starts
//! - `Encode`: external encoder failure for a single file
//! - `MissingDependency`: ffmpeg/ffprobe not found on the system
//!
//! Per-file `Encode` errors are captured into the batch records and never
//! abort a run; `BatchValidation` and `MissingDependency` surface before
//! any file enters compression.

/// Custom error types for the compression pipeline
#[derive(thiserror::Error, Debug)]
pub enum SqshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported or invalid input: {0}")]
    Classification(String),

    #[error("Invalid destination folder: {0}")]
    InvalidDestination(String),

    #[error("Target size {target} is not smaller than {path} ({size} bytes)")]
    InvalidTargetSize {
        target: u64,
        size: u64,
        path: String,
    },

    #[error("Batch validation failed: {0}")]
    BatchValidation(String),

    #[error("Encoder error: {0}")]
    Encode(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),
}
