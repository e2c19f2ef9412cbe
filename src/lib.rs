//! # sqshed
//!
//! Library behind the `sqshed` binary: walks a user through selecting
//! media files, choosing compression settings, and driving an external
//! ffmpeg binary to produce smaller outputs, with live progress and a
//! batch summary.
//!
//! ## Module map:
//! - `classifier`: path -> media descriptor (video / image / audio)
//! - `settings`: quality tiers and the shared per-batch settings object
//! - `output_path`: `-sqshed` naming and collision-free allocation
//! - `encoder`: the ffmpeg invocation service and its size-safety policy
//! - `batch`: the sequential batch orchestrator and its state machines
//! - `summary`: result aggregation and rendering
//! - `progress`: terminal progress reporting
//! - `session`: two-stage interrupt confirmation
//! - `platform`: cross-platform tool names and the dependency check
//! - `interactive`: the no-argument prompt flow
//! - `error`: the typed error taxonomy

pub mod batch;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod interactive;
pub mod output_path;
pub mod platform;
pub mod progress;
pub mod session;
pub mod settings;
pub mod summary;

pub use batch::{BatchFileRecord, BatchOrchestrator, BatchState, FileStatus};
pub use classifier::{Classifier, FileDescriptor, MediaCategory};
pub use encoder::{CompressionResult, Encoder, FfmpegEncoder};
pub use error::SqshError;
pub use settings::{AdvancedSettings, CompressionSettings, QualityTier};
pub use summary::BatchSummary;
