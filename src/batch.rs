//! # Batch Orchestration Module
//!
//! The centerpiece of the pipeline: an ordered list of per-file records
//! advanced strictly sequentially through a single-concurrency compression
//! pipeline, with per-file state transitions and best-effort error capture.
//!
//! ## State machines:
//! - Per file: `pending -> compressing -> completed | error` (`skipped` is
//!   assigned only before compression starts, never mid-run)
//! - Batch: `collecting-input -> configuring -> compressing -> done`
//!
//! ## Rules:
//! - File *i+1* never starts compressing before file *i* is terminal; the
//!   external encoder is CPU-bound, so parallelism would not shorten the
//!   batch and would corrupt progress attribution.
//! - A single file's failure is captured into its record and the batch
//!   continues; nothing per-file propagates out of `run`.
//! - Batch validation happens once, at the configuring -> compressing edge:
//!   a batch must be category-homogeneous or the whole run is rejected.
//! - The record list is owned and mutated exclusively by the orchestrator
//!   and retained intact for the final summary.
//!
//! Progress arrives as a stream of percentages on a channel while the
//! encoder future is awaited; the two are raced with `tokio::select!`.

use crate::classifier::FileDescriptor;
use crate::encoder::{CompressionResult, Encoder};
use crate::error::SqshError;
use crate::progress::ProgressObserver;
use crate::settings::CompressionSettings;
use crate::summary::{aggregate, BatchSummary};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Per-file lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Compressing,
    Completed,
    Error,
    Skipped,
}

/// Batch-wide lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    CollectingInput,
    Configuring,
    Compressing,
    Done,
}

/// One file's journey through the batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchFileRecord {
    pub descriptor: FileDescriptor,
    pub status: FileStatus,
    /// 0-100, non-decreasing while compressing
    pub progress: u8,
    /// Present only for completed files
    pub result: Option<CompressionResult>,
    /// Present only for errored files
    pub error: Option<String>,
}

impl BatchFileRecord {
    fn new(descriptor: FileDescriptor) -> Self {
        Self {
            descriptor,
            status: FileStatus::Pending,
            progress: 0,
            result: None,
            error: None,
        }
    }
}

/// Sequences files through the compression pipeline one at a time
pub struct BatchOrchestrator {
    records: Vec<BatchFileRecord>,
    settings: Option<CompressionSettings>,
    state: BatchState,
    started_at: Option<Instant>,
}

impl BatchOrchestrator {
    /// Start collecting input files
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            settings: None,
            state: BatchState::CollectingInput,
            started_at: None,
        }
    }

    /// Add a file to the batch. Duplicate paths are ignored; the path is
    /// the unique key within a batch.
    pub fn push(&mut self, descriptor: FileDescriptor) {
        if self
            .records
            .iter()
            .any(|r| r.descriptor.path == descriptor.path)
        {
            warn!("Ignoring duplicate input: {}", descriptor.path.display());
            return;
        }
        self.records.push(BatchFileRecord::new(descriptor));
    }

    /// Finalize file selection with the shared settings object
    pub fn configure(&mut self, settings: CompressionSettings) {
        self.settings = Some(settings);
        self.state = BatchState::Configuring;
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn records(&self) -> &[BatchFileRecord] {
        &self.records
    }

    /// Batch-level validation, performed once before any file enters
    /// compression. A mixed-category batch is rejected entirely; quality
    /// tiers mean different things per category.
    pub fn validate(&self) -> Result<(), SqshError> {
        if self.settings.is_none() {
            return Err(SqshError::BatchValidation(
                "batch has not been configured".to_string(),
            ));
        }

        if self.records.is_empty() {
            return Err(SqshError::BatchValidation(
                "batch contains no files".to_string(),
            ));
        }

        let first = self.records[0].descriptor.category;
        if let Some(mixed) = self
            .records
            .iter()
            .find(|r| r.descriptor.category != first)
        {
            return Err(SqshError::BatchValidation(format!(
                "cannot mix {} and {} files in one batch",
                first, mixed.descriptor.category
            )));
        }

        Ok(())
    }

    /// Process every record strictly in list order.
    ///
    /// Returns an error only for batch-level validation failures before
    /// compression begins; per-file failures are captured into the records.
    pub async fn run(
        &mut self,
        encoder: &dyn Encoder,
        observer: &dyn ProgressObserver,
    ) -> Result<(), SqshError> {
        if let Err(e) = self.validate() {
            // The whole batch is excluded before anything enters compression
            for record in &mut self.records {
                record.status = FileStatus::Skipped;
            }
            return Err(e);
        }
        let settings = self.settings.clone().ok_or_else(|| {
            SqshError::BatchValidation("batch has not been configured".to_string())
        })?;

        self.state = BatchState::Compressing;
        self.started_at = Some(Instant::now());
        let total = self.records.len();
        info!("Starting batch of {} file(s)", total);

        for index in 0..total {
            let descriptor = self.records[index].descriptor.clone();
            self.records[index].status = FileStatus::Compressing;
            self.records[index].progress = 0;
            observer.file_started(index, total, &descriptor.name);

            let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
            let fut = encoder.compress(&descriptor, &settings, tx);
            tokio::pin!(fut);

            // Await the terminal result while consuming the stream of
            // intermediate percentages.
            let mut channel_open = true;
            let outcome = loop {
                tokio::select! {
                    result = &mut fut => break result,
                    received = rx.recv(), if channel_open => match received {
                        Some(percent) => self.forward_progress(index, percent, observer),
                        None => channel_open = false,
                    },
                }
            };

            // Percentages buffered before the sender dropped
            while let Ok(percent) = rx.try_recv() {
                self.forward_progress(index, percent, observer);
            }

            match outcome {
                Ok(result) => {
                    let record = &mut self.records[index];
                    record.status = FileStatus::Completed;
                    record.progress = 100;
                    record.result = Some(result);
                }
                Err(e) => {
                    // Best-effort per file: record the failure and move on
                    warn!("Compression failed for {}: {}", descriptor.name, e);
                    let record = &mut self.records[index];
                    record.status = FileStatus::Error;
                    record.error = Some(e.to_string());
                }
            }
            observer.file_finished(index, &self.records[index]);
        }

        self.state = BatchState::Done;
        observer.batch_done();
        Ok(())
    }

    fn forward_progress(&mut self, index: usize, percent: u8, observer: &dyn ProgressObserver) {
        let percent = percent.min(100);
        let record = &mut self.records[index];
        if percent > record.progress {
            record.progress = percent;
            observer.file_progress(index, percent);
        }
    }

    /// Fold the final record list into batch totals
    pub fn summarize(&self) -> BatchSummary {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        aggregate(&self.records, elapsed)
    }
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
