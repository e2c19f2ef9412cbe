//! # Progress Reporting Module
//!
//! The orchestrator reports batch events through the `ProgressObserver`
//! trait; the terminal implementation renders them with an `indicatif`
//! percent bar, one file at a time. Tests substitute a recording observer.

use crate::batch::BatchFileRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Sink for batch lifecycle events. One file is in flight at a time, so
/// `file_progress` events always belong to the most recently started file.
pub trait ProgressObserver: Send + Sync {
    fn file_started(&self, index: usize, total: usize, name: &str);
    fn file_progress(&self, index: usize, percent: u8);
    fn file_finished(&self, index: usize, record: &BatchFileRecord);
    fn batch_done(&self);
}

/// Observer that renders nothing
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn file_started(&self, _index: usize, _total: usize, _name: &str) {}
    fn file_progress(&self, _index: usize, _percent: u8) {}
    fn file_finished(&self, _index: usize, _record: &BatchFileRecord) {}
    fn batch_done(&self) {}
}

/// Terminal reporter: a 0-100 bar per file plus batch position
pub struct TerminalReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("=>-")
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalReporter {
    fn file_started(&self, index: usize, total: usize, name: &str) {
        let bar = ProgressBar::new(100);
        bar.set_style(Self::style());
        bar.set_message(format!("[{}/{}] {}", index + 1, total, name));
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn file_progress(&self, _index: usize, percent: u8) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.set_position(percent as u64);
        }
    }

    fn file_finished(&self, _index: usize, record: &BatchFileRecord) {
        let message = match (&record.result, &record.error) {
            (Some(result), _) if result.already_optimized => {
                format!("[SKIP] {}: already optimized", record.descriptor.name)
            }
            (Some(result), _) => {
                format!(
                    "[OK] {}: {:.1}% saved",
                    record.descriptor.name, result.saved_percentage
                )
            }
            (None, Some(error)) => format!("[ERROR] {}: {}", record.descriptor.name, error),
            (None, None) => format!("[ERROR] {}: no result", record.descriptor.name),
        };

        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.set_position(100);
            bar.finish_with_message(message);
        }
    }

    fn batch_done(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish();
        }
    }
}
