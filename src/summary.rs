//! # Result Aggregation Module
//!
//! Folds the final record list into batch-level totals and renders them
//! for the terminal or as JSON.
//!
//! ## Accounting rules:
//! - Errored and never-processed files contribute their original size to
//!   the output total: they count as unchanged, not as zero.
//! - `total_saved_bytes = total_input_bytes - total_output_bytes` holds for
//!   any mix of completed / optimized / errored records.
//! - The percentage guards division by zero; an empty batch cannot reach
//!   aggregation through the orchestrator, but the function is total.

use crate::batch::{BatchFileRecord, FileStatus};
use console::style;
use serde::Serialize;

/// Batch-level totals, pure function of the final record list
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    /// Completed and actually smaller
    pub succeeded: usize,
    /// Completed but discarded by the size-safety policy
    pub already_optimal: usize,
    pub failed: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub total_saved_bytes: i64,
    pub total_saved_percentage: f64,
    /// Wall-clock seconds from batch start to aggregation
    pub elapsed_seconds: f64,
}

/// Fold per-file records into batch totals
pub fn aggregate(records: &[BatchFileRecord], elapsed_seconds: f64) -> BatchSummary {
    let mut succeeded = 0;
    let mut already_optimal = 0;
    let mut failed = 0;
    let mut total_input_bytes = 0u64;
    let mut total_output_bytes = 0u64;

    for record in records {
        total_input_bytes += record.descriptor.size;

        match (&record.status, &record.result) {
            (FileStatus::Completed, Some(result)) => {
                total_output_bytes += result.output_size;
                if result.already_optimized {
                    already_optimal += 1;
                } else {
                    succeeded += 1;
                }
            }
            (FileStatus::Error, _) => {
                total_output_bytes += record.descriptor.size;
                failed += 1;
            }
            // Pending / compressing / skipped count as unchanged
            _ => total_output_bytes += record.descriptor.size,
        }
    }

    let total_saved_bytes = total_input_bytes as i64 - total_output_bytes as i64;
    let total_saved_percentage = if total_input_bytes > 0 {
        total_saved_bytes as f64 / total_input_bytes as f64 * 100.0
    } else {
        0.0
    };

    BatchSummary {
        total_files: records.len(),
        succeeded,
        already_optimal,
        failed,
        total_input_bytes,
        total_output_bytes,
        total_saved_bytes,
        total_saved_percentage,
        elapsed_seconds,
    }
}

/// Human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

impl BatchSummary {
    /// Styled terminal rendering, per-file lines come from the records
    pub fn render(&self, records: &[BatchFileRecord]) -> String {
        let mut out = String::new();

        out.push_str(&format!("\n{}\n", style("=== Compression Complete ===").bold()));
        for record in records {
            let line = match (&record.status, &record.result, &record.error) {
                (FileStatus::Completed, Some(result), _) if result.already_optimized => {
                    format!(
                        "  {} {}: already optimized",
                        style("[SKIP]").yellow(),
                        record.descriptor.name
                    )
                }
                (FileStatus::Completed, Some(result), _) => format!(
                    "  {} {}: {} -> {} ({:.1}% saved)",
                    style("[OK]").green(),
                    record.descriptor.name,
                    format_size(result.input_size),
                    format_size(result.output_size),
                    result.saved_percentage
                ),
                (FileStatus::Error, _, Some(error)) => format!(
                    "  {} {}: {}",
                    style("[ERROR]").red(),
                    record.descriptor.name,
                    error
                ),
                _ => format!(
                    "  {} {}: not processed",
                    style("[--]").dim(),
                    record.descriptor.name
                ),
            };
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str(&format!(
            "Files: {} | Compressed: {} | Already optimal: {} | Errors: {}\n",
            self.total_files, self.succeeded, self.already_optimal, self.failed
        ));
        let saved = self.total_saved_bytes.max(0) as u64;
        out.push_str(&format!(
            "Saved: {} of {} ({:.2}%) in {:.1}s\n",
            format_size(saved),
            format_size(self.total_input_bytes),
            self.total_saved_percentage,
            self.elapsed_seconds
        ));

        out
    }

    /// Machine-readable rendering for `--json`
    pub fn to_json(&self, records: &[BatchFileRecord]) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            summary: &'a BatchSummary,
            files: &'a [BatchFileRecord],
        }

        serde_json::to_string_pretty(&JsonReport {
            summary: self,
            files: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FileDescriptor, MediaCategory};
    use crate::encoder::CompressionResult;
    use std::path::PathBuf;

    fn record(size: u64, status: FileStatus, output_size: Option<u64>) -> BatchFileRecord {
        let descriptor = FileDescriptor {
            path: PathBuf::from(format!("/media/f-{size}.mp4")),
            name: format!("f-{size}.mp4"),
            size,
            category: MediaCategory::Video,
            extension: "mp4".to_string(),
        };

        let result = output_size.map(|output_size| {
            let already_optimized = output_size == size;
            CompressionResult {
                input_path: descriptor.path.clone(),
                output_path: if already_optimized {
                    descriptor.path.clone()
                } else {
                    descriptor.path.with_extension("sqshed.mp4")
                },
                input_size: size,
                output_size,
                saved_bytes: size as i64 - output_size as i64,
                saved_percentage: (size as i64 - output_size as i64) as f64 / size as f64 * 100.0,
                duration: 1.0,
                input_file_removed: false,
                already_optimized,
            }
        });

        BatchFileRecord {
            descriptor,
            status,
            progress: 100,
            result,
            error: matches!(status, FileStatus::Error).then(|| "encoder failed".to_string()),
        }
    }

    #[test]
    fn test_aggregate_partitions_and_totals() {
        let records = vec![
            record(100, FileStatus::Completed, Some(60)),
            record(200, FileStatus::Completed, Some(200)), // already optimal
            record(300, FileStatus::Error, None),
        ];

        let summary = aggregate(&records, 5.0);
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.already_optimal, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_input_bytes, 600);
        // 60 + 200 (unchanged) + 300 (error counts as unchanged)
        assert_eq!(summary.total_output_bytes, 560);
        assert_eq!(summary.total_saved_bytes, 40);
    }

    #[test]
    fn test_aggregate_empty_batch_guards_division() {
        let summary = aggregate(&[], 0.0);
        assert_eq!(summary.total_saved_percentage, 0.0);
        assert_eq!(summary.total_saved_bytes, 0);
    }

    #[test]
    fn test_saved_identity_over_random_record_mixes() {
        // Small deterministic LCG; enough variety to cover every
        // status/result combination many times over
        let mut seed: u64 = 0x5eed_cafe;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            seed >> 33
        };

        for _ in 0..200 {
            let count = (next() % 8) as usize;
            let records: Vec<BatchFileRecord> = (0..count)
                .map(|_| {
                    let size = next() % 1_000_000 + 1;
                    match next() % 4 {
                        0 => record(size, FileStatus::Completed, Some(next() % size + 1)),
                        1 => record(size, FileStatus::Completed, Some(size)),
                        2 => record(size, FileStatus::Error, None),
                        _ => record(size, FileStatus::Pending, None),
                    }
                })
                .collect();

            let summary = aggregate(&records, 1.0);
            assert_eq!(
                summary.total_saved_bytes,
                summary.total_input_bytes as i64 - summary.total_output_bytes as i64
            );
            assert_eq!(
                summary.total_files,
                summary.succeeded
                    + summary.already_optimal
                    + summary.failed
                    + records
                        .iter()
                        .filter(|r| r.status == FileStatus::Pending)
                        .count()
            );
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(1_572_864), "1.50 MB");
    }

    #[test]
    fn test_json_rendering_includes_files() {
        let records = vec![record(100, FileStatus::Completed, Some(60))];
        let summary = aggregate(&records, 1.0);
        let json = summary.to_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["succeeded"], 1);
        assert_eq!(value["files"][0]["status"], "completed");
    }
}
