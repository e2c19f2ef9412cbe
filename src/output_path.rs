//! # Output Path Allocation Module
//!
//! Centralizes the logic for deriving a unique destination path for a
//! compressed file, so the orchestrator never has to re-validate names.
//!
//! ## Naming scheme:
//! - Base name: `<input-stem>-sqshed.<ext>`
//! - Extension: the `output_format` override, else the input's own
//! - Directory: the `output_folder` override, else the input's directory
//! - Collisions: `-1`, `-2`, ... appended until a free name is found
//!
//! The existence check and the allocation are one logical step per file;
//! downstream result accounting depends on the returned path being free.

use crate::error::SqshError;
use crate::settings::AdvancedSettings;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "-sqshed";

/// Derives unique, non-colliding destination paths
pub struct OutputPathAllocator;

impl OutputPathAllocator {
    /// Allocate the destination path for one input file.
    ///
    /// Fails with `InvalidDestination` when an explicit output folder does
    /// not exist or is not a directory.
    pub fn allocate(
        input_path: &Path,
        advanced: Option<&AdvancedSettings>,
    ) -> Result<PathBuf, SqshError> {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| {
                SqshError::Classification(format!(
                    "invalid file name: {}",
                    input_path.display()
                ))
            })?;

        let extension = advanced
            .and_then(|a| a.output_format.clone())
            .or_else(|| {
                input_path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
            })
            .unwrap_or_default();

        let dir = match advanced.and_then(|a| a.output_folder.as_ref()) {
            Some(folder) => {
                if !folder.is_dir() {
                    return Err(SqshError::InvalidDestination(
                        folder.display().to_string(),
                    ));
                }
                folder.clone()
            }
            None => input_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        // An extensionless input with no format override stays extensionless
        let dotted = if extension.is_empty() {
            String::new()
        } else {
            format!(".{extension}")
        };

        let candidate = dir.join(format!("{stem}{OUTPUT_SUFFIX}{dotted}"));
        if !candidate.exists() {
            return Ok(candidate);
        }

        let mut counter = 1u32;
        loop {
            let candidate = dir.join(format!("{stem}{OUTPUT_SUFFIX}-{counter}{dotted}"));
            if !candidate.exists() {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}
