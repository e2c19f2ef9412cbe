//! # File Classification Module
//!
//! Inspects filesystem paths and turns them into normalized media
//! descriptors consumed by the rest of the pipeline.
//!
//! ## Responsibilities:
//! - Extension-based media classification (video / image / audio)
//! - `classify()`: single path -> `FileDescriptor` (or not-found signal)
//! - `enumerate()`: immediate supported files of a directory (no recursion)
//!
//! ## Supported formats:
//! - **Video**: MP4, MOV, AVI, MKV, WebM
//! - **Images**: JPG, JPEG, PNG, WebP
//! - **Audio**: MP3, WAV, FLAC, OGG, M4A
//!
//! Classification is purely extension-based; every supported extension maps
//! to exactly one category. No file contents are read.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Exclusive media category, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Image,
    Audio,
}

impl MediaCategory {
    /// Map a lowercase extension (no dot) to its category
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp4" | "mov" | "avi" | "mkv" | "webm" => Some(Self::Video),
            "jpg" | "jpeg" | "png" | "webp" => Some(Self::Image),
            "mp3" | "wav" | "flac" | "ogg" | "m4a" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one input file, immutable after classification
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    /// Resolved filesystem path, unique key within a batch
    pub path: PathBuf,
    /// Display basename
    pub name: String,
    /// Size in bytes, always > 0
    pub size: u64,
    pub category: MediaCategory,
    /// Lowercase extension without the dot
    pub extension: String,
}

/// Classifies paths into media descriptors
pub struct Classifier;

impl Classifier {
    /// Classify a single path.
    ///
    /// Returns `Ok(None)` when the path does not exist, is not a regular
    /// file, is empty, or carries an unsupported extension. IO failures
    /// while probing metadata are propagated.
    pub async fn classify(path: &Path) -> Result<Option<FileDescriptor>> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Ok(None);
        }

        let extension = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return Ok(None),
        };

        let category = match MediaCategory::from_extension(&extension) {
            Some(c) => c,
            None => return Ok(None),
        };

        // Zero-byte files have nothing to squish
        if metadata.len() == 0 {
            return Ok(None);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(FileDescriptor {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            category,
            extension,
        }))
    }

    /// Enumerate the immediate supported files of a directory.
    ///
    /// Unsupported entries and nested directories are silently skipped;
    /// there is no recursion. Results are sorted by path for deterministic
    /// batch order.
    pub async fn enumerate(dir: &Path) -> Result<Vec<FileDescriptor>> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();

        paths.sort();

        let mut descriptors = Vec::new();
        for path in paths {
            if let Some(descriptor) = Self::classify(&path).await? {
                descriptors.push(descriptor);
            }
        }

        Ok(descriptors)
    }

    /// Check if a path carries a supported media extension
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                MediaCategory::from_extension(&ext.to_string_lossy().to_lowercase()).is_some()
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    #[test]
    fn test_category_mapping_is_exclusive() {
        assert_eq!(MediaCategory::from_extension("mp4"), Some(MediaCategory::Video));
        assert_eq!(MediaCategory::from_extension("jpeg"), Some(MediaCategory::Image));
        assert_eq!(MediaCategory::from_extension("flac"), Some(MediaCategory::Audio));
        assert_eq!(MediaCategory::from_extension("txt"), None);
        assert_eq!(MediaCategory::from_extension(""), None);
    }

    #[tokio::test]
    async fn test_classify_supported_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "Clip.MP4", 1024);

        let descriptor = Classifier::classify(&path).await.unwrap().unwrap();
        assert_eq!(descriptor.category, MediaCategory::Video);
        assert_eq!(descriptor.extension, "mp4");
        assert_eq!(descriptor.size, 1024);
        assert_eq!(descriptor.name, "Clip.MP4");
    }

    #[tokio::test]
    async fn test_classify_rejects_missing_unsupported_and_empty() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("nope.mp4");
        assert!(Classifier::classify(&missing).await.unwrap().is_none());

        let unsupported = write_file(&dir, "notes.txt", 10);
        assert!(Classifier::classify(&unsupported).await.unwrap().is_none());

        let empty = write_file(&dir, "empty.png", 0);
        assert!(Classifier::classify(&empty).await.unwrap().is_none());

        // Directories are not regular files
        assert!(Classifier::classify(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enumerate_skips_nested_and_unsupported() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "b.jpg", 10);
        write_file(&dir, "a.png", 10);
        write_file(&dir, "skip.doc", 10);

        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("deep.jpg"), vec![0u8; 10]).unwrap();

        let descriptors = Classifier::enumerate(dir.path()).await.unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }
}
