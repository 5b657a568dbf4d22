//! Finding image files to tag.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Walks files and directories for images with a supported extension.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
}

/// A file picked up by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            extensions: config
                .supported_formats
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// A single supported file yields itself; a directory is walked
    /// recursively. Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|supported| *supported == ext)
            })
            .unwrap_or(false)
    }

    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
