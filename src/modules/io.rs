//! File access and directory scanning collaborators
//!
//! The loader and aggregator never touch the filesystem directly. They go
//! through these traits so a host tool (or a test) can supply its own view
//! of the source tree.

use crate::core::error_handling::log_error_with_context;
use crate::modules::error::{ModuleError, ModuleResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Text file primitives used by the loader and the base registry
pub trait FileAccess: Send + Sync {
    /// Read a whole file, `None` when absent or unreadable
    fn read_text(&self, path: &Path) -> Option<String>;

    /// Write a whole file, reporting success
    fn write_text(&self, path: &Path, content: &str) -> bool;

    fn exists(&self, path: &Path) -> bool;
}

/// Finds files matching a glob pattern
pub trait DirectoryScanner: Send + Sync {
    fn find_files(&self, pattern: &str) -> ModuleResult<Vec<PathBuf>>;
}

/// [`FileAccess`] backed by the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileAccess;

impl FileAccess for DiskFileAccess {
    fn read_text(&self, path: &Path) -> Option<String> {
        if !path.exists() {
            log::warn!("File does not exist: {}", path.display());
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                log_io_failure(path, e, "Reading file");
                None
            }
        }
    }

    fn write_text(&self, path: &Path, content: &str) -> bool {
        match std::fs::write(path, content) {
            Ok(()) => {
                log::debug!("Wrote file: {}", path.display());
                true
            }
            Err(e) => {
                log_io_failure(path, e, "Writing file");
                false
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn log_io_failure(path: &Path, error: std::io::Error, context: &str) {
    let error = ModuleError::Io {
        path: path.to_path_buf(),
        message: error.to_string(),
    };
    log_error_with_context(&error, &format!("{} {}", context, path.display()));
}

/// [`DirectoryScanner`] using the `glob` crate
///
/// Results come back in the crate's alphabetical traversal order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobScanner;

impl DirectoryScanner for GlobScanner {
    fn find_files(&self, pattern: &str) -> ModuleResult<Vec<PathBuf>> {
        let entries = glob::glob(pattern).map_err(|e| ModuleError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable path during scan: {}", e),
            }
        }
        Ok(files)
    }
}

/// In-memory [`FileAccess`] and [`DirectoryScanner`]
///
/// Scans return paths in insertion order and match patterns with
/// `glob::Pattern`, which makes discovery order fully controllable.
#[derive(Debug, Default)]
pub struct MemoryFileAccess {
    files: RwLock<Vec<(PathBuf, String)>>,
}

impl MemoryFileAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        match files.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = content,
            None => files.push((path, content)),
        }
    }

    pub fn snapshot(&self) -> HashMap<PathBuf, String> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.iter().cloned().collect()
    }
}

impl FileAccess for MemoryFileAccess {
    fn read_text(&self, path: &Path) -> Option<String> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, content)| content.clone())
    }

    fn write_text(&self, path: &Path, content: &str) -> bool {
        self.insert(path.to_path_buf(), content);
        true
    }

    fn exists(&self, path: &Path) -> bool {
        self.read_text(path).is_some()
    }
}

impl DirectoryScanner for MemoryFileAccess {
    fn find_files(&self, pattern: &str) -> ModuleResult<Vec<PathBuf>> {
        let matcher = glob::Pattern::new(pattern).map_err(|e| ModuleError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(files
            .iter()
            .filter(|(path, _)| matcher.matches_path(path))
            .map(|(path, _)| path.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_files_read_write() {
        let files = MemoryFileAccess::new();
        assert!(!files.exists(Path::new("/a.json")));
        assert!(files.write_text(Path::new("/a.json"), "{}"));
        assert_eq!(files.read_text(Path::new("/a.json")).as_deref(), Some("{}"));
    }

    #[test]
    fn test_memory_scan_preserves_insertion_order() {
        let files = MemoryFileAccess::new();
        files.insert("/p/src/modules/z/module.json", "{}");
        files.insert("/p/src/modules/a/module.json", "{}");
        files.insert("/p/src/modules/a/readme.md", "");

        let found = files.find_files("/p/src/modules/**/module.json").unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("/p/src/modules/z/module.json"),
                PathBuf::from("/p/src/modules/a/module.json"),
            ]
        );
    }

    #[test]
    fn test_glob_scanner_rejects_bad_pattern() {
        let result = GlobScanner.find_files("src/[");
        assert!(matches!(result, Err(ModuleError::Pattern { .. })));
    }

    #[test]
    fn test_disk_file_access_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");

        assert!(!DiskFileAccess.exists(&path));
        assert!(DiskFileAccess.read_text(&path).is_none());
        assert!(DiskFileAccess.write_text(&path, "{\"pages\":[]}"));
        assert_eq!(
            DiskFileAccess.read_text(&path).as_deref(),
            Some("{\"pages\":[]}")
        );
    }
}
