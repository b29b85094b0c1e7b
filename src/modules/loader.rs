//! Loading a single module descriptor

use crate::modules::error::ValidationError;
use crate::modules::io::FileAccess;
use crate::modules::key::PathKeyDeriver;
use crate::modules::types::{ModuleDescriptor, ModuleRecord};
use std::path::Path;
use std::sync::Arc;

/// Reads, validates and keys one descriptor file
pub struct ModuleLoader {
    files: Arc<dyn FileAccess>,
    keys: PathKeyDeriver,
}

impl ModuleLoader {
    pub fn new(files: Arc<dyn FileAccess>, keys: PathKeyDeriver) -> Self {
        Self { files, keys }
    }

    pub fn keys(&self) -> &PathKeyDeriver {
        &self.keys
    }

    /// Load the descriptor at `path`
    ///
    /// Returns `Ok(None)` when the file is missing or is not JSON; both are
    /// logged here. A file that parses but has the wrong shape is an `Err`
    /// so the caller can decide how to contain it.
    pub fn load(&self, path: &Path) -> Result<Option<ModuleRecord>, ValidationError> {
        let Some(text) = self.files.read_text(path) else {
            log::warn!("Module descriptor not readable: {}", path.display());
            return Ok(None);
        };

        let raw: serde_json::Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Module descriptor is not valid JSON {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let descriptor = ModuleDescriptor::parse(raw)?;
        let key = self.keys.derive(path.to_string_lossy());
        log::debug!("Loaded module '{}' from {}", key, path.display());

        Ok(Some(ModuleRecord {
            descriptor,
            key,
            file_path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::io::MemoryFileAccess;
    use std::path::PathBuf;

    fn loader_with(files: Arc<MemoryFileAccess>) -> ModuleLoader {
        ModuleLoader::new(
            files,
            PathKeyDeriver::new("/app/src/modules", "module.json"),
        )
    }

    #[test]
    fn test_load_valid_descriptor() {
        let files = Arc::new(MemoryFileAccess::new());
        files.insert(
            "/app/src/modules/cart/module.json",
            r#"{"setting":{"pages":[{"path":"pages/cart/index"}]}}"#,
        );

        let record = loader_with(files)
            .load(Path::new("/app/src/modules/cart/module.json"))
            .unwrap()
            .unwrap();

        assert_eq!(record.key, "cart");
        assert_eq!(record.file_path, PathBuf::from("/app/src/modules/cart/module.json"));
        assert_eq!(record.descriptor.setting.pages[0].path, "pages/cart/index");
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let files = Arc::new(MemoryFileAccess::new());
        let result = loader_with(files).load(Path::new("/app/src/modules/x/module.json"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_unparsable_file_is_none() {
        let files = Arc::new(MemoryFileAccess::new());
        files.insert("/app/src/modules/x/module.json", "{ not json");
        let result = loader_with(files).load(Path::new("/app/src/modules/x/module.json"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_invalid_shape_is_validation_error() {
        let files = Arc::new(MemoryFileAccess::new());
        files.insert("/app/src/modules/x/module.json", r#"{"setting":{}}"#);
        let err = loader_with(files)
            .load(Path::new("/app/src/modules/x/module.json"))
            .unwrap_err();
        assert_eq!(err.field, "setting.pages");
    }
}
