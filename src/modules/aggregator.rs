//! Module Aggregator
//!
//! Runs one discovery pass: scan for descriptors, load each one, merge them
//! over the base registry and report which files to watch. Every pass
//! rebuilds its results from disk; nothing is patched across passes.
//!
//! Failures never escape [`ModuleAggregator::get_complete_registry`]. A bad
//! descriptor, or one whose `setting` clashes with the registry shape, is
//! skipped with a diagnostic while the rest of the pass goes on.

use crate::core::error_handling::log_error_with_context;
use crate::modules::io::{DirectoryScanner, DiskFileAccess, FileAccess, GlobScanner};
use crate::modules::key::PathKeyDeriver;
use crate::modules::loader::ModuleLoader;
use crate::modules::merge::RegistryMerger;
use crate::modules::types::{AggregateRegistry, ModuleRecord, WatchSet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Order in which discovered records are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOrder {
    /// Sort by derived key so results do not depend on the filesystem
    #[default]
    Sorted,
    /// Keep whatever order the scanner produced
    Scan,
}

impl std::str::FromStr for MergeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sorted" => Ok(MergeOrder::Sorted),
            "scan" => Ok(MergeOrder::Scan),
            other => Err(format!("unknown merge order '{}' (expected sorted or scan)", other)),
        }
    }
}

/// Where the aggregator looks and how it merges
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Project root every relative path resolves against
    pub root: PathBuf,
    /// Module root relative to `root`
    pub module_path: String,
    /// Descriptor file name matched by the scan
    pub descriptor_name: String,
    /// Base registry document relative to `root`
    pub pages_file: String,
    pub src: String,
    pub merge_order: MergeOrder,
    pub require_page_modules: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            module_path: "src/modules".to_string(),
            descriptor_name: "module.json".to_string(),
            pages_file: "src/pages.json".to_string(),
            src: "src".to_string(),
            merge_order: MergeOrder::Sorted,
            require_page_modules: false,
        }
    }
}

impl AggregatorOptions {
    pub fn module_root(&self) -> PathBuf {
        self.root.join(&self.module_path)
    }

    pub fn pages_path(&self) -> PathBuf {
        self.root.join(&self.pages_file)
    }

    pub fn pages_file_name(&self) -> &str {
        Path::new(&self.pages_file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.pages_file)
    }

    pub fn scan_pattern(&self) -> String {
        self.module_root()
            .join("**")
            .join(&self.descriptor_name)
            .to_string_lossy()
            .to_string()
    }
}

/// Result of a full aggregation pass
#[derive(Debug, Clone, Default)]
pub struct CompleteRegistry {
    pub registry: AggregateRegistry,
    pub watch_set: WatchSet,
    pub records: Vec<ModuleRecord>,
}

/// Records plus the file names downstream plugins need
#[derive(Debug, Clone)]
pub struct ModuleData {
    pub file_name: String,
    pub src: String,
    pub records: Vec<ModuleRecord>,
}

pub struct ModuleAggregator {
    options: AggregatorOptions,
    files: Arc<dyn FileAccess>,
    scanner: Arc<dyn DirectoryScanner>,
    loader: ModuleLoader,
    merger: RegistryMerger,
    cache: BTreeMap<String, ModuleRecord>,
}

impl ModuleAggregator {
    /// Aggregator over the local filesystem
    pub fn new(options: AggregatorOptions) -> Self {
        Self::with_collaborators(options, Arc::new(DiskFileAccess), Arc::new(GlobScanner))
    }

    pub fn with_collaborators(
        options: AggregatorOptions,
        files: Arc<dyn FileAccess>,
        scanner: Arc<dyn DirectoryScanner>,
    ) -> Self {
        let keys = PathKeyDeriver::new(
            options.module_root().to_string_lossy(),
            options.descriptor_name.clone(),
        );
        let loader = ModuleLoader::new(Arc::clone(&files), keys);
        let merger = RegistryMerger::new().require_page_modules(options.require_page_modules);

        log::debug!(
            "ModuleAggregator initialised (module root: {}, merge order: {:?})",
            options.module_root().display(),
            options.merge_order
        );

        Self {
            options,
            files,
            scanner,
            loader,
            merger,
            cache: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub fn files(&self) -> Arc<dyn FileAccess> {
        Arc::clone(&self.files)
    }

    pub fn scanner(&self) -> Arc<dyn DirectoryScanner> {
        Arc::clone(&self.scanner)
    }

    /// Scan and load every descriptor under the module root
    ///
    /// Replaces the cache with this pass's records. Descriptors that fail
    /// to load are logged and skipped.
    pub fn discover(&mut self) -> Vec<ModuleRecord> {
        let started = Instant::now();
        let pattern = self.options.scan_pattern();

        let paths = match self.scanner.find_files(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log_error_with_context(&e, "Scanning for module descriptors");
                self.cache.clear();
                return Vec::new();
            }
        };
        log::debug!("Found {} module descriptor files", paths.len());

        let mut records = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.loader.load(path) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => log::error!("Skipping module {}: {}", path.display(), e),
            }
        }

        if self.options.merge_order == MergeOrder::Sorted {
            records.sort_by(|a, b| a.key.cmp(&b.key));
        }

        self.cache = records
            .iter()
            .map(|record| (record.key.clone(), record.clone()))
            .collect();

        log::info!(
            "Loaded {} modules in {:?}",
            records.len(),
            started.elapsed()
        );
        records
    }

    /// Base registry, merged registry, watch set and records in one pass
    pub fn get_complete_registry(&mut self) -> CompleteRegistry {
        let started = Instant::now();
        let mut watch_set = WatchSet::new();

        let base = match self.load_base_registry() {
            Some(base) => {
                watch_set.insert(absolute(&self.options.pages_path()));
                base
            }
            None => AggregateRegistry::default(),
        };

        let records = self.discover();
        watch_set.extend(records.iter().map(|record| record.file_path.clone()));

        match self.merger.merge(&base, &records) {
            Ok(registry) => {
                log::info!(
                    "Aggregated {} modules into registry in {:?}",
                    records.len(),
                    started.elapsed()
                );
                CompleteRegistry {
                    registry,
                    watch_set,
                    records,
                }
            }
            Err(e) => {
                log_error_with_context(&e, "Merging module descriptors");
                CompleteRegistry::default()
            }
        }
    }

    /// Read the base registry document, `None` when absent or invalid
    pub fn load_base_registry(&self) -> Option<AggregateRegistry> {
        let path = self.options.pages_path();
        if !self.files.exists(&path) {
            log::warn!("Base registry not found: {}", path.display());
            return None;
        }

        let text = self.files.read_text(&path)?;
        match AggregateRegistry::from_json(&text) {
            Ok(registry) => {
                log::debug!("Loaded base registry {}", path.display());
                Some(registry)
            }
            Err(e) => {
                log::error!("Failed to parse base registry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write `registry` to the base registry document as indented JSON
    pub fn save_base_registry(&self, registry: &AggregateRegistry) -> bool {
        let path = self.options.pages_path();
        match registry.to_json_pretty() {
            Ok(text) => {
                let saved = self.files.write_text(&path, &text);
                if saved {
                    log::info!("Saved registry to {}", path.display());
                }
                saved
            }
            Err(e) => {
                log::error!("Failed to serialise registry for {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn load_data(&mut self) -> ModuleData {
        let records = self.discover();
        ModuleData {
            file_name: self.options.pages_file_name().to_string(),
            src: self.options.src.clone(),
            records,
        }
    }

    pub fn get_cached(&self, key: &str) -> Option<&ModuleRecord> {
        self.cache.get(key)
    }

    pub fn all_cached(&self) -> Vec<ModuleRecord> {
        self.cache.values().cloned().collect()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        log::debug!("Module cache cleared");
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
