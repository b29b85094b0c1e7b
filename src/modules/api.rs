//! Public API for module discovery and registry merging
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Orchestration
pub use crate::modules::aggregator::{
    AggregatorOptions, CompleteRegistry, MergeOrder, ModuleAggregator, ModuleData,
};

// Building blocks
pub use crate::modules::key::PathKeyDeriver;
pub use crate::modules::loader::ModuleLoader;
pub use crate::modules::merge::{
    append_async_package_names, async_package_roots, deep_merge, dedup_async_package_names,
    RegistryMerger,
};

// Collaborators
pub use crate::modules::io::{
    DirectoryScanner, DiskFileAccess, FileAccess, GlobScanner, MemoryFileAccess,
};

// Data model
pub use crate::modules::types::{
    AggregateRegistry, ModuleDescriptor, ModuleRecord, PageConfig, Setting, SubPackageConfig,
    WatchSet,
};

// Errors
pub use crate::modules::error::{ModuleError, ModuleResult, ValidationError};
