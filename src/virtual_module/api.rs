//! Public API for virtual modules
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::virtual_module::builder::VirtualModuleContentBuilder;
pub use crate::virtual_module::error::ContentError;
pub use crate::virtual_module::runtime::{
    create_virtual_modules, hmr_block, ContentTransform, ContentValidator, ModuleCreatedCallback,
    ModuleLoadedCallback, VirtualModuleOptions, VirtualModuleRuntime, DEFAULT_HMR_CALLBACK,
    DEFAULT_MODULE_ID, EMPTY_MODULE, RESOLVED_PREFIX, VIRTUAL_PREFIX,
};
pub use crate::virtual_module::stats::VirtualModuleStats;
