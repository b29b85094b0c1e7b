//! Public API for pipeline plugins
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Host protocol
pub use crate::plugin::traits::{
    resolve_and_load, run_build, share, transform_all, BuildPlugin, DevServer, HotUpdate,
    PluginContext, SharedPlugin, WatchList,
};

// Errors
pub use crate::plugin::error::{PluginError, PluginResult};

// Plugins
pub use crate::plugin::hook_imports::{hook_imports_source, page_module_hook, HOOK_MODULE_ID};
pub use crate::plugin::intercept_define::{
    default_replacements, InterceptDefinePlugin, INTERCEPT_DEFINE_PLUGIN_NAME,
};
pub use crate::plugin::page_module::{
    PageModulePlugin, PAGES_JSON_ID_SUFFIX, PAGES_RELOAD_TARGET, PAGE_MODULE_PLUGIN_NAME,
};
pub use crate::plugin::route::{
    build_route_table, page_module_route, route_module_source, ROUTE_MODULE_ID,
};
pub use crate::plugin::static_assets::{
    static_targets, StaticAssetsPlugin, StaticTarget, DEFAULT_STATIC_PREFIX,
    STATIC_ASSETS_PLUGIN_NAME,
};

// Construction and caching
pub use crate::plugin::cache::{cache_key, CacheStats, PluginCache};
pub use crate::plugin::factory::{
    create_plugins_for, create_uniboost_plugins, PluginFactory, PluginSettings, PluginSpec,
};
