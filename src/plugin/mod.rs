// Internal modules - all access should go through api module
pub(crate) mod cache;
pub(crate) mod error;
pub(crate) mod factory;
pub(crate) mod hook_imports;
pub(crate) mod intercept_define;
pub(crate) mod page_module;
pub(crate) mod paths;
pub(crate) mod route;
pub(crate) mod static_assets;
pub(crate) mod traits;
pub(crate) mod virtual_plugin;

// Public API module - the only public interface for pipeline plugins
pub mod api;

#[cfg(test)]
mod tests;
