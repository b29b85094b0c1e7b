//! Build Pipeline Plugin Protocol
//!
//! The host build tool drives plugins through [`BuildPlugin`]: it asks each
//! plugin to resolve and load module ids, passes source through
//! `transform`, forwards file change notifications and runs the build
//! lifecycle hooks. Every method has a pass-through default, so a plugin
//! only implements the hooks it cares about.

use crate::plugin::error::{PluginError, PluginResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Services the host offers to a plugin during `transform`
pub trait PluginContext: Send {
    /// Rebuild when `path` changes
    fn add_watch_file(&mut self, path: &Path);
}

/// Dev-server handle used to push reloads during hot updates
pub trait DevServer: Send + Sync {
    fn reload(&self, file: &str);
}

/// A changed file reported by the host's watcher
pub struct HotUpdate<'a> {
    pub file: &'a str,
    pub server: &'a dyn DevServer,
}

#[async_trait::async_trait]
pub trait BuildPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Claim a module id, returning the id to load it under
    fn resolve_id(&mut self, _id: &str) -> Option<String> {
        None
    }

    /// Provide source for a resolved id
    fn load(&mut self, _id: &str) -> Option<String> {
        None
    }

    /// Rewrite module source, `None` leaves it unchanged
    async fn transform(
        &mut self,
        _code: &str,
        _id: &str,
        _ctx: &mut dyn PluginContext,
    ) -> PluginResult<Option<String>> {
        Ok(None)
    }

    fn handle_hot_update(&mut self, _update: &HotUpdate<'_>) {}

    async fn build_start(&mut self) -> PluginResult<()> {
        Ok(())
    }

    async fn build_end(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called once output has been written to `out_dir`
    async fn write_bundle(&mut self, _out_dir: &Path) -> PluginResult<()> {
        Ok(())
    }
}

/// Plugin handle shared between the factory cache and the host
pub type SharedPlugin = Arc<Mutex<dyn BuildPlugin>>;

pub fn share<P: BuildPlugin + 'static>(plugin: P) -> SharedPlugin {
    Arc::new(Mutex::new(plugin))
}

/// [`PluginContext`] that records watch registrations
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchList {
    files: Vec<PathBuf>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl PluginContext for WatchList {
    fn add_watch_file(&mut self, path: &Path) {
        if !self.files.iter().any(|existing| existing == path) {
            self.files.push(path.to_path_buf());
        }
    }
}

/// Resolve `id` through the first plugin that claims it, then load it
pub async fn resolve_and_load(plugins: &[SharedPlugin], id: &str) -> Option<String> {
    for plugin in plugins {
        let mut plugin = plugin.lock().await;
        if let Some(resolved) = plugin.resolve_id(id) {
            log::debug!("'{}' resolved {} -> {:?}", plugin.name(), id, resolved);
            return plugin.load(&resolved);
        }
    }
    None
}

/// Run `code` through every plugin's `transform` in order
pub async fn transform_all(
    plugins: &[SharedPlugin],
    code: &str,
    id: &str,
    ctx: &mut dyn PluginContext,
) -> PluginResult<String> {
    let mut current = code.to_string();
    for plugin in plugins {
        let mut plugin = plugin.lock().await;
        if let Some(next) = plugin.transform(&current, id, ctx).await? {
            current = next;
        }
    }
    Ok(current)
}

/// Drive every plugin through `build_start`, `build_end` and `write_bundle`
///
/// Stops at the first failing hook, naming the plugin and hook.
pub async fn run_build(plugins: &[SharedPlugin], out_dir: &Path) -> PluginResult<()> {
    for plugin in plugins {
        let mut plugin = plugin.lock().await;
        let outcome = async {
            plugin.build_start().await.map_err(|e| ("build_start", e))?;
            plugin.build_end().await.map_err(|e| ("build_end", e))?;
            plugin
                .write_bundle(out_dir)
                .await
                .map_err(|e| ("write_bundle", e))
        }
        .await;

        if let Err((operation, e)) = outcome {
            return Err(PluginError::Execution {
                plugin_name: plugin.name().to_string(),
                operation: operation.to_string(),
                cause: e.to_string(),
            });
        }
    }
    log::debug!("Ran build hooks for {} plugins", plugins.len());
    Ok(())
}
