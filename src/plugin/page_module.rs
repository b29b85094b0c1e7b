//! Serves the merged page registry in place of the pages document

use crate::modules::api::ModuleAggregator;
use crate::plugin::error::PluginResult;
use crate::plugin::traits::{BuildPlugin, HotUpdate, PluginContext};

pub const PAGE_MODULE_PLUGIN_NAME: &str = "uniboost:page-modules";

/// Id suffix the host gives the compiled pages document
pub const PAGES_JSON_ID_SUFFIX: &str = "pages-json-js";

/// File the host reloads when any registry input changes
pub const PAGES_RELOAD_TARGET: &str = "pages.json";

pub struct PageModulePlugin {
    aggregator: ModuleAggregator,
    enable_logging: bool,
    enable_hot_update: bool,
}

impl PageModulePlugin {
    pub fn new(aggregator: ModuleAggregator) -> Self {
        Self {
            aggregator,
            enable_logging: false,
            enable_hot_update: true,
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_hot_update(mut self, enabled: bool) -> Self {
        self.enable_hot_update = enabled;
        self
    }

    fn is_registry_input(&self, file: &str) -> bool {
        let options = self.aggregator.options();
        file.ends_with(options.pages_file_name()) || file.ends_with(&options.descriptor_name)
    }
}

#[async_trait::async_trait]
impl BuildPlugin for PageModulePlugin {
    fn name(&self) -> &str {
        PAGE_MODULE_PLUGIN_NAME
    }

    async fn transform(
        &mut self,
        _code: &str,
        id: &str,
        ctx: &mut dyn PluginContext,
    ) -> PluginResult<Option<String>> {
        if !id.ends_with(PAGES_JSON_ID_SUFFIX) {
            return Ok(None);
        }

        let complete = self.aggregator.get_complete_registry();
        for path in &complete.watch_set {
            ctx.add_watch_file(path);
            if self.enable_logging {
                log::debug!("Watching {}", path.display());
            }
        }

        if self.enable_logging {
            log::debug!(
                "Generated page registry from {} modules",
                complete.records.len()
            );
        }

        match complete.registry.to_json() {
            Ok(json) => Ok(Some(json)),
            Err(e) => {
                log::error!("Failed to serialise page registry: {}", e);
                Ok(Some("{}".to_string()))
            }
        }
    }

    fn handle_hot_update(&mut self, update: &HotUpdate<'_>) {
        if !self.enable_hot_update || !self.is_registry_input(update.file) {
            return;
        }
        if self.enable_logging {
            log::debug!("Registry input changed: {}", update.file);
        }
        update.server.reload(PAGES_RELOAD_TARGET);
    }
}
