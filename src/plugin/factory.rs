//! Plugin Factory
//!
//! Builds the standard pipeline plugins from discovered module data and
//! memoizes them by kind and options, so identical requests share one
//! plugin instance.

use crate::modules::api::{
    AggregatorOptions, DirectoryScanner, FileAccess, ModuleAggregator, ModuleData, ModuleRecord,
};
use crate::plugin::cache::{cache_key, CacheStats, PluginCache};
use crate::plugin::error::PluginResult;
use crate::plugin::hook_imports::page_module_hook;
use crate::plugin::intercept_define::{default_replacements, InterceptDefinePlugin};
use crate::plugin::page_module::PageModulePlugin;
use crate::plugin::route::page_module_route;
use crate::plugin::static_assets::{StaticAssetsPlugin, DEFAULT_STATIC_PREFIX};
use crate::plugin::traits::{share, SharedPlugin};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Settings shared by every plugin the factory builds
#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// Global route table, resolved against the project root
    pub route_config: PathBuf,
    pub enable_hmr: bool,
    pub static_prefix: String,
    /// Replacement table for the intercept-define plugin
    pub define: Map<String, Value>,
    pub enable_logging: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            route_config: PathBuf::from("src/route.config.json"),
            enable_hmr: true,
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            define: default_replacements(),
            enable_logging: false,
        }
    }
}

/// A plugin request: its kind plus the options it is built from
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "kebab-case")]
pub enum PluginSpec {
    #[serde(rename_all = "camelCase")]
    Module { file_name: String, src: String },
    Route { modules: Vec<ModuleRecord> },
    Static { modules: Vec<ModuleRecord> },
    Hook { modules: Vec<ModuleRecord>, src: String },
    InterceptDefine {},
}

impl PluginSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            PluginSpec::Module { .. } => "module",
            PluginSpec::Route { .. } => "route",
            PluginSpec::Static { .. } => "static",
            PluginSpec::Hook { .. } => "hook",
            PluginSpec::InterceptDefine {} => "intercept-define",
        }
    }

    /// `<kind>-<options as compact JSON>`
    pub fn cache_key(&self) -> PluginResult<String> {
        let value = serde_json::to_value(self)?;
        let options = value
            .get("options")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        cache_key(self.kind(), &options)
    }

    /// The five standard plugins for one pass's module data
    pub fn standard(data: &ModuleData) -> Vec<PluginSpec> {
        vec![
            PluginSpec::Module {
                file_name: data.file_name.clone(),
                src: data.src.clone(),
            },
            PluginSpec::Route {
                modules: data.records.clone(),
            },
            PluginSpec::Static {
                modules: data.records.clone(),
            },
            PluginSpec::Hook {
                modules: data.records.clone(),
                src: data.src.clone(),
            },
            PluginSpec::InterceptDefine {},
        ]
    }
}

pub struct PluginFactory {
    options: AggregatorOptions,
    files: Arc<dyn FileAccess>,
    scanner: Arc<dyn DirectoryScanner>,
    settings: PluginSettings,
    cache: PluginCache<Vec<SharedPlugin>>,
}

impl PluginFactory {
    /// Factory building plugins over the same sources as `aggregator`
    pub fn new(aggregator: &ModuleAggregator, settings: PluginSettings) -> Self {
        log::debug!("PluginFactory initialised");
        Self {
            options: aggregator.options().clone(),
            files: aggregator.files(),
            scanner: aggregator.scanner(),
            settings,
            cache: PluginCache::new(),
        }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Build (or reuse) the plugins for one spec
    ///
    /// The static plugin yields no plugins when no module declares assets.
    pub fn create_plugin(&mut self, spec: &PluginSpec) -> PluginResult<Vec<SharedPlugin>> {
        let key = spec.cache_key()?;
        let options = &self.options;
        let files = &self.files;
        let scanner = &self.scanner;
        let settings = &self.settings;

        self.cache.get_or_create(&key, || {
            let plugins = build_plugin(spec, options, files, scanner, settings)?;
            log::info!("Created {} plugin", spec.kind());
            Ok(plugins)
        })
    }

    /// Build every spec, skipping failures
    pub fn create_plugins(&mut self, specs: &[PluginSpec]) -> Vec<SharedPlugin> {
        let mut plugins = Vec::new();
        let mut created = 0;

        for spec in specs {
            match self.create_plugin(spec) {
                Ok(built) => {
                    if !built.is_empty() {
                        created += 1;
                    }
                    plugins.extend(built);
                }
                Err(e) => log::error!("Failed to create {} plugin: {}", spec.kind(), e),
            }
        }

        log::info!("Created {}/{} plugins", created, specs.len());
        plugins
    }

    pub fn create_standard_plugins(&mut self, data: &ModuleData) -> Vec<SharedPlugin> {
        self.create_plugins(&PluginSpec::standard(data))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn build_plugin(
    spec: &PluginSpec,
    options: &AggregatorOptions,
    files: &Arc<dyn FileAccess>,
    scanner: &Arc<dyn DirectoryScanner>,
    settings: &PluginSettings,
) -> PluginResult<Vec<SharedPlugin>> {
    let plugins = match spec {
        PluginSpec::Module { file_name, src } => {
            log::debug!("Creating module plugin ({}, {})", file_name, src);
            let aggregator = ModuleAggregator::with_collaborators(
                options.clone(),
                Arc::clone(files),
                Arc::clone(scanner),
            );
            vec![share(
                PageModulePlugin::new(aggregator).with_logging(settings.enable_logging),
            )]
        }
        PluginSpec::Route { modules } => {
            log::debug!("Creating route plugin ({} modules)", modules.len());
            let route_config = options.root.join(&settings.route_config);
            vec![share(page_module_route(
                files.as_ref(),
                &route_config,
                modules,
                settings.enable_hmr,
            ))]
        }
        PluginSpec::Static { modules } => {
            log::debug!("Creating static plugin ({} modules)", modules.len());
            StaticAssetsPlugin::from_records(modules, &settings.static_prefix)
                .map(share)
                .into_iter()
                .collect()
        }
        PluginSpec::Hook { modules, .. } => {
            log::debug!("Creating hook plugin ({} modules)", modules.len());
            vec![share(page_module_hook(modules, settings.enable_hmr))]
        }
        PluginSpec::InterceptDefine {} => {
            log::debug!("Creating intercept-define plugin");
            let plugin = InterceptDefinePlugin::new(&settings.define)?
                .with_logging(settings.enable_logging);
            vec![share(plugin)]
        }
    };
    Ok(plugins)
}

/// Discover modules and build the standard plugin set in one step
pub fn create_uniboost_plugins(
    options: AggregatorOptions,
    settings: PluginSettings,
) -> Vec<SharedPlugin> {
    let mut aggregator = ModuleAggregator::new(options);
    create_plugins_for(&mut aggregator, settings)
}

/// [`create_uniboost_plugins`] over an existing aggregator
pub fn create_plugins_for(
    aggregator: &mut ModuleAggregator,
    settings: PluginSettings,
) -> Vec<SharedPlugin> {
    let data = aggregator.load_data();
    let mut factory = PluginFactory::new(aggregator, settings);
    factory.create_standard_plugins(&data)
}
