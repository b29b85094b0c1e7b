//! TOML configuration file loading
//!
//! Every key is optional. An explicitly named file must exist; the default
//! `uniboost.toml` in the project root is used only when present.

use crate::core::error_handling::ContextualError;
use crate::modules::api::{AggregatorOptions, MergeOrder};
use crate::plugin::api::{default_replacements, PluginSettings, DEFAULT_STATIC_PREFIX};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// File name looked up in the project root when no config file is given
pub const DEFAULT_CONFIG_FILE: &str = "uniboost.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message, .. } | ConfigError::Invalid { message, .. } => {
                Some(message)
            }
            ConfigError::NotFound { .. } => Some("configuration file does not exist"),
            ConfigError::Read { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct UniBoostConfig {
    pub root: PathBuf,
    pub module_path: String,
    pub descriptor_name: String,
    pub pages_file: String,
    pub src: String,
    pub route_config: String,
    pub enable_hmr: bool,
    pub log_level: String,
    pub merge_order: MergeOrder,
    pub require_page_modules: bool,
    pub static_prefix: String,
    pub define: Map<String, Value>,
}

impl Default for UniBoostConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            module_path: "src/modules".to_string(),
            descriptor_name: "module.json".to_string(),
            pages_file: "src/pages.json".to_string(),
            src: "src".to_string(),
            route_config: "src/route.config.json".to_string(),
            enable_hmr: true,
            log_level: "info".to_string(),
            merge_order: MergeOrder::Sorted,
            require_page_modules: false,
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            define: default_replacements(),
        }
    }
}

/// Partial update applied on top of a loaded configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub log_level: Option<String>,
    pub merge_order: Option<MergeOrder>,
    pub enable_hmr: Option<bool>,
    pub require_page_modules: Option<bool>,
}

impl UniBoostConfig {
    /// Parse TOML text
    ///
    /// `origin` names the file in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration for a project
    ///
    /// With `config_file` the file must exist. Without it `<root>/uniboost.toml`
    /// is read if present, otherwise defaults apply. A relative `root` inside a
    /// file resolves against that file's directory.
    pub async fn load(config_file: Option<&Path>, root: &Path) -> ConfigResult<Self> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self {
                        root: root.to_path_buf(),
                        ..Default::default()
                    });
                }
                default_path
            }
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        let mut config = Self::from_toml_str(&text, &path)?;

        if config.root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.root = resolve_relative(base, &config.root);
        }

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let non_empty = [
            ("module-path", &self.module_path),
            ("descriptor-name", &self.descriptor_name),
            ("pages-file", &self.pages_file),
            ("static-prefix", &self.static_prefix),
            ("log-level", &self.log_level),
        ];
        for (key, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    message: format!("{} must not be empty", key),
                });
            }
        }

        if self.descriptor_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                key: "descriptor-name".to_string(),
                message: "descriptor-name must be a file name, not a path".to_string(),
            });
        }

        for key in self.define.keys() {
            if let Err(e) = regex::Regex::new(key) {
                return Err(ConfigError::Invalid {
                    key: "define".to_string(),
                    message: format!("'{}' is not a valid pattern: {}", key, e),
                });
            }
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(root) = &overrides.root {
            self.root = root.clone();
        }
        if let Some(log_level) = &overrides.log_level {
            self.log_level = log_level.clone();
        }
        if let Some(merge_order) = overrides.merge_order {
            self.merge_order = merge_order;
        }
        if let Some(enable_hmr) = overrides.enable_hmr {
            self.enable_hmr = enable_hmr;
        }
        if let Some(required) = overrides.require_page_modules {
            self.require_page_modules = required;
        }
    }

    /// Verbose plugin logging follows the configured level
    pub fn verbose(&self) -> bool {
        matches!(self.log_level.as_str(), "debug" | "trace")
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            root: self.root.clone(),
            module_path: self.module_path.clone(),
            descriptor_name: self.descriptor_name.clone(),
            pages_file: self.pages_file.clone(),
            src: self.src.clone(),
            merge_order: self.merge_order,
            require_page_modules: self.require_page_modules,
        }
    }

    pub fn plugin_settings(&self) -> PluginSettings {
        PluginSettings {
            route_config: PathBuf::from(&self.route_config),
            enable_hmr: self.enable_hmr,
            static_prefix: self.static_prefix.clone(),
            define: self.define.clone(),
            enable_logging: self.verbose(),
        }
    }
}

/// `base` joined with `relative`, dropping `.` components
fn resolve_relative(base: &Path, relative: &Path) -> PathBuf {
    let joined: PathBuf = base
        .join(relative)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if joined.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        joined
    }
}
