//! Subcommand execution
//!
//! Each command runs inside the lifecycle hooks and returns the text to
//! print, so the binary only decides where output goes.

use crate::app::cli::args::Command;
use crate::app::cli::config::UniBoostConfig;
use crate::core::error_handling::ContextualError;
use crate::hooks::api::{run_with_lifecycle, ModuleHooks};
use crate::modules::api::{DirectoryScanner, FileAccess, ModuleAggregator};
use crate::plugin::api::{resolve_and_load, PluginFactory};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to write registry to {path}")]
    WriteFailed { path: PathBuf },

    #[error("No plugin provides virtual module '{id}'")]
    UnknownVirtualModule { id: String, message: String },

    #[error("Failed to serialise output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContextualError for CommandError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, CommandError::UnknownVirtualModule { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CommandError::UnknownVirtualModule { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Runs commands against one project configuration
pub struct CommandRunner {
    config: UniBoostConfig,
    hooks: Arc<ModuleHooks>,
    collaborators: Option<(Arc<dyn FileAccess>, Arc<dyn DirectoryScanner>)>,
}

impl CommandRunner {
    pub fn new(config: UniBoostConfig, hooks: Arc<ModuleHooks>) -> Self {
        Self {
            config,
            hooks,
            collaborators: None,
        }
    }

    /// Use the given file access and scanner instead of the local disk
    pub fn with_collaborators(
        mut self,
        files: Arc<dyn FileAccess>,
        scanner: Arc<dyn DirectoryScanner>,
    ) -> Self {
        self.collaborators = Some((files, scanner));
        self
    }

    pub fn config(&self) -> &UniBoostConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Arc<ModuleHooks> {
        &self.hooks
    }

    fn aggregator(&self) -> ModuleAggregator {
        let options = self.config.aggregator_options();
        match &self.collaborators {
            Some((files, scanner)) => {
                ModuleAggregator::with_collaborators(options, Arc::clone(files), Arc::clone(scanner))
            }
            None => ModuleAggregator::new(options),
        }
    }

    /// Run `command` between the lifecycle hooks and return its output
    pub async fn run(&self, command: &Command) -> Result<String, CommandError> {
        let args = match command {
            Command::Registry { compact } => json!({ "compact": compact }),
            Command::Virtual { id } => json!({ "id": id }),
            _ => json!({}),
        };

        run_with_lifecycle(&self.hooks, command.name(), args, || self.execute(command)).await
    }

    async fn execute(&self, command: &Command) -> Result<String, CommandError> {
        let mut aggregator = self.aggregator();

        match command {
            Command::Registry { compact } => {
                let registry = aggregator.get_complete_registry().registry;
                let text = if *compact {
                    registry.to_json()?
                } else {
                    registry.to_json_pretty()?
                };
                Ok(text)
            }
            Command::Modules => {
                let lines: Vec<String> = aggregator
                    .discover()
                    .iter()
                    .map(|record| format!("{}\t{}", record.key, record.file_path.display()))
                    .collect();
                Ok(lines.join("\n"))
            }
            Command::WatchSet => {
                let lines: Vec<String> = aggregator
                    .get_complete_registry()
                    .watch_set
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                Ok(lines.join("\n"))
            }
            Command::Write => {
                let complete = aggregator.get_complete_registry();
                let path = aggregator.options().pages_path();
                if !aggregator.save_base_registry(&complete.registry) {
                    return Err(CommandError::WriteFailed { path });
                }
                Ok(format!(
                    "Wrote {} pages from {} modules to {}",
                    complete.registry.pages().len(),
                    complete.records.len(),
                    path.display()
                ))
            }
            Command::Virtual { id } => {
                let data = aggregator.load_data();
                let mut factory = PluginFactory::new(&aggregator, self.config.plugin_settings());
                let plugins = factory.create_standard_plugins(&data);

                resolve_and_load(&plugins, id)
                    .await
                    .ok_or_else(|| CommandError::UnknownVirtualModule {
                        id: id.clone(),
                        message: format!("no plugin provides virtual module '{}'", id),
                    })
            }
            Command::Stats => {
                let data = aggregator.load_data();
                let mut factory = PluginFactory::new(&aggregator, self.config.plugin_settings());
                factory.create_standard_plugins(&data);

                let stats = json!({
                    "modules": data.records.len(),
                    "hooks": self.hooks.stats(),
                    "hookModes": self.hooks.detailed_stats(),
                    "plugins": factory.cache_stats(),
                });
                Ok(serde_json::to_string_pretty(&stats)?)
            }
        }
    }
}
