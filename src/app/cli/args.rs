//! Command line arguments
//!
//! Global flags override values from the configuration file; the
//! subcommand selects what to print or write.

use crate::app::cli::config::ConfigOverrides;
use crate::modules::api::MergeOrder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "uniboost")]
#[command(about = "Page module aggregation and virtual module generation")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Project root (defaults to the config file value or the current directory)
    #[arg(short = 'r', long = "root", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Configuration file path (defaults to uniboost.toml in the project root)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored output (overrides TTY detection and NO_COLOR)
    #[arg(long = "color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Merge order for discovered modules: sorted or scan
    #[arg(long = "merge-order", value_name = "ORDER")]
    pub merge_order: Option<MergeOrder>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the merged page registry as JSON
    Registry {
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// List discovered modules with their descriptor paths
    Modules,
    /// List every file the registry depends on
    WatchSet,
    /// Write the merged registry back to the pages file
    Write,
    /// Print the generated source of a virtual module
    Virtual {
        /// Virtual module id, e.g. virtual:PageModuleRoute/route
        id: String,
    },
    /// Print hook and plugin cache statistics
    Stats,
}

impl Command {
    /// Operation name reported to lifecycle hooks
    pub fn name(&self) -> &'static str {
        match self {
            Command::Registry { .. } => "registry",
            Command::Modules => "modules",
            Command::WatchSet => "watch-set",
            Command::Write => "write",
            Command::Virtual { .. } => "virtual",
            Command::Stats => "stats",
        }
    }
}

impl Args {
    /// Log file path, with the magic values `none` and `-` disabling it
    pub fn log_file(&self) -> Option<&str> {
        let path = self.log_file.as_deref()?.to_str()?;
        if path.eq_ignore_ascii_case("none") || path == "-" {
            None
        } else {
            Some(path)
        }
    }

    /// Values that take precedence over the configuration file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            log_level: self.log_level.clone(),
            merge_order: self.merge_order,
            ..Default::default()
        }
    }

    /// Whether log and terminal output should be colored
    pub fn use_color(&self, stdout_is_terminal: bool) -> bool {
        if self.no_color {
            return false;
        }
        if self.color {
            return true;
        }
        stdout_is_terminal && std::env::var_os("NO_COLOR").is_none()
    }
}
