//! Plugin Error Handling
//!
//! Errors raised while constructing pipeline plugins or running their
//! build hooks.

use std::path::PathBuf;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A plugin could not be built from its options
    #[error("Failed to create {kind} plugin: {message}")]
    Creation { kind: String, message: String },

    /// A build hook failed
    #[error("Plugin '{plugin_name}' failed during '{operation}': {cause}")]
    Execution {
        plugin_name: String,
        operation: String,
        cause: String,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PluginError::Creation { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::Creation { message, .. } => Some(message),
            _ => None,
        }
    }
}
