//! Module discovery error types

use std::path::PathBuf;

/// A descriptor parsed as JSON but failed the shape checks
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid module descriptor field '{field}': {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `setting.pages[1].path`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid scan pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Result type for module discovery operations
pub type ModuleResult<T> = Result<T, ModuleError>;

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

impl crate::core::error_handling::ContextualError for ModuleError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ModuleError::Validation(_) | ModuleError::Pattern { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ModuleError::Validation(err) => Some(&err.message),
            ModuleError::Pattern { message, .. } => Some(message),
            _ => None,
        }
    }
}
