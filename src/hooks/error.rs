//! Hook system error types

use crate::core::error_handling::BoxError;
use crate::hooks::bus::TapMode;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Registration with an empty tap name
    #[error("Hook tap name must be a non-empty string")]
    InvalidName,

    #[error("Hook bus '{bus}' is at capacity ({max} taps)")]
    CapacityExceeded { bus: String, max: usize },

    /// A tap's own callback failed during `call_parallel`
    #[error("Tap '{tap}' ({mode}) failed: {source}")]
    TapFailed {
        tap: String,
        mode: TapMode,
        #[source]
        source: BoxError,
    },

    #[error("Hook bus lock error: {0}")]
    Poisoned(String),
}

/// Result type for hook operations
pub type HookResult<T> = Result<T, HookError>;

impl crate::core::error_handling::ContextualError for HookError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            HookError::InvalidName | HookError::CapacityExceeded { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            HookError::InvalidName => Some("Hook tap name must be a non-empty string"),
            HookError::CapacityExceeded { .. } => {
                Some("Hook bus is full; clear it or raise the tap limit")
            }
            _ => None,
        }
    }
}
