//! Virtual module content errors
//!
//! These never leave [`load`](crate::virtual_module::runtime::VirtualModuleRuntime::load).
//! They are logged and the runtime serves a fallback instead.

use crate::core::error_handling::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Virtual module {module_id} has no content")]
    Empty { module_id: String },

    #[error("Virtual module {module_id} content rejected by validator")]
    Rejected { module_id: String },

    #[error("Virtual module {module_id} transform failed: {source}")]
    Transform {
        module_id: String,
        #[source]
        source: BoxError,
    },
}

impl crate::core::error_handling::ContextualError for ContentError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ContentError::Empty { .. } | ContentError::Rejected { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ContentError::Empty { .. } => Some("virtual module content is empty"),
            ContentError::Rejected { .. } => Some("virtual module content failed validation"),
            ContentError::Transform { .. } => None,
        }
    }
}
