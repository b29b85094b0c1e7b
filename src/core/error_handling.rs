//! Error reporting shared by all subsystems
//!
//! Subsystem errors distinguish problems the user can fix (a malformed
//! descriptor, a bad config key) from system failures (I/O, poisoned locks).
//! The binary reports failures through [`log_error_with_context`] so both
//! kinds are logged consistently.

/// Boxed error type returned by user supplied callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that know whether their message is actionable by the user
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the message describes something the user can fix
    fn is_user_actionable(&self) -> bool;

    /// The message to show the user, for actionable errors only
    fn user_message(&self) -> Option<&str>;
}

/// Log a failure at error level with details at debug level
///
/// Actionable errors show their own message; system errors show the
/// operation context and keep the internals for `--log-level debug`.
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg)
        }
        _ => log::error!("{} failed", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
