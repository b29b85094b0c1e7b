// Internal modules - all access should go through api module
pub(crate) mod bus;
pub(crate) mod error;
pub(crate) mod lifecycle;
pub(crate) mod wrap;

// Public API module - the only public interface for the hook system
pub mod api;
