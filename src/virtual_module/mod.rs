// Internal modules - all access should go through api module
pub(crate) mod builder;
pub(crate) mod error;
pub(crate) mod runtime;
pub(crate) mod stats;

// Public API module - the only public interface for virtual modules
pub mod api;
