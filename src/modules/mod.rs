//! Module Discovery and Registry Merging
//!
//! Finds every module descriptor under the module root, validates each one,
//! and folds them into a single aggregate page registry. The resulting
//! records also feed the route, static asset and hook import generators.

// Internal modules - all access should go through api module
pub(crate) mod aggregator;
pub(crate) mod error;
pub(crate) mod io;
pub(crate) mod key;
pub(crate) mod loader;
pub(crate) mod merge;
pub(crate) mod types;

// Public API module - the only public interface for module discovery
pub mod api;

#[cfg(test)]
mod tests;
