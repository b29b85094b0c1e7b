//! Test modules for the plugin system
//!
//! Factory, cache and pipeline tests over an in-memory source tree.
