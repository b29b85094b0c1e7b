//! Page module aggregation, virtual modules and build hooks
//!
//! Each subsystem exposes its public surface through an `api` module.

pub mod app;
pub mod core;
pub mod hooks;
pub mod modules;
pub mod plugin;
pub mod virtual_module;
