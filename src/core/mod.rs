//! Core infrastructure shared by every subsystem

pub mod error_handling;
pub mod logging;
pub mod sync;
pub mod version;
