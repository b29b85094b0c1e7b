//! Command line arguments and configuration file handling

pub mod args;
pub mod config;
