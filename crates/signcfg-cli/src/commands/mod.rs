//! CLI command implementations.

pub mod config;
pub mod key_properties;
pub mod resolve;
