//! Android keystore utilities.
//!
//! This module provides functionality for:
//! - Keystore type detection and validation with `keytool`
//! - key.properties generation and cleanup for CI builds

pub mod key_properties;
pub mod keystore;

pub use key_properties::*;
pub use keystore::*;
