//! Domain models for Android signing resolution.

pub mod build;
pub mod signing;

pub use build::*;
pub use signing::*;
