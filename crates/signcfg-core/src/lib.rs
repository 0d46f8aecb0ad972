//! signcfg Core Library
//!
//! Release signing resolution for the Android module of Flutter projects:
//! reads `android/key.properties`, falls back to debug signing when it is
//! absent, and manages the files CI jobs write for release builds.

pub mod error;
pub mod models;
pub mod project;
pub mod properties;
pub mod resolver;
pub mod signing;

pub use error::{Result, SigningError};
pub use models::{BuildVariant, SigningCredentials, SigningIdentity, VariantSigning};
pub use project::ProjectLayout;
pub use properties::Properties;
pub use resolver::{resolve_project_signing, resolve_signing_identity, PropertiesSource};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
