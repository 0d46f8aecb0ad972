//! Release signing resolution.
//!
//! Mirrors what the Flutter Android module does at configuration time: when
//! `android/key.properties` exists, release builds are signed with the
//! keystore it describes; otherwise they fall back to the debug signing
//! config. A properties file that exists but is incomplete is an error.

use std::path::{Path, PathBuf};

use crate::error::{Result, SigningError};
use crate::models::{SigningCredentials, SigningIdentity, VariantSigning};
use crate::project::ProjectLayout;
use crate::properties::Properties;

pub const KEY_ALIAS: &str = "keyAlias";
pub const KEY_PASSWORD: &str = "keyPassword";
pub const STORE_FILE: &str = "storeFile";
pub const STORE_PASSWORD: &str = "storePassword";

/// Keys `key.properties` must define, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

/// The signing properties file, if one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesSource {
    Absent,
    Present { path: PathBuf, properties: Properties },
}

impl PropertiesSource {
    /// Checks whether `path` exists and parses it if it does.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No signing properties at {}", path.display());
            return Ok(PropertiesSource::Absent);
        }

        let properties = Properties::load(path)?;
        if properties.is_empty() {
            tracing::warn!("{} exists but defines no properties", path.display());
        }
        Ok(PropertiesSource::Present {
            path: path.to_path_buf(),
            properties,
        })
    }
}

/// Resolves the release signing identity.
///
/// A relative `storeFile` is resolved against `base_dir`, the Android app
/// module directory, the same way Gradle's `file()` does.
pub fn resolve_signing_identity(source: &PropertiesSource, base_dir: &Path) -> Result<SigningIdentity> {
    match source {
        PropertiesSource::Absent => {
            tracing::info!("No signing properties found, release builds use debug signing");
            Ok(SigningIdentity::Debug)
        }
        PropertiesSource::Present { path, properties } => {
            let credentials = read_credentials(path, properties, base_dir)?;
            tracing::info!(
                "Release builds signed with alias '{}' from {}",
                credentials.key_alias(),
                credentials.store_file().display()
            );
            Ok(SigningIdentity::Release(credentials))
        }
    }
}

/// Resolves signing for every variant of a Flutter project.
pub fn resolve_project_signing(layout: &ProjectLayout) -> Result<VariantSigning> {
    let source = PropertiesSource::load(&layout.key_properties_path())?;
    let release = resolve_signing_identity(&source, &layout.app_dir())?;
    Ok(VariantSigning::new(release))
}

fn read_credentials(path: &Path, properties: &Properties, base_dir: &Path) -> Result<SigningCredentials> {
    let key_alias = required(properties, KEY_ALIAS, path)?;
    let key_password = required(properties, KEY_PASSWORD, path)?;
    let store_file = required(properties, STORE_FILE, path)?;
    let store_password = required(properties, STORE_PASSWORD, path)?;

    let store_file = resolve_store_file(store_file, base_dir);
    if !store_file.is_file() {
        return Err(SigningError::KeystoreNotFound(store_file));
    }

    Ok(SigningCredentials::new(
        key_alias,
        key_password,
        store_file,
        store_password,
    ))
}

fn required<'a>(properties: &'a Properties, key: &'static str, path: &Path) -> Result<&'a str> {
    properties
        .get(key)
        .ok_or_else(|| SigningError::MissingProperty {
            key,
            path: path.to_path_buf(),
        })
}

fn resolve_store_file(raw: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
