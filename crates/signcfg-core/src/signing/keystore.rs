//! Keystore inspection.

use std::path::PathBuf;
use std::process::Stdio;

use secrecy::ExposeSecret;
use tokio::process::Command;

use crate::error::{Result, SigningError};
use crate::models::{KeystoreType, SigningCredentials};

/// Information extracted from a keystore.
#[derive(Debug, Clone)]
pub struct KeystoreInfo {
    /// Type of the keystore (JKS or PKCS12).
    pub keystore_type: KeystoreType,
    /// Whether the alias exists in the keystore.
    pub alias_exists: bool,
}

/// Detects the keystore type from its magic bytes.
pub fn detect_keystore_type(data: &[u8]) -> KeystoreType {
    // JKS files start with 0xFEEDFEED, anything else is treated as PKCS12
    if data.starts_with(&[0xFE, 0xED, 0xFE, 0xED]) {
        KeystoreType::Jks
    } else {
        KeystoreType::Pkcs12
    }
}

/// Locates `keytool`, preferring `$JAVA_HOME/bin/keytool`.
pub fn keytool_path() -> PathBuf {
    if let Ok(java_home) = std::env::var("JAVA_HOME") {
        let candidate = PathBuf::from(java_home).join("bin").join("keytool");
        if candidate.is_file() {
            return candidate;
        }
    }
    PathBuf::from("keytool")
}

/// Validates release credentials against their keystore.
///
/// Opens the keystore with `keytool -list` to check the store password and
/// that the alias exists.
pub async fn validate_keystore(credentials: &SigningCredentials) -> Result<KeystoreInfo> {
    let store_file = credentials.store_file();
    let data = tokio::fs::read(store_file)
        .await
        .map_err(|_| SigningError::KeystoreNotFound(store_file.to_path_buf()))?;
    let keystore_type = detect_keystore_type(&data);

    let output = Command::new(keytool_path())
        .arg("-list")
        .arg("-keystore")
        .arg(store_file)
        .arg("-storepass")
        .arg(credentials.store_password().expose_secret())
        .arg("-alias")
        .arg(credentials.key_alias())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| SigningError::Keystore(format!("Failed to run keytool: {}", e)))?;

    if !output.status.success() {
        // keytool reports some failures on stdout
        let message = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(classify_keytool_error(&message, credentials.key_alias()));
    }

    tracing::debug!(
        "Validated {} keystore {}",
        keystore_type,
        store_file.display()
    );

    Ok(KeystoreInfo {
        keystore_type,
        alias_exists: true,
    })
}

fn classify_keytool_error(message: &str, alias: &str) -> SigningError {
    if message.contains("password was incorrect") {
        return SigningError::Keystore("Invalid keystore password".to_string());
    }
    if message.contains("does not exist") {
        return SigningError::Keystore(format!("Alias '{}' not found in keystore", alias));
    }
    if message.contains("Invalid keystore format") || message.contains("Unrecognized keystore format") {
        return SigningError::Keystore("Invalid keystore format".to_string());
    }

    SigningError::Keystore(format!("Failed to validate keystore: {}", message.trim()))
}
