//! key.properties generation and cleanup.
//!
//! CI jobs write `android/key.properties` (and optionally the keystore
//! itself) before `flutter build`, then remove both afterwards.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{Result, SigningError};
use crate::models::KeystoreType;
use crate::project::ProjectLayout;
use crate::properties::Properties;
use crate::resolver::{KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD};

/// Directory (relative to the project root) keystores are materialised into.
pub const SIGNING_DIR: &str = ".signcfg/signing";

/// Generates key.properties content for Flutter/Gradle.
pub fn generate_key_properties(
    keystore_path: &Path,
    keystore_password: &str,
    key_alias: &str,
    key_password: &str,
) -> String {
    let mut props = Properties::new();
    props.insert(STORE_PASSWORD, keystore_password);
    props.insert(KEY_PASSWORD, key_password);
    props.insert(KEY_ALIAS, key_alias);
    props.insert(STORE_FILE, keystore_path.display().to_string());
    props.to_string()
}

/// Checks that key.properties can be written for `layout`.
///
/// Fails when the Android directory is missing, or when key.properties
/// already exists and `force` is not set.
pub fn ensure_key_properties_writable(layout: &ProjectLayout, force: bool) -> Result<PathBuf> {
    let android_dir = layout.android_dir();
    if !android_dir.is_dir() {
        return Err(SigningError::Configuration(format!(
            "Android directory not found: {}",
            android_dir.display()
        )));
    }

    let path = layout.key_properties_path();
    if path.exists() && !force {
        return Err(SigningError::Configuration(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Ok(path)
}

/// Writes key.properties into the project's Android directory.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub async fn write_key_properties(
    layout: &ProjectLayout,
    keystore_path: &Path,
    keystore_password: &str,
    key_alias: &str,
    key_password: &str,
    force: bool,
) -> Result<PathBuf> {
    let path = ensure_key_properties_writable(layout, force)?;

    let content = generate_key_properties(keystore_path, keystore_password, key_alias, key_password);
    write_private(&path, content.as_bytes()).await?;

    tracing::debug!("Wrote key.properties to {}", path.display());

    Ok(path)
}

/// Removes key.properties from the project, if present.
///
/// Returns whether a file was removed.
pub async fn cleanup_key_properties(layout: &ProjectLayout) -> Result<bool> {
    let path = layout.key_properties_path();
    if !path.exists() {
        return Ok(false);
    }

    tokio::fs::remove_file(&path).await?;
    tracing::debug!("Removed key.properties from {}", path.display());
    Ok(true)
}

/// Writes keystore bytes into the project's signing directory.
pub async fn write_keystore(
    layout: &ProjectLayout,
    keystore_data: &[u8],
    keystore_type: KeystoreType,
) -> Result<PathBuf> {
    let signing_dir = layout.root().join(SIGNING_DIR);
    tokio::fs::create_dir_all(&signing_dir).await?;

    let keystore_path = signing_dir.join(format!("keystore.{}", keystore_type.extension()));
    write_private(&keystore_path, keystore_data).await?;

    tracing::debug!("Wrote keystore to {}", keystore_path.display());

    Ok(keystore_path)
}

/// Removes key.properties and the materialised keystore directory.
pub async fn cleanup_signing(layout: &ProjectLayout) -> Result<()> {
    cleanup_key_properties(layout).await?;

    let signing_dir = layout.root().join(SIGNING_DIR);
    if signing_dir.exists() {
        tokio::fs::remove_dir_all(&signing_dir).await?;
        tracing::debug!("Removed signing directory: {}", signing_dir.display());
    }

    Ok(())
}

/// Writes a file readable only by its owner.
///
/// New files are created with mode 0600; an existing file is truncated and
/// narrowed to 0600 before any content is written.
async fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(data).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_properties() {
        let content = generate_key_properties(
            Path::new("/path/to/keystore.jks"),
            "storepass",
            "myalias",
            "keypass",
        );

        assert!(content.contains("storePassword=storepass"));
        assert!(content.contains("keyPassword=keypass"));
        assert!(content.contains("keyAlias=myalias"));
        assert!(content.contains("storeFile=/path/to/keystore.jks"));
    }

    #[tokio::test]
    async fn test_write_requires_android_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());

        let err = write_key_properties(&layout, Path::new("/k.jks"), "s", "a", "k", false)
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        let layout = ProjectLayout::new(dir.path());

        write_key_properties(&layout, Path::new("/k.jks"), "s", "a", "k", false)
            .await
            .unwrap();
        assert!(
            write_key_properties(&layout, Path::new("/k.jks"), "s", "a", "k", false)
                .await
                .is_err()
        );
        write_key_properties(&layout, Path::new("/other.jks"), "s", "a", "k", true)
            .await
            .unwrap();

        let written = Properties::load(&layout.key_properties_path()).unwrap();
        assert_eq!(written.get(STORE_FILE), Some("/other.jks"));
    }

    #[tokio::test]
    async fn test_refused_write_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        let layout = ProjectLayout::new(dir.path());

        write_key_properties(&layout, Path::new("/first.jks"), "s", "a", "k", false)
            .await
            .unwrap();
        assert!(ensure_key_properties_writable(&layout, false).is_err());
        assert!(ensure_key_properties_writable(&layout, true).is_ok());

        let written = Properties::load(&layout.key_properties_path()).unwrap();
        assert_eq!(written.get(KEY_ALIAS), Some("a"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signing_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        let layout = ProjectLayout::new(dir.path());

        // A pre-existing world-readable file is narrowed on overwrite
        let path = layout.key_properties_path();
        std::fs::write(&path, "old=1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_key_properties(&layout, Path::new("/k.jks"), "s", "a", "k", true)
            .await
            .unwrap();
        let keystore = write_keystore(&layout, b"keystore", KeystoreType::Pkcs12)
            .await
            .unwrap();

        for file in [path, keystore] {
            let mode = std::fs::metadata(&file).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{}", file.display());
        }
    }

    #[tokio::test]
    async fn test_write_keystore_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        let layout = ProjectLayout::new(dir.path());

        let keystore = write_keystore(&layout, &[0xFE, 0xED, 0xFE, 0xED], KeystoreType::Jks)
            .await
            .unwrap();
        assert!(keystore.ends_with(".signcfg/signing/keystore.jks"));
        write_key_properties(&layout, &keystore, "s", "a", "k", false)
            .await
            .unwrap();

        cleanup_signing(&layout).await.unwrap();
        assert!(!layout.key_properties_path().exists());
        assert!(!dir.path().join(SIGNING_DIR).exists());
        assert!(!cleanup_key_properties(&layout).await.unwrap());
    }
}
