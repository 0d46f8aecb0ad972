//! Android signing models.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::BuildVariant;

/// Key alias of the Android SDK debug keystore.
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";

/// Store and key password of the Android SDK debug keystore.
pub const DEBUG_KEYSTORE_PASSWORD: &str = "android";

/// Placeholder shown instead of secret values.
pub const MASKED_SECRET: &str = "********";

// ============================================================================
// Keystore Type
// ============================================================================

/// Android keystore container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeystoreType {
    Jks,
    Pkcs12,
}

impl KeystoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeystoreType::Jks => "jks",
            KeystoreType::Pkcs12 => "pkcs12",
        }
    }

    /// File extension used when materialising a keystore of this type.
    pub fn extension(&self) -> &'static str {
        match self {
            KeystoreType::Jks => "jks",
            KeystoreType::Pkcs12 => "keystore",
        }
    }
}

impl std::str::FromStr for KeystoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jks" => Ok(KeystoreType::Jks),
            "pkcs12" | "p12" => Ok(KeystoreType::Pkcs12),
            _ => Err(format!("Unknown keystore type: {}", s)),
        }
    }
}

impl std::fmt::Display for KeystoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Signing Credentials
// ============================================================================

/// Keystore credentials read from `key.properties`.
///
/// Passwords are kept in [`SecretString`] so `Debug` output stays redacted.
#[derive(Debug)]
pub struct SigningCredentials {
    key_alias: String,
    key_password: SecretString,
    store_file: PathBuf,
    store_password: SecretString,
}

impl SigningCredentials {
    pub fn new(
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
        store_file: impl Into<PathBuf>,
        store_password: impl Into<String>,
    ) -> Self {
        Self {
            key_alias: key_alias.into(),
            key_password: SecretString::from(key_password.into()),
            store_file: store_file.into(),
            store_password: SecretString::from(store_password.into()),
        }
    }

    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    pub fn key_password(&self) -> &SecretString {
        &self.key_password
    }

    pub fn store_file(&self) -> &Path {
        &self.store_file
    }

    pub fn store_password(&self) -> &SecretString {
        &self.store_password
    }
}

/// Returns the directory holding Android user state (`$ANDROID_USER_HOME` or `~/.android`).
pub fn android_user_home() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ANDROID_USER_HOME") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::home_dir().map(|h| h.join(".android"))
}

/// Credentials of the debug keystore the Android Gradle plugin creates.
pub fn debug_credentials() -> Option<SigningCredentials> {
    android_user_home().map(|dir| {
        SigningCredentials::new(
            DEBUG_KEY_ALIAS,
            DEBUG_KEYSTORE_PASSWORD,
            dir.join("debug.keystore"),
            DEBUG_KEYSTORE_PASSWORD,
        )
    })
}

// ============================================================================
// Signing Identity
// ============================================================================

/// Signing identity attached to a build variant.
#[derive(Debug)]
pub enum SigningIdentity {
    /// The platform's built-in debug signing config.
    Debug,
    /// A release signing config built from `key.properties`.
    Release(SigningCredentials),
}

static DEBUG_IDENTITY: SigningIdentity = SigningIdentity::Debug;

impl SigningIdentity {
    pub fn is_debug(&self) -> bool {
        matches!(self, SigningIdentity::Debug)
    }

    /// Name of the Gradle signing config this identity maps to.
    pub fn config_name(&self) -> &'static str {
        match self {
            SigningIdentity::Debug => "debug",
            SigningIdentity::Release(_) => "release",
        }
    }

    /// Release credentials, if this is a release identity.
    pub fn credentials(&self) -> Option<&SigningCredentials> {
        match self {
            SigningIdentity::Debug => None,
            SigningIdentity::Release(credentials) => Some(credentials),
        }
    }

    /// Builds a printable summary, masking passwords unless `show_secrets` is set.
    pub fn summary(&self, variant: BuildVariant, show_secrets: bool) -> SigningSummary {
        let reveal = |secret: &SecretString| {
            if show_secrets {
                secret.expose_secret().to_string()
            } else {
                MASKED_SECRET.to_string()
            }
        };

        match self {
            SigningIdentity::Debug => SigningSummary {
                variant,
                signing_config: self.config_name().to_string(),
                key_alias: Some(DEBUG_KEY_ALIAS.to_string()),
                store_file: debug_credentials().map(|c| c.store_file().display().to_string()),
                key_password: None,
                store_password: None,
            },
            SigningIdentity::Release(credentials) => SigningSummary {
                variant,
                signing_config: self.config_name().to_string(),
                key_alias: Some(credentials.key_alias().to_string()),
                store_file: Some(credentials.store_file().display().to_string()),
                key_password: Some(reveal(credentials.key_password())),
                store_password: Some(reveal(credentials.store_password())),
            },
        }
    }
}

/// Signing identities resolved for every build variant.
#[derive(Debug)]
pub struct VariantSigning {
    release: SigningIdentity,
}

impl VariantSigning {
    pub fn new(release: SigningIdentity) -> Self {
        Self { release }
    }

    /// Identity used by `variant`. Debug builds always use the debug identity.
    pub fn for_variant(&self, variant: BuildVariant) -> &SigningIdentity {
        match variant {
            BuildVariant::Debug => &DEBUG_IDENTITY,
            BuildVariant::Release => &self.release,
        }
    }

    pub fn release(&self) -> &SigningIdentity {
        &self.release
    }
}

/// Serializable view of a resolved identity (secrets masked by default).
#[derive(Debug, Clone, Serialize)]
pub struct SigningSummary {
    pub variant: BuildVariant,
    pub signing_config: String,
    pub key_alias: Option<String>,
    pub store_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SigningCredentials {
        SigningCredentials::new("upload", "key-secret", "/keys/upload.jks", "store-secret")
    }

    #[test]
    fn test_debug_output_redacts_passwords() {
        let rendered = format!("{:?}", SigningIdentity::Release(sample()));
        assert!(rendered.contains("upload"));
        assert!(!rendered.contains("key-secret"));
        assert!(!rendered.contains("store-secret"));
    }

    #[test]
    fn test_summary_masks_secrets_by_default() {
        let identity = SigningIdentity::Release(sample());
        let summary = identity.summary(BuildVariant::Release, false);
        assert_eq!(summary.signing_config, "release");
        assert_eq!(summary.key_alias.as_deref(), Some("upload"));
        assert_eq!(summary.store_file.as_deref(), Some("/keys/upload.jks"));
        assert_eq!(summary.key_password.as_deref(), Some(MASKED_SECRET));
        assert_eq!(summary.store_password.as_deref(), Some(MASKED_SECRET));

        let revealed = identity.summary(BuildVariant::Release, true);
        assert_eq!(revealed.key_password.as_deref(), Some("key-secret"));
        assert_eq!(revealed.store_password.as_deref(), Some("store-secret"));
    }

    #[test]
    fn test_debug_variant_always_uses_debug_identity() {
        let signing = VariantSigning::new(SigningIdentity::Release(sample()));
        assert!(signing.for_variant(BuildVariant::Debug).is_debug());
        assert_eq!(signing.for_variant(BuildVariant::Release).config_name(), "release");
    }

    #[test]
    fn test_debug_credentials_use_android_user_home() {
        temp_env::with_var("ANDROID_USER_HOME", Some("/tmp/android-home"), || {
            let creds = debug_credentials().unwrap();
            assert_eq!(creds.key_alias(), DEBUG_KEY_ALIAS);
            assert_eq!(creds.store_file(), Path::new("/tmp/android-home/debug.keystore"));
            assert_eq!(creds.store_password().expose_secret(), DEBUG_KEYSTORE_PASSWORD);
        });
    }

    #[test]
    fn test_keystore_type_extension() {
        assert_eq!(KeystoreType::Jks.extension(), "jks");
        assert_eq!(KeystoreType::Pkcs12.extension(), "keystore");
        assert_eq!("p12".parse::<KeystoreType>(), Ok(KeystoreType::Pkcs12));
    }
}
