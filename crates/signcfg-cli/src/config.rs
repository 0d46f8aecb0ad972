//! CLI configuration loading and resolution.
//!
//! Supports profile-based configuration from `~/.signcfg/config.huml` with
//! priority order: CLI flags > environment variables > config file > defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use signcfg_core::project::KEY_PROPERTIES_FILE;
use signcfg_core::ProjectLayout;
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable overriding the project directory.
pub const PROJECT_ENV: &str = "SIGNCFG_PROJECT";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SIGNCFG_CONFIG";

/// CLI configuration loaded from config.huml file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Name of the default profile to use.
    pub default_profile: String,
    /// Map of profile name to profile configuration.
    pub profiles: HashMap<String, Profile>,
}

/// A named profile pointing at a Flutter project.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Flutter project root (the directory holding `pubspec.yaml`).
    pub project: PathBuf,
    /// Signing properties file name inside `android/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_file: Option<String>,
}

/// Resolved configuration after applying priority rules.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Flutter project root.
    pub project: PathBuf,
    /// Signing properties file name.
    pub properties_file: String,
}

impl ResolvedConfig {
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.project).with_properties_file(&self.properties_file)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "default".to_string(),
            Profile {
                project: PathBuf::from("."),
                properties_file: None,
            },
        );
        Self {
            default_profile: "default".to_string(),
            profiles,
        }
    }
}

/// Returns the default config file path (~/.signcfg/config.huml).
pub fn default_config_path() -> Result<PathBuf> {
    config_dir().map(|d| d.join("config.huml"))
}

/// Returns the config directory path (~/.signcfg).
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".signcfg"))
        .context("Could not determine home directory")
}

/// Returns the config file in use, honouring `SIGNCFG_CONFIG`.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var(CONFIG_ENV) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => default_config_path(),
    }
}

/// Load configuration from the config file.
///
/// Returns `Ok(None)` if the config file doesn't exist.
/// Returns an error if the file exists but is invalid.
pub fn load_config() -> Result<Option<CliConfig>> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let content =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let config: CliConfig = huml_rs::serde::from_str(&content)
        .with_context(|| format!("Invalid HUML in {}", path.display()))?;

    validate_config(&config)?;

    Ok(Some(config))
}

/// Validate that the config has at least one profile and the default profile exists.
fn validate_config(config: &CliConfig) -> Result<()> {
    if config.profiles.is_empty() {
        bail!("Config file must contain at least one profile");
    }

    if !config.profiles.contains_key(&config.default_profile) {
        bail!(
            "Default profile '{}' not found in profiles",
            config.default_profile
        );
    }

    for (name, profile) in &config.profiles {
        if profile.project.as_os_str().is_empty() {
            bail!("Profile '{}' has an empty project path", name);
        }
        if matches!(profile.properties_file.as_deref(), Some("")) {
            bail!("Profile '{}' has an empty properties file name", name);
        }
    }

    Ok(())
}

/// Resolve configuration by applying priority rules.
///
/// Priority order (highest to lowest):
/// 1. CLI flags (`--project`)
/// 2. Environment variables (`SIGNCFG_PROJECT`)
/// 3. Config file profile
/// 4. Defaults (current directory, `key.properties`)
pub fn resolve_config(
    profile_flag: Option<&str>,
    project_flag: Option<&std::path::Path>,
    file_config: Option<CliConfig>,
) -> Result<ResolvedConfig> {
    let mut project = PathBuf::from(".");
    let mut properties_file = KEY_PROPERTIES_FILE.to_string();

    // Apply config file (lowest priority)
    if let Some(config) = file_config {
        let profile_name = profile_flag.unwrap_or(&config.default_profile);
        if let Some(profile) = config.profiles.get(profile_name) {
            project = profile.project.clone();
            if let Some(name) = &profile.properties_file {
                properties_file = name.clone();
            }
        } else if profile_flag.is_some() {
            bail!(
                "Profile '{}' not found. Run 'signcfg config show' to see available profiles.",
                profile_name
            );
        }
    } else if let Some(requested_profile) = profile_flag {
        if requested_profile != "default" {
            bail!(
                "Profile '{}' not found. No config file exists. Run 'signcfg config init' to create one.",
                requested_profile
            );
        }
    }

    // Apply environment variable (medium priority)
    if let Ok(env_project) = std::env::var(PROJECT_ENV) {
        if !env_project.is_empty() {
            project = PathBuf::from(env_project);
        }
    }

    // Apply CLI flags (highest priority)
    if let Some(p) = project_flag {
        project = p.to_path_buf();
    }

    Ok(ResolvedConfig {
        project,
        properties_file,
    })
}
