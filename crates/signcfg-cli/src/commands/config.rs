//! `signcfg config` commands for managing CLI configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::config::{config_path, load_config, CliConfig, Profile, CONFIG_ENV};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create a new config file with a default profile
    Init {
        /// Flutter project root for the default profile
        #[arg(long)]
        project: Option<PathBuf>,

        /// Signing properties file name inside android/
        #[arg(long)]
        properties_file: Option<String>,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Set profile values (creates profile if it doesn't exist)
    Set {
        /// Profile name to update (defaults to "default")
        #[arg(long, default_value = "default")]
        profile: String,

        /// Flutter project root
        #[arg(long)]
        project: Option<PathBuf>,

        /// Signing properties file name inside android/
        #[arg(long)]
        properties_file: Option<String>,

        /// Set this profile as the default
        #[arg(long)]
        default: bool,
    },

    /// Show current configuration
    Show,

    /// Show config file path
    Path,
}

pub fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init {
            project,
            properties_file,
            force,
        } => init_config(project, properties_file, force),
        ConfigCommands::Set {
            profile,
            project,
            properties_file,
            default,
        } => set_config(profile, project, properties_file, default),
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_path(),
    }
}

/// Create a new config file.
fn init_config(project: Option<PathBuf>, properties_file: Option<String>, force: bool) -> Result<()> {
    let path = config_path()?;

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let mut profiles = HashMap::new();
    profiles.insert(
        "default".to_string(),
        Profile {
            project: project.unwrap_or_else(|| PathBuf::from(".")),
            properties_file,
        },
    );
    let config = CliConfig {
        default_profile: "default".to_string(),
        profiles,
    };

    write_config(&path, &config)?;

    println!("Created config file at {}", path.display());
    println!();
    println!("To add more projects:");
    println!("  signcfg config set --profile store --project ~/src/store_app");

    Ok(())
}

/// Update profile values.
fn set_config(
    profile_name: String,
    project: Option<PathBuf>,
    properties_file: Option<String>,
    set_default: bool,
) -> Result<()> {
    let path = config_path()?;

    let mut config = load_config()?.unwrap_or_else(|| CliConfig {
        default_profile: "default".to_string(),
        profiles: HashMap::new(),
    });

    let profile = config
        .profiles
        .entry(profile_name.clone())
        .or_insert_with(|| Profile {
            project: PathBuf::from("."),
            properties_file: None,
        });

    let mut updated = false;
    if let Some(p) = project {
        profile.project = p;
        updated = true;
    }
    if let Some(f) = properties_file {
        profile.properties_file = Some(f);
        updated = true;
    }
    if set_default && config.default_profile != profile_name {
        config.default_profile = profile_name.clone();
        updated = true;
    }

    if !updated && !set_default {
        println!("No changes specified. Use --project, --properties-file, or --default.");
        return Ok(());
    }

    if !config.profiles.contains_key(&config.default_profile) {
        config.default_profile = profile_name.clone();
    }

    write_config(&path, &config)?;

    println!("Updated profile '{}'", profile_name);
    if set_default {
        println!("Set '{}' as default profile", profile_name);
    }

    Ok(())
}

/// Display current configuration.
fn show_config() -> Result<()> {
    let path = config_path()?;

    let config = match load_config()? {
        Some(c) => c,
        None => {
            println!("No config file found at {}", path.display());
            println!();
            println!("Using defaults:");
            println!("  Project:    .");
            println!("  Properties: key.properties");
            println!();
            println!("Run 'signcfg config init' to create a config file.");
            return Ok(());
        }
    };

    println!("Config file: {}", path.display());
    println!("Default profile: {}", config.default_profile);
    println!();

    let mut names: Vec<_> = config.profiles.keys().collect();
    names.sort();

    for name in names {
        let profile = &config.profiles[name];
        let marker = if name == &config.default_profile { " *" } else { "" };

        println!("[{}]{}", name, marker);
        println!("  Project:    {}", profile.project.display());
        println!(
            "  Properties: {}",
            profile.properties_file.as_deref().unwrap_or("key.properties")
        );
        println!();
    }

    Ok(())
}

/// Show the config file path.
fn show_path() -> Result<()> {
    println!("{}", config_path()?.display());

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        println!();
        println!("Note: {} is set to: {}", CONFIG_ENV, env_path);
    }

    Ok(())
}

/// Write config to file with HUML formatting and owner-only permissions.
fn write_config(path: &Path, config: &CliConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
            #[cfg(unix)]
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }

    let content = serialize_to_huml(config);
    fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Serialize config to HUML format.
///
/// huml-rs only deserializes, so the document is generated by hand.
fn serialize_to_huml(config: &CliConfig) -> String {
    let mut output = String::new();

    output.push_str("%HUML v0.2.0\n");
    output.push_str(&format!("default_profile: \"{}\"\n", config.default_profile));
    output.push('\n');
    output.push_str("profiles::\n");

    // Sorted for deterministic output
    let mut profile_names: Vec<_> = config.profiles.keys().collect();
    profile_names.sort();

    for name in profile_names {
        let profile = &config.profiles[name];
        output.push_str(&format!("  {}::\n", name));
        output.push_str(&format!(
            "    project: \"{}\"\n",
            escape_huml(&profile.project.display().to_string())
        ));
        if let Some(ref file) = profile.properties_file {
            output.push_str(&format!("    properties_file: \"{}\"\n", escape_huml(file)));
        }
        output.push('\n');
    }

    output
}

fn escape_huml(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
