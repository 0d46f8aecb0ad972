//! `signcfg init` and `signcfg clean`: manage android/key.properties.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Args;
use console::style;
use signcfg_core::signing::{
    cleanup_signing, detect_keystore_type, ensure_key_properties_writable, write_key_properties,
    write_keystore,
};
use signcfg_core::ProjectLayout;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to an existing keystore file
    #[arg(long, conflicts_with = "keystore_env", required_unless_present = "keystore_env")]
    pub keystore: Option<PathBuf>,

    /// Environment variable holding a base64-encoded keystore
    #[arg(long)]
    pub keystore_env: Option<String>,

    /// Key alias inside the keystore
    #[arg(long)]
    pub alias: String,

    /// Keystore password
    #[arg(long, env = "SIGNCFG_STORE_PASSWORD", hide_env_values = true)]
    pub store_password: String,

    /// Key password (defaults to the keystore password)
    #[arg(long, env = "SIGNCFG_KEY_PASSWORD", hide_env_values = true)]
    pub key_password: Option<String>,

    /// Overwrite an existing properties file
    #[arg(long)]
    pub force: bool,
}

/// Write key.properties (and the keystore when it comes from the environment).
pub async fn init(layout: &ProjectLayout, args: InitArgs) -> Result<()> {
    // Checked before a keystore is materialised so a refused init leaves the
    // existing key.properties and its keystore untouched
    ensure_key_properties_writable(layout, args.force)
        .context("Failed to write key.properties")?;

    let keystore_path = match (&args.keystore, &args.keystore_env) {
        (Some(path), _) => {
            if !path.is_file() {
                bail!("Keystore file not found: {}", path.display());
            }
            std::fs::canonicalize(path)
                .with_context(|| format!("Failed to resolve {}", path.display()))?
        }
        (None, Some(var)) => {
            let encoded = std::env::var(var)
                .with_context(|| format!("Environment variable {} is not set", var))?;
            let data = BASE64
                .decode(encoded.trim())
                .with_context(|| format!("{} does not contain valid base64", var))?;
            let keystore_type = detect_keystore_type(&data);
            let path = write_keystore(layout, &data, keystore_type)
                .await
                .context("Failed to write keystore")?;
            println!(
                "{} Wrote {} keystore to {}",
                style("✓").green().bold(),
                keystore_type,
                path.display()
            );
            path
        }
        (None, None) => bail!("Either --keystore or --keystore-env is required"),
    };

    let key_password = args.key_password.as_deref().unwrap_or(&args.store_password);
    let path = write_key_properties(
        layout,
        &keystore_path,
        &args.store_password,
        &args.alias,
        key_password,
        args.force,
    )
    .await
    .context("Failed to write key.properties")?;

    println!("{} Wrote {}", style("✓").green().bold(), path.display());
    println!(
        "  {}",
        style("Release builds now sign with this keystore. Run 'signcfg verify' to check it.").dim()
    );

    Ok(())
}

/// Remove key.properties and any keystore written by `init`.
pub async fn clean(layout: &ProjectLayout) -> Result<()> {
    cleanup_signing(layout)
        .await
        .context("Failed to clean up signing files")?;
    println!("{} Removed signing files from {}", style("✓").green().bold(), layout.root().display());
    Ok(())
}
