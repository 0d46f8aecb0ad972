use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use signcfg_core::BuildVariant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    config::{handle_config_command, ConfigCommands},
    key_properties::InitArgs,
};

#[derive(Parser)]
#[command(name = "signcfg")]
#[command(about = "Resolve Android release signing for Flutter projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration profile to use
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Flutter project root (overrides profile and SIGNCFG_PROJECT)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which signing config each build variant uses
    Resolve {
        /// Only resolve this variant (debug or release)
        #[arg(long)]
        variant: Option<BuildVariant>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Print passwords instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Write android/key.properties for release signing
    Init(InitArgs),

    /// Resolve signing and validate the keystore with keytool
    Verify,

    /// Remove key.properties and keystores written by init
    Clean,

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "signcfg=debug,signcfg_core=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Config commands don't need a project, handle separately
    if let Commands::Config(cmd) = cli.command {
        return handle_config_command(cmd);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config file: {:#}", e);
        None
    });

    let resolved = config::resolve_config(cli.profile.as_deref(), cli.project.as_deref(), file_config)?;
    let layout = resolved.layout();
    tracing::debug!("Using project {}", layout.root().display());

    match cli.command {
        Commands::Resolve {
            variant,
            json,
            show_secrets,
        } => commands::resolve::resolve(&layout, variant, json, show_secrets)?,
        Commands::Init(args) => commands::key_properties::init(&layout, args).await?,
        Commands::Verify => commands::resolve::verify(&layout).await?,
        Commands::Clean => commands::key_properties::clean(&layout).await?,
        Commands::Config(_) => unreachable!(), // Handled above
    }

    Ok(())
}
