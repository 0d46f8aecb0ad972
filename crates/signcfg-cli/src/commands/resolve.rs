//! `signcfg resolve` and `signcfg verify`.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use signcfg_core::models::{debug_credentials, SigningSummary};
use signcfg_core::project::{detect_flutter_project, AndroidModule};
use signcfg_core::signing::validate_keystore;
use signcfg_core::{resolve_project_signing, BuildVariant, ProjectLayout, SigningIdentity};

#[derive(Debug, Serialize)]
struct ResolveReport {
    project: String,
    properties_file: String,
    properties_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<AndroidModule>,
    signing: Vec<SigningSummary>,
}

/// Resolve and print the signing identity of each requested variant.
pub fn resolve(
    layout: &ProjectLayout,
    variant: Option<BuildVariant>,
    json: bool,
    show_secrets: bool,
) -> Result<()> {
    let report = build_report(layout, variant, show_secrets)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn build_report(
    layout: &ProjectLayout,
    variant: Option<BuildVariant>,
    show_secrets: bool,
) -> Result<ResolveReport> {
    let signing = resolve_project_signing(layout).with_context(|| {
        format!(
            "Failed to resolve signing for {}",
            layout.root().display()
        )
    })?;

    let variants = match variant {
        Some(v) => vec![v],
        None => BuildVariant::ALL.to_vec(),
    };

    let android = if detect_flutter_project(layout.root()) {
        match AndroidModule::for_project(layout.root()) {
            Ok(module) => Some(module),
            Err(e) => {
                tracing::warn!("Could not read Android module settings: {}", e);
                None
            }
        }
    } else {
        None
    };

    let properties_path = layout.key_properties_path();
    Ok(ResolveReport {
        project: layout.root().display().to_string(),
        properties_file: properties_path.display().to_string(),
        properties_present: properties_path.exists(),
        android,
        signing: variants
            .iter()
            .map(|v| signing.for_variant(*v).summary(*v, show_secrets))
            .collect(),
    })
}

fn print_report(report: &ResolveReport) {
    println!("{} {}", style("Project:").dim(), report.project);
    println!(
        "{} {} ({})",
        style("Properties:").dim(),
        report.properties_file,
        if report.properties_present { "found" } else { "not found" }
    );

    if let Some(android) = &report.android {
        println!("{} {}", style("Application:").dim(), android.application_id);
        if let Some(version) = &android.version {
            println!("{} {} ({})", style("Version:").dim(), version.name, version.code);
        }
    }
    println!();

    for summary in &report.signing {
        println!(
            "{} {} signing config",
            style(format!("{:<8}", summary.variant.as_str())).bold(),
            style(&summary.signing_config).cyan()
        );
        if let Some(alias) = &summary.key_alias {
            println!("  Key alias:      {}", alias);
        }
        if let Some(store) = &summary.store_file {
            println!("  Keystore:       {}", store);
        }
        if let Some(password) = &summary.store_password {
            println!("  Store password: {}", password);
        }
        if let Some(password) = &summary.key_password {
            println!("  Key password:   {}", password);
        }
    }

    if !report.properties_present {
        println!();
        println!(
            "{}",
            style("Release builds fall back to debug signing. Run 'signcfg init' to configure a keystore.")
                .dim()
        );
    }
}

/// Resolve release signing and check the keystore opens with `keytool`.
pub async fn verify(layout: &ProjectLayout) -> Result<()> {
    let signing = resolve_project_signing(layout).with_context(|| {
        format!(
            "Failed to resolve signing for {}",
            layout.root().display()
        )
    })?;

    match signing.release() {
        SigningIdentity::Release(credentials) => {
            let info = validate_keystore(credentials)
                .await
                .context("Release keystore validation failed")?;
            println!(
                "{} Release keystore OK ({}, alias '{}')",
                style("✓").green().bold(),
                info.keystore_type,
                credentials.key_alias()
            );
        }
        SigningIdentity::Debug => {
            println!(
                "{} No {} found, release builds use debug signing",
                style("!").yellow(),
                layout.key_properties_path().display()
            );
            match debug_credentials() {
                Some(debug) if debug.store_file().is_file() => {
                    let info = validate_keystore(&debug)
                        .await
                        .context("Debug keystore validation failed")?;
                    println!(
                        "{} Debug keystore OK ({}, {})",
                        style("✓").green().bold(),
                        info.keystore_type,
                        debug.store_file().display()
                    );
                }
                _ => println!(
                    "  {}",
                    style("Debug keystore not created yet; Gradle generates it on first build.").dim()
                ),
            }
        }
    }

    Ok(())
}
