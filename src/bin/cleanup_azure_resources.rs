//! # cleanup-azure-resources
//!
//! Deletes leftover Azure resources from failed test runs by name substring.
//!
//! Discovery and deletion go through the `az` CLI, so the tool sees exactly
//! the resources the deployment scripts created. Deletions are issued with
//! `--no-wait` and complete asynchronously after the tool exits.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use capi_installer_harness::cleanup;

/// Delete Azure resources whose name contains a given substring.
#[derive(Debug, Parser)]
#[command(name = "cleanup-azure-resources", version, about)]
struct Args {
    /// Name substring to match (e.g. "rcapd-stage")
    #[arg(long)]
    prefix: String,

    /// List matching resources without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    force: bool,

    /// Azure subscription to search (defaults to the current az subscription)
    #[arg(long)]
    subscription: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capi_installer_harness=info,cleanup_azure_resources=info".into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "cleanup-azure-resources (built {} from {})",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    cleanup::az::check_az_installed()?;
    cleanup::az::check_az_authenticated().await?;

    info!("Searching for resources matching '{}'", args.prefix);
    let resources = cleanup::discover_resources(&args.prefix, args.subscription.as_deref())
        .await
        .context("Resource discovery failed")?;

    if resources.is_empty() {
        info!("No resources matching '{}' found, nothing to do", args.prefix);
        return Ok(());
    }

    println!("Found {} matching resource(s):", resources.len());
    for resource in &resources {
        println!(
            "  {} ({}, resource group {})",
            resource.name, resource.resource_type, resource.resource_group
        );
    }

    if args.dry_run {
        info!("Dry run, no resources deleted");
        return Ok(());
    }

    if !args.force && !confirm(&args.prefix)? {
        info!("Aborted by user, no resources deleted");
        return Ok(());
    }

    let summary = cleanup::delete_resources(&resources).await;

    println!(
        "Cleanup finished: {} deletion(s) initiated, {} failed, {} skipped",
        summary.initiated, summary.failed, summary.skipped
    );
    println!("Note: deletions run asynchronously; resources may take a while to disappear.");

    if summary.failed > 0 {
        warn!(
            "{} resource(s) could not be deleted; re-run after the initiated deletions settle",
            summary.failed
        );
    }

    Ok(())
}

/// Interactive yes/no confirmation before a destructive batch.
fn confirm(prefix: &str) -> Result<bool> {
    print!("Delete all resources matching '{prefix}'? [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
