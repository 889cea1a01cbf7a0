//! # Azure Resource Cleanup
//!
//! Discovers leftover Azure resources by name substring and deletes them
//! best-effort through the `az` CLI.
//!
//! Failed test runs leave provisioned resources behind when the normal
//! teardown path never executes. This module finds them with `az resource
//! list`, orders the deletions so child resource types go before their
//! parents, and issues `az resource delete --no-wait` per resource. A single
//! failed deletion never aborts the batch; missing tooling or a missing
//! `az login` session aborts immediately.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub mod az;

/// Errors that abort a cleanup run before any deletion is attempted.
///
/// Per-resource deletion failures are not represented here; they are counted
/// in [`CleanupSummary::failed`] and the batch continues.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("az CLI not found on PATH. Install it from https://aka.ms/azure-cli")]
    AzNotFound,

    #[error("not logged in to Azure ({0}). Run 'az login' first")]
    NotAuthenticated(String),

    #[error("{command} failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("failed to parse az output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// An Azure resource as reported by `az resource list`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AzureResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "resourceGroup", default)]
    pub resource_group: String,
}

/// Outcome counters for one cleanup batch.
///
/// `initiated` counts deletions accepted by Azure, not completed ones;
/// `--no-wait` deletions finish asynchronously after the process exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    pub initiated: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// List all resources in the subscription whose name contains `name_filter`.
///
/// `subscription` narrows the query when provided; otherwise the CLI's
/// current default subscription is used.
pub async fn discover_resources(
    name_filter: &str,
    subscription: Option<&str>,
) -> Result<Vec<AzureResource>, CleanupError> {
    let mut args = vec!["resource", "list"];
    if let Some(sub) = subscription {
        args.extend_from_slice(&["--subscription", sub]);
    }

    let raw = az::az_json(&args).await?;
    let all: Vec<AzureResource> = serde_json::from_str(&raw)?;

    let mut matched = filter_by_name(all, name_filter);
    sort_for_deletion(&mut matched);
    Ok(matched)
}

/// Keep only resources whose name contains the filter substring.
pub fn filter_by_name(resources: Vec<AzureResource>, name_filter: &str) -> Vec<AzureResource> {
    resources
        .into_iter()
        .filter(|r| r.name.contains(name_filter))
        .collect()
}

/// Order resources for deletion: resource type descending, name ascending
/// within a type.
///
/// Reverse type order puts longer, more specific child types (for example
/// `Microsoft.Network/virtualNetworks/subnets`) ahead of their parents, which
/// reduces "resource in use" failures without needing a dependency graph.
pub fn sort_for_deletion(resources: &mut [AzureResource]) {
    resources.sort_by(|a, b| {
        b.resource_type
            .cmp(&a.resource_type)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Delete each resource with `az resource delete --no-wait`.
///
/// Best-effort: failures are logged and counted, never fatal. Resources that
/// disappeared between discovery and deletion count as skipped.
pub async fn delete_resources(resources: &[AzureResource]) -> CleanupSummary {
    let mut summary = CleanupSummary::default();

    for resource in resources {
        info!(
            "Deleting {} '{}' (resource group {})",
            resource.resource_type, resource.name, resource.resource_group
        );

        match az::az_run(&["resource", "delete", "--ids", &resource.id, "--no-wait"]).await {
            Ok(()) => summary.initiated += 1,
            Err(detail) if is_not_found(&detail) => {
                info!("'{}' already gone, skipping", resource.name);
                summary.skipped += 1;
            }
            Err(detail) => {
                warn!("Failed to delete '{}': {}", resource.name, detail);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Whether an `az` error message means the resource no longer exists.
fn is_not_found(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("resourcenotfound")
        || lower.contains("notfound")
        || lower.contains("could not be found")
        || lower.contains("was not found")
}
