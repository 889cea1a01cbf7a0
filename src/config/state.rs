//! # Deployment State
//!
//! Read-only view of the `.deployment-state.json` file written by the YAML
//! generation phase.
//!
//! Test phases run as separate processes (one per make target), so the
//! namespace chosen during generation has to be recoverable by later phases.
//! The state file under the repository directory is how that handoff happens;
//! this module never writes it.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::constants::DEPLOYMENT_STATE_FILE;

/// Recognized fields of the deployment-state file. Unknown fields are ignored
/// so newer setup code can extend the file without breaking older phases.
#[derive(Debug, Deserialize)]
struct DeploymentState {
    #[serde(default)]
    workload_cluster_namespace: String,
}

/// Read the workload-cluster namespace recorded by a previous run, if any.
///
/// Returns `None` when the file is missing, unreadable, malformed, or records
/// an empty namespace; resuming is best-effort by design.
pub fn read_workload_cluster_namespace(repo_dir: &Path) -> Option<String> {
    let state_path = repo_dir.join(DEPLOYMENT_STATE_FILE);
    let data = std::fs::read_to_string(&state_path).ok()?;

    match serde_json::from_str::<DeploymentState>(&data) {
        Ok(state) if !state.workload_cluster_namespace.is_empty() => {
            debug!(
                "Resuming workload cluster namespace '{}' from {}",
                state.workload_cluster_namespace,
                state_path.display()
            );
            Some(state.workload_cluster_namespace)
        }
        Ok(_) => None,
        Err(e) => {
            debug!(
                "Ignoring malformed deployment state at {}: {}",
                state_path.display(),
                e
            );
            None
        }
    }
}
