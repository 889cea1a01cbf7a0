//! # Manifest Parsing
//!
//! Extracts resource names from the generated `aro.yaml` manifest and the
//! current context from kubeconfig files.
//!
//! The generation script emits a multi-document YAML stream containing the
//! Cluster, control plane (AROControlPlane / ROSAControlPlane), and
//! MachinePool resources. The names recorded there are authoritative — they
//! may differ from the locally configured workload cluster name — so assertion
//! code reads them back from disk rather than trusting configuration. All
//! functions here return `Result`; configuration accessors absorb errors into
//! synthesized-name fallbacks for phases that run before generation.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The subset of a Kubernetes resource document the extractor needs.
#[derive(Debug, Deserialize)]
struct ResourceDoc {
    kind: String,
    metadata: ResourceMetadata,
}

#[derive(Debug, Deserialize)]
struct ResourceMetadata {
    name: String,
}

/// Scan a multi-document manifest for the first resource whose kind satisfies
/// `matches`, returning its `metadata.name`.
fn extract_name_by_kind(
    path: &Path,
    description: &str,
    matches: impl Fn(&str) -> bool,
) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

    // Documents that are not Kubernetes resources (comments, helm hooks) are
    // skipped rather than failing the scan.
    for doc in content.split("\n---") {
        let doc = doc.trim();
        if doc.is_empty() || doc == "---" {
            continue;
        }
        if let Ok(resource) = serde_yaml::from_str::<ResourceDoc>(doc) {
            if matches(&resource.kind) && !resource.metadata.name.is_empty() {
                return Ok(resource.metadata.name);
            }
        }
    }

    Err(anyhow::anyhow!(
        "No {} resource found in {}",
        description,
        path.display()
    ))
}

/// Name of the Cluster resource in the generated manifest.
pub fn extract_cluster_name(path: &Path) -> Result<String> {
    extract_name_by_kind(path, "Cluster", |kind| kind == "Cluster")
}

/// Name of the control plane resource (AROControlPlane or ROSAControlPlane).
pub fn extract_control_plane_name(path: &Path) -> Result<String> {
    extract_name_by_kind(path, "control plane", |kind| {
        kind != "ControlPlane" && kind.ends_with("ControlPlane")
    })
}

/// Name of the MachinePool resource in the generated manifest.
pub fn extract_machine_pool_name(path: &Path) -> Result<String> {
    extract_name_by_kind(path, "MachinePool", |kind| kind == "MachinePool")
}

/// The subset of a kubeconfig file the context extractor needs.
#[derive(Debug, Deserialize)]
struct Kubeconfig {
    #[serde(rename = "current-context", default)]
    current_context: String,
}

/// Extract `current-context` from a kubeconfig file.
pub fn extract_current_context(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read kubeconfig: {}", path.display()))?;

    let kubeconfig: Kubeconfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse kubeconfig: {}", path.display()))?;

    if kubeconfig.current_context.is_empty() {
        return Err(anyhow::anyhow!(
            "kubeconfig {} has no current-context",
            path.display()
        ));
    }
    Ok(kubeconfig.current_context)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARO_MANIFEST: &str = r"---
apiVersion: cluster.x-k8s.io/v1beta1
kind: Cluster
metadata:
  name: generated-cluster
  namespace: capz-test-ns
spec:
  controlPlaneRef:
    kind: AROControlPlane
    name: generated-cluster-cp
---
apiVersion: controlplane.cluster.x-k8s.io/v1beta1
kind: AROControlPlane
metadata:
  name: generated-cluster-cp
  namespace: capz-test-ns
spec:
  version: '4.20'
---
apiVersion: cluster.x-k8s.io/v1beta1
kind: MachinePool
metadata:
  name: generated-cluster-workers
  namespace: capz-test-ns
spec:
  replicas: 2
";

    fn write_manifest(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aro.yaml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn extracts_cluster_name() {
        let (_dir, path) = write_manifest(ARO_MANIFEST);
        assert_eq!(extract_cluster_name(&path).unwrap(), "generated-cluster");
    }

    #[test]
    fn extracts_control_plane_name() {
        let (_dir, path) = write_manifest(ARO_MANIFEST);
        assert_eq!(
            extract_control_plane_name(&path).unwrap(),
            "generated-cluster-cp"
        );
    }

    #[test]
    fn extracts_machine_pool_name() {
        let (_dir, path) = write_manifest(ARO_MANIFEST);
        assert_eq!(
            extract_machine_pool_name(&path).unwrap(),
            "generated-cluster-workers"
        );
    }

    #[test]
    fn rosa_control_plane_kind_also_matches() {
        let manifest = "kind: ROSAControlPlane\nmetadata:\n  name: rosa-cp\n";
        let (_dir, path) = write_manifest(manifest);
        assert_eq!(extract_control_plane_name(&path).unwrap(), "rosa-cp");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_cluster_name(&dir.path().join("aro.yaml")).is_err());
    }

    #[test]
    fn missing_kind_is_an_error() {
        let (_dir, path) = write_manifest("kind: Secret\nmetadata:\n  name: creds\n");
        assert!(extract_cluster_name(&path).is_err());
        assert!(extract_machine_pool_name(&path).is_err());
    }

    #[test]
    fn non_resource_documents_are_skipped() {
        let manifest = "# credentials header\nfoo: bar\n---\nkind: Cluster\nmetadata:\n  name: c1\n";
        let (_dir, path) = write_manifest(manifest);
        assert_eq!(extract_cluster_name(&path).unwrap(), "c1");
    }

    #[test]
    fn extracts_kubeconfig_current_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kubeconfig");
        std::fs::write(
            &path,
            "apiVersion: v1\nkind: Config\ncurrent-context: mgmt-cluster\nclusters: []\n",
        )
        .unwrap();
        assert_eq!(extract_current_context(&path).unwrap(), "mgmt-cluster");
    }

    #[test]
    fn kubeconfig_without_context_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kubeconfig");
        std::fs::write(&path, "apiVersion: v1\nkind: Config\nclusters: []\n").unwrap();
        assert!(extract_current_context(&path).is_err());
    }
}
