//! # Infrastructure Providers
//!
//! Closed set of infrastructure provider definitions for the test harness.
//!
//! Exactly two providers exist: Azure-backed ARO (CAPZ/ASO) and AWS-backed
//! ROSA (CAPA). Each carries the controllers, webhooks, and credential secret
//! the deployment validation phases check, plus the Helm charts, CLI tools,
//! and repository scripts it needs. The set is small and fixed, so consumers
//! match exhaustively on [`ProviderKind`] rather than going through a plugin
//! interface.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

mod aws;
mod azure;

/// The selected infrastructure provider kind.
///
/// Parsed from the `INFRA_PROVIDER` environment variable. Unrecognized values
/// normalize to [`ProviderKind::Aro`] with a warning, preserving the harness's
/// tolerance for partially-configured runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Azure Red Hat OpenShift via CAPZ + Azure Service Operator.
    Aro,
    /// Red Hat OpenShift Service on AWS via CAPA.
    Rosa,
}

impl ProviderKind {
    /// Parse a provider selection, normalizing unknown values to `Aro`.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "rosa" => Self::Rosa,
            "aro" | "" => Self::Aro,
            other => {
                warn!(
                    "Unknown INFRA_PROVIDER '{}', falling back to 'aro'",
                    other
                );
                Self::Aro
            }
        }
    }

    /// Provider identifier as used in configuration and `has_provider` checks.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aro => "aro",
            Self::Rosa => "rosa",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    /// Infallible: unknown selections normalize to `Aro`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_or_default(s))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controller deployment whose readiness the harness validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSpec {
    /// Human-readable name (e.g., "CAPZ", "ASO").
    pub display_name: String,
    /// Kubernetes namespace (e.g., "capz-system").
    pub namespace: String,
    /// Deployment name (e.g., "capz-controller-manager").
    pub deployment_name: String,
    /// Label selector for the controller's pods.
    pub pod_selector: String,
    /// Readiness timeout; `None` means the shared controller default.
    pub timeout: Option<Duration>,
}

/// An admission webhook service whose reachability the harness validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSpec {
    /// Human-readable name (e.g., "CAPZ", "ASO").
    pub display_name: String,
    /// Kubernetes namespace.
    pub namespace: String,
    /// Kubernetes service name (e.g., "capz-webhook-service").
    pub service_name: String,
    /// Service port.
    pub port: u16,
}

/// A provider's credential secret and the conditions under which it is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecretSpec {
    /// Secret name (e.g., "aso-controller-settings").
    pub name: String,
    /// Namespace containing the secret.
    pub namespace: String,
    /// Fields that must be present and non-empty in the secret.
    pub required_fields: Vec<String>,
    /// Env vars that must be set for this check to run (skip if missing).
    pub required_env_vars: Vec<String>,
}

/// An infrastructure provider's full validation surface.
///
/// Built once per test process by [`InfraProvider::azure`] or
/// [`InfraProvider::aws`] with the resolved controller namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraProvider {
    /// Provider identifier ("aro" or "rosa").
    pub name: String,
    /// Controllers to validate, in readiness-check order.
    pub controllers: Vec<ControllerSpec>,
    /// Webhooks to validate.
    pub webhooks: Vec<WebhookSpec>,
    /// Credential secret, if the provider requires one.
    pub credential_secret: Option<CredentialSecretSpec>,
    /// Chart arguments for deploy-charts.sh.
    pub deployment_charts: Vec<String>,
    /// MCE component name used when enabling this provider inside a
    /// MultiClusterEngine add-on.
    pub mce_component_name: String,
    /// CLI tools this provider needs on PATH (e.g., "az", "aws").
    pub required_tools: Vec<String>,
    /// Repo-relative scripts this provider needs (validated before deployment).
    pub required_scripts: Vec<String>,
}

impl InfraProvider {
    /// Build the provider definition for the given kind, with all namespaced
    /// descriptors placed in `namespace`.
    pub fn for_kind(kind: ProviderKind, namespace: &str) -> Self {
        match kind {
            ProviderKind::Aro => Self::azure(namespace),
            ProviderKind::Rosa => Self::aws(namespace),
        }
    }
}
