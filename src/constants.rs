//! # Constants
//!
//! Shared defaults and well-known resource names used throughout the harness.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

use std::time::Duration;

/// Default timeout for control plane deployment.
pub const DEFAULT_DEPLOYMENT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Default timeout for the ASO controller manager to become ready.
///
/// ASO may take longer than other controllers due to its CRD initialization
/// sequence: scanning existing CRDs, applying missing ones, and restarting to
/// pick up new CRDs.
pub const DEFAULT_ASO_CONTROLLER_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default timeout for waiting after MCE component enablement.
///
/// MCE components need time to deploy controllers, pull images, and initialize.
pub const DEFAULT_MCE_ENABLEMENT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Default timeout for Helm install operations (e.g., cert-manager installation
/// during Kind cluster setup).
pub const DEFAULT_HELM_INSTALL_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default timeout for waiting for a controller to become ready.
pub const DEFAULT_CONTROLLER_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default user identifier for CAPZ resources.
///
/// Used in the cluster name prefix (resource group naming) and the user field.
pub const DEFAULT_CAPZ_USER: &str = "rcapd";

/// Default deployment environment identifier.
pub const DEFAULT_DEPLOYMENT_ENV: &str = "stage";

/// Namespace shared by all controllers when running inside a MultiClusterEngine
/// add-on (USE_K8S=true) instead of per-provider namespaces.
pub const MCE_NAMESPACE: &str = "multicluster-engine";

/// MCE component name for CAPI core, as used in `mce.spec.overrides.components`.
pub const MCE_COMPONENT_CAPI: &str = "cluster-api";

// CAPI core constants (provider-independent)

/// CAPI core controller deployment name.
pub const CAPI_CONTROLLER_DEPLOYMENT: &str = "capi-controller-manager";

/// CAPI core webhook service name.
pub const CAPI_WEBHOOK_SERVICE: &str = "capi-webhook-service";

/// CAPI core webhook service port.
pub const CAPI_WEBHOOK_PORT: u16 = 443;

/// Label selector for CAPI core pods.
pub const CAPI_POD_SELECTOR: &str = "cluster.x-k8s.io/provider=cluster-api";

/// Helm chart argument for CAPI core, passed to deploy-charts.sh.
pub const CAPI_DEPLOYMENT_CHART: &str = "cluster-api";

/// Name of the deployment-state file written under the repository directory by
/// the YAML generation phase and read back by later phases.
pub const DEPLOYMENT_STATE_FILE: &str = ".deployment-state.json";
