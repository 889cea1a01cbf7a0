//! # Harness Configuration
//!
//! Process-wide test configuration, built once per test process from
//! environment variables, an optional deployment-state file, and compiled-in
//! defaults.
//!
//! The configuration is immutable after construction. The two values that must
//! survive across *processes* (repository directory) or must be unique per
//! *run* but shared within a process (workload cluster namespace) are memoized
//! behind `OnceLock` statics: concurrent first access from parallel tests
//! computes each exactly once, and every later constructor call observes the
//! same value. Nothing here talks to a cluster or a cloud API; derived
//! accessors only re-read local files.
//!
//! No constructor or accessor returns an error. Malformed or missing optional
//! inputs degrade to documented defaults (warning logged for malformed
//! durations), so partially-completed multi-phase runs stay runnable.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use chrono::Local;
use tracing::warn;

use crate::constants::{
    CAPI_CONTROLLER_DEPLOYMENT, CAPI_DEPLOYMENT_CHART, CAPI_POD_SELECTOR, CAPI_WEBHOOK_PORT,
    CAPI_WEBHOOK_SERVICE, DEFAULT_ASO_CONTROLLER_TIMEOUT, DEFAULT_CAPZ_USER,
    DEFAULT_DEPLOYMENT_ENV, DEFAULT_DEPLOYMENT_TIMEOUT, DEFAULT_HELM_INSTALL_TIMEOUT,
    DEFAULT_MCE_ENABLEMENT_TIMEOUT, MCE_NAMESPACE,
};
use crate::manifest;
use crate::provider::{ControllerSpec, InfraProvider, ProviderKind, WebhookSpec};

pub mod duration;
pub mod env;
pub mod state;

use env::{env_is_true, env_opt, env_or};

/// Where a resolved configuration value came from.
///
/// Diagnostic only: callers always get a usable value, this just records
/// whether the fallback path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Explicit environment variable.
    Explicit,
    /// Recovered from the deployment-state file of a previous run.
    StateFile,
    /// Freshly generated for this run.
    Generated,
    /// Compiled-in default (including malformed-input fallback).
    Default,
}

static REPO_DIR: OnceLock<PathBuf> = OnceLock::new();
static WORKLOAD_CLUSTER_NAMESPACE: OnceLock<String> = OnceLock::new();

/// Resolve the repository directory (un-memoized).
///
/// `ARO_REPO_DIR` wins; otherwise a stable path under the system temp
/// directory. The path is deliberately not randomized so that sequential test
/// phases run via separate make targets find the same checkout.
fn resolve_repo_dir() -> (PathBuf, ValueSource) {
    match env_opt("ARO_REPO_DIR") {
        Some(dir) => (PathBuf::from(dir), ValueSource::Explicit),
        None => (
            std::env::temp_dir().join("cluster-api-installer-aro"),
            ValueSource::Default,
        ),
    }
}

/// The repository directory for this process, computed exactly once.
fn default_repo_dir() -> PathBuf {
    REPO_DIR.get_or_init(|| resolve_repo_dir().0).clone()
}

/// Resolve the workload-cluster namespace (un-memoized).
///
/// Priority:
/// 1. `WORKLOAD_CLUSTER_NAMESPACE` env var (explicit override for resume runs)
/// 2. Deployment-state file under `repo_dir` (auto-resume from a previous run)
/// 3. Freshly generated `{prefix}-{YYYYMMDD-HHMMSS}` using
///    `WORKLOAD_CLUSTER_NAMESPACE_PREFIX` (default "capz-test")
pub fn resolve_workload_cluster_namespace(repo_dir: &Path) -> (String, ValueSource) {
    if let Some(ns) = env_opt("WORKLOAD_CLUSTER_NAMESPACE") {
        return (ns, ValueSource::Explicit);
    }

    if let Some(ns) = state::read_workload_cluster_namespace(repo_dir) {
        return (ns, ValueSource::StateFile);
    }

    let prefix = env_or("WORKLOAD_CLUSTER_NAMESPACE_PREFIX", "capz-test");
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    (format!("{prefix}-{timestamp}"), ValueSource::Generated)
}

/// The workload-cluster namespace for this process, computed exactly once.
///
/// The namespace is passed as `$NAMESPACE` to the YAML generation script and
/// used for all subsequent resource checks, so every caller in the process
/// must observe the same value.
fn workload_cluster_namespace() -> String {
    WORKLOAD_CLUSTER_NAMESPACE
        .get_or_init(|| resolve_workload_cluster_namespace(&default_repo_dir()).0)
        .clone()
}

/// Resolve a controller namespace.
///
/// `USE_K8S=true` routes every controller to the shared MCE namespace;
/// otherwise the controller-specific env var wins, then the hard default.
fn controller_namespace(env_var: &str, default_ns: &str) -> String {
    if env_is_true("USE_K8S") {
        return MCE_NAMESPACE.to_string();
    }
    env_or(env_var, default_ns)
}

/// MCE auto-enablement: an explicit `MCE_AUTO_ENABLE` wins (literal "true"
/// enables, anything else disables); unset defaults to enabled only when an
/// external kubeconfig is in use.
fn resolve_mce_auto_enable(use_kubeconfig: Option<&PathBuf>) -> bool {
    match std::env::var("MCE_AUTO_ENABLE") {
        Ok(v) if !v.is_empty() => v == "true",
        _ => use_kubeconfig.is_some(),
    }
}

/// Process-wide test configuration.
///
/// Built by [`HarnessConfig::from_env`] at the start of each test process and
/// never mutated afterwards. Derived accessors recompute read-only views
/// (possibly from files on disk) rather than touching stored state.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Installer repository URL to clone.
    pub repo_url: String,
    /// Installer repository branch.
    pub repo_branch: String,
    /// Stable local checkout directory, shared across test phases.
    pub repo_dir: PathBuf,

    /// Name of the management cluster (Kind cluster name in Kind mode).
    pub management_cluster_name: String,
    /// Locally configured workload cluster name. The authoritative name may
    /// differ once the manifest has been generated; see
    /// [`HarnessConfig::provisioned_cluster_name`].
    pub workload_cluster_name: String,
    /// Passed as CS_CLUSTER_NAME to YAML generation; the resource group
    /// becomes `{cluster_name_prefix}-resgroup`.
    pub cluster_name_prefix: String,
    /// OpenShift version under test.
    pub ocp_version: String,
    /// Cloud region for the workload cluster.
    pub region: String,
    /// Azure subscription name, if provided.
    pub azure_subscription_name: String,
    /// Deployment environment identifier (part of the output directory name).
    pub environment: String,
    /// User identifier for CAPZ resources.
    pub capz_user: String,
    /// Namespace for workload cluster resources on the management cluster,
    /// unique per test run.
    pub workload_cluster_namespace: String,
    /// Namespace of the CAPI core controller.
    pub capi_namespace: String,
    /// Namespace of the selected provider's controllers (CAPZ/ASO or CAPA).
    pub provider_namespace: String,

    /// Path to an external kubeconfig. When set, the suite runs in external
    /// cluster mode: no Kind cluster is created, pre-installed controllers are
    /// validated, and the kubeconfig's current context is used.
    pub use_kubeconfig: Option<PathBuf>,
    /// Kind deployment mode (USE_KIND=true): create a local Kind management
    /// cluster with the CAPI/provider controllers.
    pub use_kind: bool,

    /// Path to the clusterctl binary.
    pub clusterctl_bin_path: String,
    /// Path to the installer repository's scripts directory.
    pub scripts_path: String,
    /// Path to the provider's YAML generation script.
    pub gen_script_path: String,

    /// Timeout for control plane deployment.
    pub deployment_timeout: Duration,
    /// Timeout for ASO controller readiness (always parsed, Azure only).
    pub aso_controller_timeout: Duration,
    /// Timeout handed to deploy scripts for Helm install operations.
    pub helm_install_timeout: Duration,

    /// Selected infrastructure provider kind.
    pub infra_provider_kind: ProviderKind,
    /// Active infrastructure providers (exactly one per run).
    pub infra_providers: Vec<InfraProvider>,

    /// Whether to automatically enable missing MCE components on an external
    /// cluster.
    pub mce_auto_enable: bool,
    /// How long to wait after MCE component enablement.
    pub mce_enablement_timeout: Duration,
}

impl HarnessConfig {
    /// Build the configuration from the process environment.
    ///
    /// Infallible by contract: every failure path resolves to a documented
    /// default. Side effect: when `USE_KUBECONFIG` is set and `USE_K8S` is
    /// not, `USE_K8S=true` is exported so that all controller namespace
    /// lookups route to the shared MCE namespace.
    pub fn from_env() -> Self {
        let use_kubeconfig = env_opt("USE_KUBECONFIG").map(PathBuf::from);

        // External clusters are MCE-managed; defaulting USE_K8S here keeps the
        // namespace resolution consistent for every later lookup in the
        // process, including shell invocations that read the variable.
        if use_kubeconfig.is_some() && std::env::var("USE_K8S").is_err() {
            std::env::set_var("USE_K8S", "true");
        }

        let infra_provider_kind = ProviderKind::parse_or_default(&env_or("INFRA_PROVIDER", "aro"));

        // Always parsed so the value is valid even when the check that uses it
        // is skipped for the selected provider.
        let aso_controller_timeout = duration::duration_from_env(
            "ASO_CONTROLLER_TIMEOUT",
            DEFAULT_ASO_CONTROLLER_TIMEOUT,
        );

        let (provider_namespace, infra_provider, default_gen_script) = match infra_provider_kind {
            ProviderKind::Rosa => {
                let ns = controller_namespace("CAPA_NAMESPACE", "capa-system");
                let provider = InfraProvider::aws(&ns);
                (ns, provider, "./scripts/rosa-hcp/gen.sh")
            }
            ProviderKind::Aro => {
                let ns = controller_namespace("CAPZ_NAMESPACE", "capz-system");
                let mut provider = InfraProvider::azure(&ns);
                for ctrl in &mut provider.controllers {
                    if ctrl.display_name == "ASO" {
                        ctrl.timeout = Some(aso_controller_timeout);
                    }
                }
                (ns, provider, "./scripts/aro-hcp/gen.sh")
            }
        };

        let capz_user = env_or("CAPZ_USER", DEFAULT_CAPZ_USER);
        let environment = env_or("DEPLOYMENT_ENV", DEFAULT_DEPLOYMENT_ENV);
        let mce_auto_enable = resolve_mce_auto_enable(use_kubeconfig.as_ref());

        Self {
            repo_url: env_or(
                "ARO_REPO_URL",
                "https://github.com/stolostron/cluster-api-installer",
            ),
            repo_branch: env_or("ARO_REPO_BRANCH", "main"),
            repo_dir: default_repo_dir(),

            management_cluster_name: env_or("MANAGEMENT_CLUSTER_NAME", "capz-tests-stage"),
            workload_cluster_name: env_or("WORKLOAD_CLUSTER_NAME", "capz-tests-cluster"),
            cluster_name_prefix: env_or(
                "CS_CLUSTER_NAME",
                &format!("{capz_user}-{environment}"),
            ),
            ocp_version: env_or("OCP_VERSION", "4.20"),
            region: env_or("REGION", "uksouth"),
            azure_subscription_name: env_or("AZURE_SUBSCRIPTION_NAME", ""),
            environment,
            capz_user,
            workload_cluster_namespace: workload_cluster_namespace(),
            capi_namespace: controller_namespace("CAPI_NAMESPACE", "capi-system"),
            provider_namespace,

            use_kubeconfig,
            use_kind: env_is_true("USE_KIND"),

            clusterctl_bin_path: env_or("CLUSTERCTL_BIN", "./bin/clusterctl"),
            scripts_path: env_or("SCRIPTS_PATH", "./scripts"),
            gen_script_path: env_or("GEN_SCRIPT_PATH", default_gen_script),

            deployment_timeout: duration::duration_from_env(
                "DEPLOYMENT_TIMEOUT",
                DEFAULT_DEPLOYMENT_TIMEOUT,
            ),
            aso_controller_timeout,
            helm_install_timeout: duration::duration_from_env(
                "HELM_INSTALL_TIMEOUT",
                DEFAULT_HELM_INSTALL_TIMEOUT,
            ),

            infra_provider_kind,
            infra_providers: vec![infra_provider],

            mce_auto_enable,
            mce_enablement_timeout: duration::duration_from_env(
                "MCE_ENABLEMENT_TIMEOUT",
                DEFAULT_MCE_ENABLEMENT_TIMEOUT,
            ),
        }
    }

    /// Output directory name for generated infrastructure files.
    pub fn output_dir_name(&self) -> String {
        format!("{}-{}", self.workload_cluster_name, self.environment)
    }

    /// Path to the generated `aro.yaml` manifest.
    pub fn aro_yaml_path(&self) -> PathBuf {
        self.repo_dir.join(self.output_dir_name()).join("aro.yaml")
    }

    /// Expected files produced by the generation script, in order.
    pub fn expected_files(&self) -> Vec<&'static str> {
        vec!["credentials.yaml", "aro.yaml"]
    }

    /// True when running against an external cluster instead of Kind.
    pub fn is_external_cluster(&self) -> bool {
        self.use_kubeconfig.is_some()
    }

    /// True when Kind deployment mode is enabled.
    pub fn is_kind_mode(&self) -> bool {
        self.use_kind
    }

    /// Actual cluster name from the generated manifest.
    ///
    /// The Cluster resource's `metadata.name` may differ from
    /// `workload_cluster_name`; use this for kubectl interaction with the
    /// provisioned cluster. Falls back to `workload_cluster_name` when the
    /// manifest does not exist yet (phases before generation).
    pub fn provisioned_cluster_name(&self) -> String {
        manifest::extract_cluster_name(&self.aro_yaml_path())
            .unwrap_or_else(|_| self.workload_cluster_name.clone())
    }

    /// Actual control plane resource name from the generated manifest, falling
    /// back to `{provisioned_cluster_name}-control-plane`.
    pub fn provisioned_control_plane_name(&self) -> String {
        manifest::extract_control_plane_name(&self.aro_yaml_path())
            .unwrap_or_else(|_| format!("{}-control-plane", self.provisioned_cluster_name()))
    }

    /// Actual machine pool resource name from the generated manifest, falling
    /// back to `{provisioned_cluster_name}-pool`.
    pub fn provisioned_machine_pool_name(&self) -> String {
        manifest::extract_machine_pool_name(&self.aro_yaml_path())
            .unwrap_or_else(|_| format!("{}-pool", self.provisioned_cluster_name()))
    }

    /// kubectl context for the management cluster.
    ///
    /// External clusters use the kubeconfig's current context; Kind clusters
    /// use `kind-{management_cluster_name}`. If the external kubeconfig cannot
    /// be read, returns the empty string so callers fall through to kubectl's
    /// own default context.
    pub fn kube_context(&self) -> String {
        if let Some(kubeconfig) = &self.use_kubeconfig {
            return manifest::extract_current_context(kubeconfig).unwrap_or_else(|e| {
                warn!(
                    "Failed to read current-context from {}: {}",
                    kubeconfig.display(),
                    e
                );
                String::new()
            });
        }
        format!("kind-{}", self.management_cluster_name)
    }

    /// All controllers across providers, prepended with the CAPI core
    /// controller.
    ///
    /// The ordering is fixed — core first, then providers in configuration
    /// order, then controllers in definition order — and callers rely on it
    /// for display and iteration.
    pub fn all_controllers(&self) -> Vec<ControllerSpec> {
        let mut controllers = vec![ControllerSpec {
            display_name: "CAPI".to_string(),
            namespace: self.capi_namespace.clone(),
            deployment_name: CAPI_CONTROLLER_DEPLOYMENT.to_string(),
            pod_selector: CAPI_POD_SELECTOR.to_string(),
            timeout: None,
        }];
        for provider in &self.infra_providers {
            controllers.extend(provider.controllers.iter().cloned());
        }
        controllers
    }

    /// All webhooks across providers, prepended with the CAPI core webhook.
    pub fn all_webhooks(&self) -> Vec<WebhookSpec> {
        let mut webhooks = vec![WebhookSpec {
            display_name: "CAPI".to_string(),
            namespace: self.capi_namespace.clone(),
            service_name: CAPI_WEBHOOK_SERVICE.to_string(),
            port: CAPI_WEBHOOK_PORT,
        }];
        for provider in &self.infra_providers {
            webhooks.extend(provider.webhooks.iter().cloned());
        }
        webhooks
    }

    /// Deduplicated namespaces across CAPI core and all providers, first
    /// occurrence wins.
    pub fn all_namespaces(&self) -> Vec<String> {
        let mut namespaces = vec![self.capi_namespace.clone()];
        for provider in &self.infra_providers {
            for ctrl in &provider.controllers {
                if !namespaces.contains(&ctrl.namespace) {
                    namespaces.push(ctrl.namespace.clone());
                }
            }
        }
        namespaces
    }

    /// Chart arguments for deploy-charts.sh: CAPI core first, then each
    /// provider's charts in provider order.
    pub fn deployment_chart_args(&self) -> Vec<String> {
        let mut args = vec![CAPI_DEPLOYMENT_CHART.to_string()];
        for provider in &self.infra_providers {
            args.extend(provider.deployment_charts.iter().cloned());
        }
        args
    }

    /// True if the named provider is in the active provider list. Guards
    /// provider-specific test logic.
    pub fn has_provider(&self, name: &str) -> bool {
        self.infra_providers.iter().any(|p| p.name == name)
    }

    /// Deduplicated CLI tools required across all providers, order-preserving.
    pub fn all_required_tools(&self) -> Vec<String> {
        let mut tools = Vec::new();
        for provider in &self.infra_providers {
            for tool in &provider.required_tools {
                if !tools.contains(tool) {
                    tools.push(tool.clone());
                }
            }
        }
        tools
    }

    /// Deduplicated repo-relative scripts required across all providers,
    /// order-preserving.
    pub fn all_required_scripts(&self) -> Vec<String> {
        let mut scripts = Vec::new();
        for provider in &self.infra_providers {
            for script in &provider.required_scripts {
                if !scripts.contains(script) {
                    scripts.push(script.clone());
                }
            }
        }
        scripts
    }
}
