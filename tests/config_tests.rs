//! Integration tests for environment-driven configuration resolution.
//!
//! Rust runs tests in parallel threads sharing one process environment, so
//! every test here takes [`env_guard`] first: it serializes the tests and
//! restores the environment on drop. Values memoized process-wide (repository
//! directory, workload cluster namespace) are only asserted for idempotency;
//! the un-memoized resolver covers the priority chain.

use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Duration;

use capi_installer_harness::config::duration::duration_from_env_with_source;
use capi_installer_harness::config::resolve_workload_cluster_namespace;
use capi_installer_harness::{HarnessConfig, ProviderKind, ValueSource};

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Every variable the resolver reads (or writes, in the case of USE_K8S).
const CONFIG_VARS: &[&str] = &[
    "ARO_REPO_URL",
    "ARO_REPO_BRANCH",
    "ARO_REPO_DIR",
    "MANAGEMENT_CLUSTER_NAME",
    "WORKLOAD_CLUSTER_NAME",
    "CS_CLUSTER_NAME",
    "OCP_VERSION",
    "REGION",
    "AZURE_SUBSCRIPTION_NAME",
    "DEPLOYMENT_ENV",
    "CAPZ_USER",
    "WORKLOAD_CLUSTER_NAMESPACE",
    "WORKLOAD_CLUSTER_NAMESPACE_PREFIX",
    "CAPI_NAMESPACE",
    "CAPZ_NAMESPACE",
    "CAPA_NAMESPACE",
    "USE_KUBECONFIG",
    "USE_K8S",
    "USE_KIND",
    "CLUSTERCTL_BIN",
    "SCRIPTS_PATH",
    "GEN_SCRIPT_PATH",
    "DEPLOYMENT_TIMEOUT",
    "ASO_CONTROLLER_TIMEOUT",
    "HELM_INSTALL_TIMEOUT",
    "MCE_ENABLEMENT_TIMEOUT",
    "MCE_AUTO_ENABLE",
    "INFRA_PROVIDER",
];

/// Holds the test-wide env lock, clears all config variables, and restores
/// the original environment when dropped.
struct EnvGuard {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(var, v),
                None => std::env::remove_var(var),
            }
        }
    }
}

fn env_guard() -> EnvGuard {
    let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let saved = CONFIG_VARS
        .iter()
        .map(|&var| (var, std::env::var(var).ok()))
        .collect();
    for var in CONFIG_VARS {
        std::env::remove_var(var);
    }
    EnvGuard { _lock: lock, saved }
}

#[test]
fn defaults_without_environment() {
    let _guard = env_guard();
    let config = HarnessConfig::from_env();

    assert_eq!(
        config.repo_url,
        "https://github.com/stolostron/cluster-api-installer"
    );
    assert_eq!(config.repo_branch, "main");
    assert_eq!(config.management_cluster_name, "capz-tests-stage");
    assert_eq!(config.workload_cluster_name, "capz-tests-cluster");
    assert_eq!(config.cluster_name_prefix, "rcapd-stage");
    assert_eq!(config.ocp_version, "4.20");
    assert_eq!(config.region, "uksouth");
    assert_eq!(config.environment, "stage");
    assert_eq!(config.capz_user, "rcapd");
    assert_eq!(config.clusterctl_bin_path, "./bin/clusterctl");
    assert_eq!(config.scripts_path, "./scripts");
    assert_eq!(config.gen_script_path, "./scripts/aro-hcp/gen.sh");
    assert_eq!(config.deployment_timeout, Duration::from_secs(3600));
    assert_eq!(config.helm_install_timeout, Duration::from_secs(600));
    assert_eq!(config.mce_enablement_timeout, Duration::from_secs(900));
    assert_eq!(config.infra_provider_kind, ProviderKind::Aro);
    assert_eq!(config.capi_namespace, "capi-system");
    assert_eq!(config.provider_namespace, "capz-system");
    assert!(!config.is_external_cluster());
    assert!(!config.is_kind_mode());
    assert!(!config.mce_auto_enable);
}

#[test]
fn construction_is_idempotent() {
    let _guard = env_guard();
    let first = HarnessConfig::from_env();
    let second = HarnessConfig::from_env();

    assert_eq!(first.repo_dir, second.repo_dir);
    assert_eq!(
        first.workload_cluster_namespace,
        second.workload_cluster_namespace
    );
    assert!(!first.workload_cluster_namespace.is_empty());
}

#[test]
fn explicit_environment_overrides_defaults() {
    let _guard = env_guard();
    std::env::set_var("OCP_VERSION", "4.21");
    std::env::set_var("REGION", "eastus");
    std::env::set_var("WORKLOAD_CLUSTER_NAME", "my-cluster");
    std::env::set_var("DEPLOYMENT_ENV", "prod");
    std::env::set_var("GEN_SCRIPT_PATH", "./custom/gen.sh");

    let config = HarnessConfig::from_env();
    assert_eq!(config.ocp_version, "4.21");
    assert_eq!(config.region, "eastus");
    assert_eq!(config.workload_cluster_name, "my-cluster");
    assert_eq!(config.environment, "prod");
    assert_eq!(config.gen_script_path, "./custom/gen.sh");
    assert_eq!(config.output_dir_name(), "my-cluster-prod");
}

#[test]
fn cluster_name_prefix_composed_from_user_and_environment() {
    let _guard = env_guard();
    std::env::set_var("CAPZ_USER", "alice");
    std::env::set_var("DEPLOYMENT_ENV", "dev");

    let config = HarnessConfig::from_env();
    assert_eq!(config.cluster_name_prefix, "alice-dev");

    std::env::set_var("CS_CLUSTER_NAME", "explicit-name");
    let config = HarnessConfig::from_env();
    assert_eq!(config.cluster_name_prefix, "explicit-name");
}

#[test]
fn rosa_provider_selection() {
    let _guard = env_guard();
    std::env::set_var("INFRA_PROVIDER", "rosa");

    let config = HarnessConfig::from_env();
    assert_eq!(config.infra_provider_kind, ProviderKind::Rosa);
    assert_eq!(config.provider_namespace, "capa-system");
    assert_eq!(config.gen_script_path, "./scripts/rosa-hcp/gen.sh");
    assert!(config.has_provider("rosa"));
    assert!(!config.has_provider("aro"));
    assert_eq!(config.all_controllers().len(), 2);
    assert_eq!(config.all_required_tools(), vec!["aws"]);
}

#[test]
fn unknown_provider_normalizes_to_aro() {
    let _guard = env_guard();
    std::env::set_var("INFRA_PROVIDER", "gcp");

    let config = HarnessConfig::from_env();
    assert_eq!(config.infra_provider_kind, ProviderKind::Aro);
    assert!(config.has_provider("aro"));
}

#[test]
fn external_kubeconfig_enables_shared_namespace_mode() {
    let _guard = env_guard();
    std::env::set_var("USE_KUBECONFIG", "/tmp/external-kubeconfig");

    let config = HarnessConfig::from_env();
    assert!(config.is_external_cluster());
    // from_env exports USE_K8S when a kubeconfig is given
    assert_eq!(std::env::var("USE_K8S").as_deref(), Ok("true"));
    assert_eq!(config.capi_namespace, "multicluster-engine");
    assert_eq!(config.provider_namespace, "multicluster-engine");
    assert_eq!(config.all_namespaces(), vec!["multicluster-engine"]);
    assert!(config.mce_auto_enable, "auto-enable defaults on for external clusters");
}

#[test]
fn explicit_use_k8s_false_is_preserved() {
    let _guard = env_guard();
    std::env::set_var("USE_KUBECONFIG", "/tmp/external-kubeconfig");
    std::env::set_var("USE_K8S", "false");

    let config = HarnessConfig::from_env();
    assert_eq!(std::env::var("USE_K8S").as_deref(), Ok("false"));
    assert_eq!(config.capi_namespace, "capi-system");
}

#[test]
fn mce_auto_enable_explicit_override() {
    let _guard = env_guard();
    std::env::set_var("USE_KUBECONFIG", "/tmp/external-kubeconfig");
    std::env::set_var("MCE_AUTO_ENABLE", "false");
    assert!(!HarnessConfig::from_env().mce_auto_enable);

    std::env::remove_var("USE_KUBECONFIG");
    std::env::set_var("MCE_AUTO_ENABLE", "true");
    assert!(HarnessConfig::from_env().mce_auto_enable);
}

#[test]
fn controller_namespace_env_overrides() {
    let _guard = env_guard();
    std::env::set_var("CAPI_NAMESPACE", "custom-capi");
    std::env::set_var("CAPZ_NAMESPACE", "custom-capz");

    let config = HarnessConfig::from_env();
    assert_eq!(config.capi_namespace, "custom-capi");
    assert_eq!(config.provider_namespace, "custom-capz");
    assert_eq!(config.all_namespaces(), vec!["custom-capi", "custom-capz"]);
}

#[test]
fn aso_timeout_override_reaches_the_aso_controller() {
    let _guard = env_guard();
    std::env::set_var("ASO_CONTROLLER_TIMEOUT", "5m");

    let config = HarnessConfig::from_env();
    assert_eq!(config.aso_controller_timeout, Duration::from_secs(300));

    let controllers = config.all_controllers();
    let aso = controllers
        .iter()
        .find(|c| c.display_name == "ASO")
        .expect("aro config has an ASO controller");
    assert_eq!(aso.timeout, Some(Duration::from_secs(300)));
}

#[test]
fn valid_duration_from_env_is_explicit() {
    let _guard = env_guard();
    std::env::set_var("DEPLOYMENT_TIMEOUT", "90m");

    let (value, source) =
        duration_from_env_with_source("DEPLOYMENT_TIMEOUT", Duration::from_secs(3600));
    assert_eq!(value, Duration::from_secs(90 * 60));
    assert_eq!(source, ValueSource::Explicit);

    let config = HarnessConfig::from_env();
    assert_eq!(config.deployment_timeout, Duration::from_secs(90 * 60));
}

#[test]
fn malformed_durations_fall_back_to_default() {
    let _guard = env_guard();

    for bad in ["abc", "45", "1x"] {
        std::env::set_var("DEPLOYMENT_TIMEOUT", bad);
        let (value, source) =
            duration_from_env_with_source("DEPLOYMENT_TIMEOUT", Duration::from_secs(3600));
        assert_eq!(value, Duration::from_secs(3600), "'{bad}' should fall back");
        assert_eq!(source, ValueSource::Default);
    }

    std::env::set_var("DEPLOYMENT_TIMEOUT", "abc");
    let config = HarnessConfig::from_env();
    assert_eq!(config.deployment_timeout, Duration::from_secs(3600));
}

#[test]
fn empty_duration_is_a_silent_default() {
    let _guard = env_guard();
    std::env::set_var("HELM_INSTALL_TIMEOUT", "");

    let (value, source) =
        duration_from_env_with_source("HELM_INSTALL_TIMEOUT", Duration::from_secs(600));
    assert_eq!(value, Duration::from_secs(600));
    assert_eq!(source, ValueSource::Default);
}

#[test]
fn namespace_resolution_prefers_explicit_env() {
    let _guard = env_guard();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("WORKLOAD_CLUSTER_NAMESPACE", "explicit-ns");

    // Env var wins even when a state file exists
    std::fs::write(
        dir.path().join(".deployment-state.json"),
        r#"{"workload_cluster_namespace": "state-ns"}"#,
    )
    .unwrap();

    let (ns, source) = resolve_workload_cluster_namespace(dir.path());
    assert_eq!(ns, "explicit-ns");
    assert_eq!(source, ValueSource::Explicit);
}

#[test]
fn namespace_resolution_resumes_from_state_file() {
    let _guard = env_guard();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".deployment-state.json"),
        r#"{"workload_cluster_namespace": "state-ns"}"#,
    )
    .unwrap();

    let (ns, source) = resolve_workload_cluster_namespace(dir.path());
    assert_eq!(ns, "state-ns");
    assert_eq!(source, ValueSource::StateFile);
}

#[test]
fn namespace_resolution_generates_timestamped_fallback() {
    let _guard = env_guard();
    let dir = tempfile::tempdir().unwrap();

    let (ns, source) = resolve_workload_cluster_namespace(dir.path());
    assert_eq!(source, ValueSource::Generated);
    assert!(
        ns.starts_with("capz-test-"),
        "generated namespace '{ns}' should use the default prefix"
    );
    // capz-test-YYYYMMDD-HHMMSS
    assert_eq!(ns.len(), "capz-test-".len() + 15);

    std::env::set_var("WORKLOAD_CLUSTER_NAMESPACE_PREFIX", "rosa-test");
    let (ns, _) = resolve_workload_cluster_namespace(dir.path());
    assert!(ns.starts_with("rosa-test-"));
}

#[test]
fn expected_files_and_chart_args() {
    let _guard = env_guard();
    let config = HarnessConfig::from_env();

    assert_eq!(config.expected_files(), vec!["credentials.yaml", "aro.yaml"]);
    assert_eq!(
        config.deployment_chart_args(),
        vec!["cluster-api", "cluster-api-provider-azure"]
    );
    assert_eq!(
        config.all_required_scripts(),
        vec!["scripts/deploy-charts.sh", "scripts/aro-hcp/gen.sh"]
    );
}
