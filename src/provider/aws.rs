//! AWS (ROSA) provider definition: CAPA.

use super::{ControllerSpec, CredentialSecretSpec, InfraProvider, WebhookSpec};

impl InfraProvider {
    /// Provider definition for AWS (CAPA).
    ///
    /// `namespace` is the resolved namespace for the CAPA controller
    /// ("capa-system" in Kind mode, "multicluster-engine" in MCE mode).
    pub fn aws(namespace: &str) -> Self {
        Self {
            name: "rosa".to_string(),
            controllers: vec![ControllerSpec {
                display_name: "CAPA".to_string(),
                namespace: namespace.to_string(),
                deployment_name: "capa-controller-manager".to_string(),
                pod_selector: "cluster.x-k8s.io/provider=infrastructure-aws".to_string(),
                timeout: None,
            }],
            webhooks: vec![WebhookSpec {
                display_name: "CAPA".to_string(),
                namespace: namespace.to_string(),
                service_name: "capa-webhook-service".to_string(),
                port: 443,
            }],
            credential_secret: Some(CredentialSecretSpec {
                name: "capa-manager-bootstrap-credentials".to_string(),
                namespace: namespace.to_string(),
                required_fields: vec!["credentials".to_string()],
                required_env_vars: vec![
                    "AWS_ACCESS_KEY_ID".to_string(),
                    "AWS_SECRET_ACCESS_KEY".to_string(),
                ],
            }),
            deployment_charts: vec!["cluster-api-provider-aws".to_string()],
            mce_component_name: "cluster-api-provider-aws".to_string(),
            required_tools: vec!["aws".to_string()],
            required_scripts: vec![
                "scripts/deploy-charts.sh".to_string(),
                "scripts/rosa-hcp/gen.sh".to_string(),
            ],
        }
    }
}
