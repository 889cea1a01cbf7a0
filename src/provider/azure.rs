//! Azure (ARO) provider definition: CAPZ plus Azure Service Operator.

use super::{ControllerSpec, CredentialSecretSpec, InfraProvider, WebhookSpec};

impl InfraProvider {
    /// Provider definition for Azure (CAPZ/ASO).
    ///
    /// `namespace` is the resolved namespace for the CAPZ/ASO controllers
    /// ("capz-system" in Kind mode, "multicluster-engine" in MCE mode).
    pub fn azure(namespace: &str) -> Self {
        Self {
            name: "aro".to_string(),
            controllers: vec![
                ControllerSpec {
                    display_name: "CAPZ".to_string(),
                    namespace: namespace.to_string(),
                    deployment_name: "capz-controller-manager".to_string(),
                    pod_selector: "cluster.x-k8s.io/provider=infrastructure-azure".to_string(),
                    timeout: None,
                },
                ControllerSpec {
                    display_name: "ASO".to_string(),
                    namespace: namespace.to_string(),
                    deployment_name: "azureserviceoperator-controller-manager".to_string(),
                    pod_selector: "app.kubernetes.io/name=azure-service-operator".to_string(),
                    timeout: None,
                },
            ],
            webhooks: vec![
                WebhookSpec {
                    display_name: "CAPZ".to_string(),
                    namespace: namespace.to_string(),
                    service_name: "capz-webhook-service".to_string(),
                    port: 443,
                },
                WebhookSpec {
                    display_name: "ASO".to_string(),
                    namespace: namespace.to_string(),
                    service_name: "azureserviceoperator-webhook-service".to_string(),
                    port: 443,
                },
            ],
            credential_secret: Some(CredentialSecretSpec {
                name: "aso-controller-settings".to_string(),
                namespace: namespace.to_string(),
                required_fields: vec![
                    "AZURE_TENANT_ID".to_string(),
                    "AZURE_SUBSCRIPTION_ID".to_string(),
                    "AZURE_CLIENT_ID".to_string(),
                    "AZURE_CLIENT_SECRET".to_string(),
                ],
                required_env_vars: vec![
                    "AZURE_CLIENT_ID".to_string(),
                    "AZURE_CLIENT_SECRET".to_string(),
                ],
            }),
            deployment_charts: vec!["cluster-api-provider-azure".to_string()],
            mce_component_name: "cluster-api-provider-azure-preview".to_string(),
            required_tools: vec!["az".to_string()],
            required_scripts: vec![
                "scripts/deploy-charts.sh".to_string(),
                "scripts/aro-hcp/gen.sh".to_string(),
            ],
        }
    }
}
