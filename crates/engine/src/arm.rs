//! The resource-manager deployment boundary.
//!
//! The engine treats deployments as a black-box operation: given a template,
//! parameters, and tags, create or update a named deployment and return its
//! output values. Deployment names are caller-generated unique identifiers,
//! one per logical sub-resource, which makes re-deploy-by-same-name the
//! idempotence mechanism for retried steps.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

/// Everything one deployment needs.
#[derive(Debug, Clone)]
pub struct DeploymentRequest<'a> {
    pub deployment_name: &'a str,
    pub resource_group: &'a str,
    pub location: &'a str,
    pub template: &'a [u8],
    /// Values interpolated into the template before submission.
    pub template_parameters: serde_json::Map<String, Value>,
    /// Values passed to the resource manager as deployment parameters.
    pub arm_parameters: serde_json::Map<String, Value>,
    pub tags: BTreeMap<String, String>,
}

/// An error from the deployment service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArmError {
    #[error("deployment {name} failed: {message}")]
    DeploymentFailed { name: String, message: String },

    #[error("error communicating with the resource manager: {0}")]
    Transport(String),
}

/// The deployment client contract.
#[async_trait]
pub trait ArmDeployer: Send + Sync {
    /// Create the named deployment, or update it if a deployment with this
    /// name already exists in the resource group. Blocks until the
    /// deployment reaches a terminal state and returns its output values.
    async fn deploy(
        &self,
        request: DeploymentRequest<'_>,
    ) -> Result<serde_json::Map<String, Value>, ArmError>;

    /// Delete the named deployment. Deleting a deployment that does not
    /// exist succeeds — a prior partial deprovision run may already have
    /// removed it.
    async fn delete(&self, deployment_name: &str, resource_group: &str) -> Result<(), ArmError>;
}

// ──────────────────────────────────────────────
// In-memory deployer
// ──────────────────────────────────────────────

/// What the in-memory deployer remembers about one deployment.
#[derive(Debug, Clone)]
pub struct RecordedDeployment {
    pub deployment_name: String,
    pub resource_group: String,
    pub location: String,
    pub template_parameters: serde_json::Map<String, Value>,
    pub tags: BTreeMap<String, String>,
    /// How many times this name has been deployed. A second deploy with the
    /// same name is an update, not a duplicate resource.
    pub revisions: u32,
}

/// An [`ArmDeployer`] backed by process-local state, for tests.
///
/// Scriptable: queue failures with [`fail_next`](Self::fail_next), and set
/// output values returned by every successful deploy with
/// [`set_output`](Self::set_output).
#[derive(Debug, Default)]
pub struct InMemoryArmDeployer {
    deployments: Mutex<BTreeMap<String, RecordedDeployment>>,
    outputs: Mutex<serde_json::Map<String, Value>>,
    failures: Mutex<VecDeque<String>>,
}

impl InMemoryArmDeployer {
    pub fn new() -> InMemoryArmDeployer {
        InMemoryArmDeployer::default()
    }

    /// Include `key: value` in the outputs of every successful deploy.
    pub fn set_output(&self, key: impl Into<String>, value: Value) {
        self.outputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value);
    }

    /// Fail the next deploy call with the given message.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(message.into());
    }

    pub fn deployment(&self, deployment_name: &str) -> Option<RecordedDeployment> {
        self.deployments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(deployment_name)
            .cloned()
    }

    pub fn deployment_count(&self) -> usize {
        self.deployments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn deployed_names(&self) -> Vec<String> {
        self.deployments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArmDeployer for InMemoryArmDeployer {
    async fn deploy(
        &self,
        request: DeploymentRequest<'_>,
    ) -> Result<serde_json::Map<String, Value>, ArmError> {
        if let Some(message) = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Err(ArmError::DeploymentFailed {
                name: request.deployment_name.to_string(),
                message,
            });
        }

        let mut deployments = self.deployments.lock().unwrap_or_else(|e| e.into_inner());
        deployments
            .entry(request.deployment_name.to_string())
            .and_modify(|existing| {
                existing.template_parameters = request.template_parameters.clone();
                existing.tags = request.tags.clone();
                existing.revisions += 1;
            })
            .or_insert_with(|| RecordedDeployment {
                deployment_name: request.deployment_name.to_string(),
                resource_group: request.resource_group.to_string(),
                location: request.location.to_string(),
                template_parameters: request.template_parameters.clone(),
                tags: request.tags.clone(),
                revisions: 1,
            });

        Ok(self.outputs.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn delete(&self, deployment_name: &str, _resource_group: &str) -> Result<(), ArmError> {
        self.deployments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(deployment_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(name: &str) -> DeploymentRequest<'_> {
        DeploymentRequest {
            deployment_name: name,
            resource_group: "rg",
            location: "eastus",
            template: b"{}",
            template_parameters: serde_json::Map::new(),
            arm_parameters: serde_json::Map::new(),
            tags: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn redeploy_by_same_name_is_an_update() {
        let deployer = InMemoryArmDeployer::new();
        deployer.deploy(request("d-1")).await.unwrap();
        deployer.deploy(request("d-1")).await.unwrap();

        assert_eq!(deployer.deployment_count(), 1);
        assert_eq!(deployer.deployment("d-1").unwrap().revisions, 2);
    }

    #[tokio::test]
    async fn delete_of_absent_deployment_succeeds() {
        let deployer = InMemoryArmDeployer::new();
        deployer.delete("never-deployed", "rg").await.unwrap();
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_once() {
        let deployer = InMemoryArmDeployer::new();
        deployer.fail_next("quota exceeded");
        let err = deployer.deploy(request("d-1")).await.unwrap_err();
        assert!(matches!(err, ArmError::DeploymentFailed { .. }));
        deployer.deploy(request("d-1")).await.unwrap();
    }

    #[tokio::test]
    async fn outputs_returned_on_success() {
        let deployer = InMemoryArmDeployer::new();
        deployer.set_output("fullyQualifiedDomainName", json!("s.example.net"));
        let outputs = deployer.deploy(request("d-1")).await.unwrap();
        assert_eq!(outputs["fullyQualifiedDomainName"], json!("s.example.net"));
    }
}
