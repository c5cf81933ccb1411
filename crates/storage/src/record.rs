use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Persisted instance details: a flat, forward-compatible JSON object.
/// Added fields are additive; there is no rigid schema migration step.
pub type DetailsMap = serde_json::Map<String, Value>;

/// Where an instance is in its lifecycle.
///
/// The in-flight states carry the name of the step currently (or last)
/// executing, which is the resumption point after a crash or a failed
/// retryable operation. There is no implicit backward transition: a failed
/// operation either resumes from the recorded step or the instance is
/// abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum InstanceStatus {
    Provisioning {
        step: String,
    },
    Provisioned,
    Updating {
        step: String,
    },
    Deprovisioning {
        step: String,
    },
    Failed {
        operation: String,
        step: String,
        message: String,
    },
}

/// The stored representation of one provisioned (or in-flight) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub service_id: String,
    pub plan_id: String,
    /// Set when the owning service declares a parent service.
    pub parent_instance_id: Option<String>,
    pub provisioning_parameters: DetailsMap,
    /// Secret parameter material. Encrypted at rest by the backend; never
    /// surfaced in logs or catalog responses.
    pub secure_provisioning_parameters: DetailsMap,
    /// Present only while an update operation is in flight.
    pub updating_parameters: Option<DetailsMap>,
    pub details: DetailsMap,
    pub secure_details: DetailsMap,
    pub status: InstanceStatus,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}
