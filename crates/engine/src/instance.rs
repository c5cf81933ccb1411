//! The instance data model and the typed-details codec.
//!
//! An [`Instance`] is the persistent unit of work: identity, the service and
//! plan it was created under, its validated parameters, and the opaque
//! step-mutated `details` maps. Details round-trip to storage as flat JSON
//! objects; each service module declares one concrete details struct and the
//! pipeline performs a single fallible decode at step entry and an encode
//! after each step, instead of blind runtime casts.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use asb_core::{
    Plan, ProvisioningParameters, SecureProvisioningParameters, UpdatingParameters,
};
use asb_storage::{InstanceRecord, InstanceStatus};

use crate::module::Service;

pub use asb_storage::DetailsMap;

/// A module-declared details shape.
///
/// `Default` is the empty shape a freshly created instance starts with;
/// fields filled by later steps must therefore tolerate absence (use
/// `Option` or empty strings) and be checked with
/// [`required_detail`](crate::step::required_detail) at the step that needs
/// them.
pub trait InstanceDetails:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
}

impl<T> InstanceDetails for T where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
}

/// The details shape of modules that keep no state (or no secret state).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoDetails {}

/// An internal-consistency fault: persisted details don't match the shape the
/// owning module declares. This indicates a sequencing or wiring bug and is
/// non-recoverable for the operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DetailsError {
    #[error("instance details do not match the expected shape: {0}")]
    Mismatch(String),
}

/// Decode a persisted details map into a module's concrete details type.
pub fn decode_details<D: InstanceDetails>(map: &DetailsMap) -> Result<D, DetailsError> {
    serde_json::from_value(Value::Object(map.clone()))
        .map_err(|e| DetailsError::Mismatch(e.to_string()))
}

/// Encode a module's concrete details type back into the persisted map form.
pub fn encode_details<D: InstanceDetails>(details: &D) -> Result<DetailsMap, DetailsError> {
    match serde_json::to_value(details) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DetailsError::Mismatch(format!(
            "details serialized to {other} instead of an object"
        ))),
        Err(e) => Err(DetailsError::Mismatch(e.to_string())),
    }
}

/// The empty persisted map for a module's details type, as declared by its
/// `Default` shape.
pub fn empty_details<D: InstanceDetails>() -> DetailsMap {
    encode_details(&D::default()).unwrap_or_default()
}

/// The mutable, persisted unit of work.
#[derive(Debug, Clone)]
pub struct Instance {
    pub instance_id: String,
    pub service: Service,
    pub plan: Plan,
    /// Validated input captured at creation time. Immutable thereafter
    /// except via an explicit update operation.
    pub provisioning_parameters: ProvisioningParameters,
    pub secure_provisioning_parameters: SecureProvisioningParameters,
    /// Transient input for an in-flight update operation.
    pub updating_parameters: Option<UpdatingParameters>,
    /// Step-mutated state, persisted after every step.
    pub details: DetailsMap,
    pub secure_details: DetailsMap,
    /// Read-only view of the parent instance when the service declares one.
    /// Child pipelines read parent parameters and details; nothing here
    /// provides a mutable path back to the parent.
    pub parent: Option<Arc<Instance>>,
}

impl Instance {
    pub fn decode_details<D: InstanceDetails>(&self) -> Result<D, DetailsError> {
        decode_details(&self.details)
    }

    pub fn decode_secure_details<S: InstanceDetails>(&self) -> Result<S, DetailsError> {
        decode_details(&self.secure_details)
    }

    /// Build the stored representation of this instance.
    pub fn to_record(&self, status: InstanceStatus) -> InstanceRecord {
        let now = now_rfc3339();
        InstanceRecord {
            instance_id: self.instance_id.clone(),
            service_id: self.service.id().to_string(),
            plan_id: self.plan.id().to_string(),
            parent_instance_id: self.parent.as_ref().map(|p| p.instance_id.clone()),
            provisioning_parameters: self.provisioning_parameters.as_map().clone(),
            secure_provisioning_parameters: self.secure_provisioning_parameters.as_map().clone(),
            updating_parameters: self.updating_parameters.as_ref().map(|p| p.as_map().clone()),
            details: self.details.clone(),
            secure_details: self.secure_details.clone(),
            status,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Rehydrate an instance from its stored representation.
    ///
    /// The caller resolves the service/plan handles from the catalog and
    /// loads the parent (if any) first; the store itself only keeps ids.
    pub fn from_record(
        record: &InstanceRecord,
        service: Service,
        plan: Plan,
        parent: Option<Arc<Instance>>,
    ) -> Instance {
        Instance {
            instance_id: record.instance_id.clone(),
            service,
            plan,
            provisioning_parameters: ProvisioningParameters::from_map(
                record.provisioning_parameters.clone(),
            ),
            secure_provisioning_parameters: SecureProvisioningParameters::from_map(
                record.secure_provisioning_parameters.clone(),
            ),
            updating_parameters: record
                .updating_parameters
                .clone()
                .map(UpdatingParameters::from_map),
            details: record.details.clone(),
            secure_details: record.secure_details.clone(),
            parent,
        }
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct SampleDetails {
        #[serde(rename = "armDeployment")]
        arm_deployment_name: String,
        #[serde(rename = "fullyQualifiedDomainName", skip_serializing_if = "Option::is_none")]
        fully_qualified_domain_name: Option<String>,
    }

    #[test]
    fn empty_map_decodes_to_default() {
        let details: SampleDetails = decode_details(&DetailsMap::new()).unwrap();
        assert_eq!(details, SampleDetails::default());
    }

    #[test]
    fn round_trip_preserves_wire_names() {
        let details = SampleDetails {
            arm_deployment_name: "d-1".to_string(),
            fully_qualified_domain_name: Some("s.example.net".to_string()),
        };
        let map = encode_details(&details).unwrap();
        assert_eq!(map.get("armDeployment"), Some(&json!("d-1")));
        assert_eq!(
            map.get("fullyQualifiedDomainName"),
            Some(&json!("s.example.net"))
        );
        let decoded: SampleDetails = decode_details(&map).unwrap();
        assert_eq!(decoded, details);
    }

    #[test]
    fn mismatched_shape_is_an_error() {
        let mut map = DetailsMap::new();
        map.insert("armDeployment".to_string(), json!(["not", "a", "string"]));
        let result: Result<SampleDetails, _> = decode_details(&map);
        assert!(matches!(result, Err(DetailsError::Mismatch(_))));
    }
}
