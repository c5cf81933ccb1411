//! Steps: the unit of work inside a pipeline.
//!
//! A step is an async call on its manager taking a [`StepContext`] and a
//! typed view of the instance, returning the instance's next details. Steps
//! must be idempotent-by-resource-name: a retried operation re-invokes the
//! failed step with the latest persisted details, so re-running a step may
//! repeat its own external call but must not create a second resource.
//!
//! Cancellation follows the async contract: dropping a step's future aborts
//! its in-flight outbound call. Callers enforce an overall operation
//! deadline with `tokio::time::timeout`; no partial-step rollback is
//! attempted — whatever a half-completed external call left behind is
//! cleaned up by a retry or an explicit deprovision.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use asb_core::{
    Plan, ProvisioningParameters, SecureProvisioningParameters, ServiceProperties,
    UpdatingParameters, ValidationError,
};

use crate::arm::ArmError;
use crate::clients::{ClientError, ProbeError};
use crate::instance::{decode_details, DetailsError, Instance, InstanceDetails};

/// Which lifecycle operation a pipeline executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Provision,
    Update,
    Deprovision,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Provision => write!(f, "provisioning"),
            OperationKind::Update => write!(f, "updating"),
            OperationKind::Deprovision => write!(f, "deprovisioning"),
        }
    }
}

/// Per-step execution context, used for logging and error attribution.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub instance_id: String,
    pub operation: OperationKind,
    pub step: String,
}

/// An error produced by a single step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A resource a provisioning step expected to exist is absent.
    #[error("can't find {resource} {name}")]
    NotFound { resource: &'static str, name: String },

    /// A resource a name-availability check expected to be absent exists.
    #[error("{resource} {name} already exists")]
    AlreadyExists { resource: &'static str, name: String },

    /// A detail this step needs was not set by an earlier step. Indicates a
    /// step-ordering bug or an incompletely provisioned parent.
    #[error("required detail {field} has not been set by an earlier step")]
    MissingDetail { field: &'static str },

    /// The step needs a parent instance and none was loaded.
    #[error("instance has no parent")]
    MissingParent,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Deployer(#[from] ArmError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Details(#[from] DetailsError),

    /// Step-specific failure with its own context string.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    pub fn other(message: impl Into<String>) -> StepError {
        StepError::Other(message.into())
    }
}

/// A step's result: the instance's next details and secure details, persisted
/// by the runner before the following step starts.
#[derive(Debug, Clone)]
pub struct StepOutput<D, S> {
    pub details: D,
    pub secure_details: S,
}

impl<D, S> StepOutput<D, S> {
    pub fn new(details: D, secure_details: S) -> StepOutput<D, S> {
        StepOutput {
            details,
            secure_details,
        }
    }
}

/// The boxed future every step returns; borrows the manager, context, and
/// instance view for the duration of the step.
pub type StepFuture<'a, D, S> =
    Pin<Box<dyn Future<Output = Result<StepOutput<D, S>, StepError>> + Send + 'a>>;

/// The typed view of an instance a step operates on: the generic instance
/// plus its details decoded into the module's concrete shapes.
pub struct StepInstance<'a, D, S> {
    instance: &'a Instance,
    pub details: D,
    pub secure_details: S,
}

impl<'a, D: InstanceDetails, S: InstanceDetails> StepInstance<'a, D, S> {
    /// The single fallible decode performed at step entry.
    pub fn decode(instance: &'a Instance) -> Result<StepInstance<'a, D, S>, DetailsError> {
        Ok(StepInstance {
            instance,
            details: decode_details(&instance.details)?,
            secure_details: decode_details(&instance.secure_details)?,
        })
    }

    pub fn instance(&self) -> &Instance {
        self.instance
    }

    pub fn provisioning_parameters(&self) -> &ProvisioningParameters {
        &self.instance.provisioning_parameters
    }

    pub fn secure_provisioning_parameters(&self) -> &SecureProvisioningParameters {
        &self.instance.secure_provisioning_parameters
    }

    pub fn updating_parameters(&self) -> Option<&UpdatingParameters> {
        self.instance.updating_parameters.as_ref()
    }

    pub fn plan(&self) -> &Plan {
        &self.instance.plan
    }

    pub fn service_properties(&self) -> &ServiceProperties {
        self.instance.service.properties()
    }

    /// The parent instance, required.
    pub fn parent(&self) -> Result<&Instance, StepError> {
        self.instance
            .parent
            .as_deref()
            .ok_or(StepError::MissingParent)
    }

    pub fn parent_provisioning_parameters(&self) -> Result<&ProvisioningParameters, StepError> {
        Ok(&self.parent()?.provisioning_parameters)
    }

    /// Decode the parent's details into the parent module's concrete shape.
    pub fn parent_details<PD: InstanceDetails>(&self) -> Result<PD, StepError> {
        Ok(self.parent()?.decode_details()?)
    }

    /// A pass-through output for steps that only validate.
    pub fn unchanged(&self) -> StepOutput<D, S> {
        StepOutput::new(self.details.clone(), self.secure_details.clone())
    }
}

/// Require a detail that an earlier step (or the parent's pipeline) should
/// have produced. An empty value fails loudly instead of flowing onward.
pub fn required_detail<'v>(field: &'static str, value: &'v str) -> Result<&'v str, StepError> {
    if value.is_empty() {
        return Err(StepError::MissingDetail { field });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_detail_rejects_empty() {
        assert!(matches!(
            required_detail("server", ""),
            Err(StepError::MissingDetail { field: "server" })
        ));
        assert_eq!(required_detail("server", "sql-1").unwrap(), "sql-1");
    }

    #[test]
    fn operation_kind_display() {
        assert_eq!(OperationKind::Provision.to_string(), "provisioning");
        assert_eq!(OperationKind::Deprovision.to_string(), "deprovisioning");
    }
}
