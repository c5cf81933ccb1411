use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{DetailsMap, InstanceRecord, InstanceStatus};

/// The storage trait for broker persistence backends.
///
/// An `InstanceStore` implementation provides durable storage for instance
/// records. The pipeline runner's access pattern is
/// read-modify-persist-then-proceed: after every completed step it writes
/// the new details with [`update_details`](Self::update_details) before the
/// next step starts, so a crash between steps loses no completed work.
///
/// ## Exclusivity
///
/// The engine assumes at most one in-flight operation per instance ID.
/// Enforcing that (e.g. with a lease or an advisory lock keyed by instance
/// ID) is the backend's responsibility, not the engine's. Concurrent
/// operations against *different* instances are expected and safe.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be shared across
/// async task boundaries.
#[async_trait]
pub trait InstanceStore: Send + Sync + 'static {
    /// Insert a new instance record.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if a record with this
    /// instance ID is already stored.
    async fn save(&self, record: InstanceRecord) -> Result<(), StorageError>;

    /// Read an instance record.
    ///
    /// Returns `Err(StorageError::InstanceNotFound)` if the instance does
    /// not exist.
    async fn get(&self, instance_id: &str) -> Result<InstanceRecord, StorageError>;

    /// Durably commit a completed step: new details, new secure details, and
    /// the status to carry forward, in one write.
    ///
    /// This is the crash-resume point — the runner calls it after every
    /// step, and a retried operation resumes against exactly this state.
    async fn update_details(
        &self,
        instance_id: &str,
        details: &DetailsMap,
        secure_details: &DetailsMap,
        status: InstanceStatus,
    ) -> Result<(), StorageError>;

    /// Record a status transition without touching details.
    async fn set_status(
        &self,
        instance_id: &str,
        status: InstanceStatus,
    ) -> Result<(), StorageError>;

    /// Store (or clear) the transient parameters of an in-flight update.
    async fn set_updating_parameters(
        &self,
        instance_id: &str,
        updating_parameters: Option<DetailsMap>,
    ) -> Result<(), StorageError>;

    /// Delete an instance record after deprovisioning completes.
    ///
    /// Idempotent: deleting an absent instance succeeds, because a prior
    /// partial deprovision run may already have removed it.
    async fn delete(&self, instance_id: &str) -> Result<(), StorageError>;

    /// List the records whose `parent_instance_id` is the given instance.
    /// Deletion order (children before parents) is enforced above the
    /// engine; this is the query it needs to do so.
    async fn list_children(
        &self,
        parent_instance_id: &str,
    ) -> Result<Vec<InstanceRecord>, StorageError>;
}
