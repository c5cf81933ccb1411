/// All errors that can be returned by an InstanceStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Instance not found — no record with the given instance ID.
    #[error("instance not found: {instance_id}")]
    InstanceNotFound { instance_id: String },

    /// Instance already exists — a record with this ID is already stored.
    #[error("instance already exists: {instance_id}")]
    AlreadyExists { instance_id: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
