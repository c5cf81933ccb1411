mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use record::{DetailsMap, InstanceRecord, InstanceStatus};
pub use traits::InstanceStore;
