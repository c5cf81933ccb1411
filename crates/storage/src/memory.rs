//! In-memory reference backend.
//!
//! Used by engine and service-module tests, and as the reference behavior
//! for real [`InstanceStore`] backends.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{DetailsMap, InstanceRecord, InstanceStatus};
use crate::traits::InstanceStore;

/// An `InstanceStore` backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, InstanceRecord>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn with_record<T>(
        &self,
        instance_id: &str,
        f: impl FnOnce(&mut InstanceRecord) -> T,
    ) -> Result<T, StorageError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record =
            records
                .get_mut(instance_id)
                .ok_or_else(|| StorageError::InstanceNotFound {
                    instance_id: instance_id.to_string(),
                })?;
        let result = f(record);
        record.updated_at = now_rfc3339();
        Ok(result)
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[async_trait]
impl InstanceStore for MemoryStore {
    async fn save(&self, record: InstanceRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.contains_key(&record.instance_id) {
            return Err(StorageError::AlreadyExists {
                instance_id: record.instance_id,
            });
        }
        records.insert(record.instance_id.clone(), record);
        Ok(())
    }

    async fn get(&self, instance_id: &str) -> Result<InstanceRecord, StorageError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .get(instance_id)
            .cloned()
            .ok_or_else(|| StorageError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })
    }

    async fn update_details(
        &self,
        instance_id: &str,
        details: &DetailsMap,
        secure_details: &DetailsMap,
        status: InstanceStatus,
    ) -> Result<(), StorageError> {
        self.with_record(instance_id, |record| {
            record.details = details.clone();
            record.secure_details = secure_details.clone();
            record.status = status;
        })
    }

    async fn set_status(
        &self,
        instance_id: &str,
        status: InstanceStatus,
    ) -> Result<(), StorageError> {
        self.with_record(instance_id, |record| {
            record.status = status;
        })
    }

    async fn set_updating_parameters(
        &self,
        instance_id: &str,
        updating_parameters: Option<DetailsMap>,
    ) -> Result<(), StorageError> {
        self.with_record(instance_id, |record| {
            record.updating_parameters = updating_parameters;
        })
    }

    async fn delete(&self, instance_id: &str) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(instance_id);
        Ok(())
    }

    async fn list_children(
        &self,
        parent_instance_id: &str,
    ) -> Result<Vec<InstanceRecord>, StorageError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .values()
            .filter(|r| r.parent_instance_id.as_deref() == Some(parent_instance_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(instance_id: &str, parent: Option<&str>) -> InstanceRecord {
        InstanceRecord {
            instance_id: instance_id.to_string(),
            service_id: "svc".to_string(),
            plan_id: "plan".to_string(),
            parent_instance_id: parent.map(str::to_string),
            provisioning_parameters: DetailsMap::new(),
            secure_provisioning_parameters: DetailsMap::new(),
            updating_parameters: None,
            details: DetailsMap::new(),
            secure_details: DetailsMap::new(),
            status: InstanceStatus::Provisioning {
                step: "preProvision".to_string(),
            },
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn save_rejects_duplicates() {
        let store = MemoryStore::new();
        store.save(record("i1", None)).await.unwrap();
        let err = store.save(record("i1", None)).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_details_commits_details_and_status() {
        let store = MemoryStore::new();
        store.save(record("i1", None)).await.unwrap();

        let mut details = DetailsMap::new();
        details.insert("armDeployment".to_string(), "abc".into());
        store
            .update_details("i1", &details, &DetailsMap::new(), InstanceStatus::Provisioned)
            .await
            .unwrap();

        let stored = store.get("i1").await.unwrap();
        assert_eq!(stored.details, details);
        assert_eq!(stored.status, InstanceStatus::Provisioned);
    }

    #[tokio::test]
    async fn updating_parameters_set_and_cleared() {
        let store = MemoryStore::new();
        store.save(record("i1", None)).await.unwrap();

        let mut params = DetailsMap::new();
        params.insert("storage".to_string(), 20.into());
        store
            .set_updating_parameters("i1", Some(params.clone()))
            .await
            .unwrap();
        assert_eq!(
            store.get("i1").await.unwrap().updating_parameters,
            Some(params)
        );

        store.set_updating_parameters("i1", None).await.unwrap();
        assert_eq!(store.get("i1").await.unwrap().updating_parameters, None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.save(record("i1", None)).await.unwrap();
        store.delete("i1").await.unwrap();
        store.delete("i1").await.unwrap();
        assert!(matches!(
            store.get("i1").await,
            Err(StorageError::InstanceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_children_filters_by_parent() {
        let store = MemoryStore::new();
        store.save(record("dbms", None)).await.unwrap();
        store.save(record("db1", Some("dbms"))).await.unwrap();
        store.save(record("db2", Some("dbms"))).await.unwrap();
        store.save(record("other", None)).await.unwrap();

        let children = store.list_children("dbms").await.unwrap();
        assert_eq!(children.len(), 2);
    }
}
