//! Resource read/validate clients and the connectivity probe.
//!
//! All read clients share one contract: `Ok(Some(_))` is the resource's
//! current state, `Ok(None)` means the resource does not exist, and `Err`
//! is a transport/authorization failure. Absence is a domain signal, not an
//! exception — provisioning steps that expect a resource treat `None` as
//! fatal, while name-availability and deprovisioning steps treat it as the
//! expected case. Nothing anywhere matches on error text.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

/// A transport or authorization failure talking to a resource service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("error communicating with the resource service: {0}")]
    Transport(String),
}

/// Current state of a DBMS server resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerState {
    pub name: String,
    pub version: String,
    pub location: String,
    pub fully_qualified_domain_name: String,
}

/// Current state of a database resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseState {
    pub name: String,
}

/// Current state of a failover group resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverGroupState {
    pub name: String,
    pub primary_server: String,
    pub secondary_server: String,
}

#[async_trait]
pub trait ServersClient: Send + Sync {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
    ) -> Result<Option<ServerState>, ClientError>;
}

#[async_trait]
pub trait DatabasesClient: Send + Sync {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
        database: &str,
    ) -> Result<Option<DatabaseState>, ClientError>;
}

#[async_trait]
pub trait FailoverGroupsClient: Send + Sync {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
        failover_group: &str,
    ) -> Result<Option<FailoverGroupState>, ClientError>;
}

// ──────────────────────────────────────────────
// Connectivity probe
// ──────────────────────────────────────────────

/// A failed administrator connectivity/permission check.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("error connecting to {fqdn}: {message}")]
    Connection { fqdn: String, message: String },

    #[error("administrator {login} does not hold permission {permission}")]
    MissingPermission { login: String, permission: String },
}

/// Opens a direct connection to a provisioned server with administrator
/// credentials and confirms the login holds sufficient privilege before
/// provisioning proceeds. Failure is a hard abort; no partial credentials
/// are ever returned to the caller.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn verify_administrator(
        &self,
        fqdn: &str,
        login: &str,
        password: &str,
    ) -> Result<(), ProbeError>;
}

// ──────────────────────────────────────────────
// In-memory fakes
// ──────────────────────────────────────────────

/// A [`ServersClient`] over a process-local map, for tests.
#[derive(Debug, Default)]
pub struct InMemoryServersClient {
    servers: Mutex<BTreeMap<(String, String), ServerState>>,
}

impl InMemoryServersClient {
    pub fn new() -> InMemoryServersClient {
        InMemoryServersClient::default()
    }

    pub fn put(&self, resource_group: &str, server: ServerState) {
        self.servers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((resource_group.to_string(), server.name.clone()), server);
    }
}

#[async_trait]
impl ServersClient for InMemoryServersClient {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
    ) -> Result<Option<ServerState>, ClientError> {
        Ok(self
            .servers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(resource_group.to_string(), server.to_string()))
            .cloned())
    }
}

/// A [`DatabasesClient`] over a process-local map, for tests.
#[derive(Debug, Default)]
pub struct InMemoryDatabasesClient {
    databases: Mutex<BTreeMap<(String, String, String), DatabaseState>>,
}

impl InMemoryDatabasesClient {
    pub fn new() -> InMemoryDatabasesClient {
        InMemoryDatabasesClient::default()
    }

    pub fn put(&self, resource_group: &str, server: &str, database: &str) {
        self.databases.lock().unwrap_or_else(|e| e.into_inner()).insert(
            (
                resource_group.to_string(),
                server.to_string(),
                database.to_string(),
            ),
            DatabaseState {
                name: database.to_string(),
            },
        );
    }
}

#[async_trait]
impl DatabasesClient for InMemoryDatabasesClient {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
        database: &str,
    ) -> Result<Option<DatabaseState>, ClientError> {
        Ok(self
            .databases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(
                resource_group.to_string(),
                server.to_string(),
                database.to_string(),
            ))
            .cloned())
    }
}

/// A [`FailoverGroupsClient`] over a process-local map, for tests.
#[derive(Debug, Default)]
pub struct InMemoryFailoverGroupsClient {
    groups: Mutex<BTreeMap<(String, String, String), FailoverGroupState>>,
}

impl InMemoryFailoverGroupsClient {
    pub fn new() -> InMemoryFailoverGroupsClient {
        InMemoryFailoverGroupsClient::default()
    }

    pub fn put(&self, resource_group: &str, server: &str, group: FailoverGroupState) {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).insert(
            (
                resource_group.to_string(),
                server.to_string(),
                group.name.clone(),
            ),
            group,
        );
    }
}

#[async_trait]
impl FailoverGroupsClient for InMemoryFailoverGroupsClient {
    async fn get(
        &self,
        resource_group: &str,
        server: &str,
        failover_group: &str,
    ) -> Result<Option<FailoverGroupState>, ClientError> {
        Ok(self
            .groups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(
                resource_group.to_string(),
                server.to_string(),
                failover_group.to_string(),
            ))
            .cloned())
    }
}

/// A [`ConnectionProbe`] that accepts every login unless told otherwise.
#[derive(Debug, Default)]
pub struct FakeConnectionProbe {
    denied: Mutex<BTreeMap<String, String>>,
}

impl FakeConnectionProbe {
    pub fn new() -> FakeConnectionProbe {
        FakeConnectionProbe::default()
    }

    /// Make `verify_administrator` fail for this login with a missing
    /// permission.
    pub fn deny(&self, login: &str, permission: &str) {
        self.denied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(login.to_string(), permission.to_string());
    }
}

#[async_trait]
impl ConnectionProbe for FakeConnectionProbe {
    async fn verify_administrator(
        &self,
        _fqdn: &str,
        login: &str,
        _password: &str,
    ) -> Result<(), ProbeError> {
        let denied = self.denied.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(permission) = denied.get(login) {
            return Err(ProbeError::MissingPermission {
                login: login.to_string(),
                permission: permission.clone(),
            });
        }
        Ok(())
    }
}
