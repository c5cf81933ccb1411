//! Shared fixtures: an in-memory world of fakes and instance construction
//! the way the lifecycle layer does it (validate, default, split, then run).

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;

use asb_core::ParameterMap;
use asb_engine::{
    DetailsMap, FakeConnectionProbe, InMemoryArmDeployer, InMemoryDatabasesClient,
    InMemoryFailoverGroupsClient, InMemoryServersClient, Instance, Service,
};
use asb_services::mssql::MssqlModule;
use asb_services::mssqlfg::MssqlFgModule;
use asb_services::mysql::MysqlModule;
use asb_services::postgresql::PostgresqlModule;
use asb_storage::{InstanceStatus, InstanceStore, MemoryStore};

pub const DNS_SUFFIX: &str = "database.example.net";

pub struct World {
    pub arm: Arc<InMemoryArmDeployer>,
    pub servers: Arc<InMemoryServersClient>,
    pub databases: Arc<InMemoryDatabasesClient>,
    pub failover_groups: Arc<InMemoryFailoverGroupsClient>,
    pub probe: Arc<FakeConnectionProbe>,
    pub store: MemoryStore,
}

impl World {
    pub fn new() -> World {
        World {
            arm: Arc::new(InMemoryArmDeployer::new()),
            servers: Arc::new(InMemoryServersClient::new()),
            databases: Arc::new(InMemoryDatabasesClient::new()),
            failover_groups: Arc::new(InMemoryFailoverGroupsClient::new()),
            probe: Arc::new(FakeConnectionProbe::new()),
            store: MemoryStore::new(),
        }
    }

    pub fn mssql(&self) -> MssqlModule {
        MssqlModule::new(
            self.arm.clone(),
            self.servers.clone(),
            self.databases.clone(),
            self.probe.clone(),
            DNS_SUFFIX,
        )
    }

    pub fn mssqlfg(&self) -> MssqlFgModule {
        MssqlFgModule::new(
            self.arm.clone(),
            self.servers.clone(),
            self.databases.clone(),
            self.failover_groups.clone(),
            self.probe.clone(),
            DNS_SUFFIX,
        )
    }

    pub fn mysql(&self) -> MysqlModule {
        MysqlModule::new(self.arm.clone())
    }

    pub fn postgresql(&self) -> PostgresqlModule {
        PostgresqlModule::new(self.arm.clone())
    }
}

pub fn object(value: Value) -> ParameterMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object literal"),
    }
}

/// Build an instance the way the lifecycle layer does: validate the raw
/// input against the plan's provisioning schema, apply defaults, split out
/// the secure half, and start from the manager's empty details.
pub fn new_instance(
    instance_id: &str,
    service: &Service,
    plan_name: &str,
    raw: Value,
    parent: Option<Arc<Instance>>,
) -> Instance {
    let plan = service
        .plan_named(plan_name)
        .unwrap_or_else(|| panic!("service {} has no plan {plan_name}", service.name()))
        .clone();
    let (pp, spp) = plan
        .schemas()
        .provisioning_parameters
        .process(object(raw))
        .expect("provisioning parameters should validate");
    Instance {
        instance_id: instance_id.to_string(),
        service: service.clone(),
        plan,
        provisioning_parameters: pp,
        secure_provisioning_parameters: spp,
        updating_parameters: None,
        details: service.manager().empty_instance_details(),
        secure_details: DetailsMap::new(),
        parent,
    }
}

pub async fn seed_record(store: &MemoryStore, instance: &Instance) {
    store
        .save(instance.to_record(InstanceStatus::Provisioning {
            step: String::new(),
        }))
        .await
        .unwrap();
}
