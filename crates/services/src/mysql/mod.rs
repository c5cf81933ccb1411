//! Azure Database for MySQL module: all-in-one, DBMS-only, and
//! database-only variants.

mod all_in_one;
mod common;
mod database;
mod dbms;
mod details;
mod plan;

pub use all_in_one::AllInOneManager;
pub use database::DatabaseManager;
pub use dbms::DbmsManager;
pub use details::{
    AllInOneInstanceDetails, DatabaseInstanceDetails, DbmsInstanceDetails,
    SecureDbmsInstanceDetails,
};
pub use plan::ServerTierDetails;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use asb_core::{
    InputParametersSchema, Plan, PlanDetails, PlanProperties, PlanSchemas, ServiceMetadata,
    ServicePlanMetadata, ServiceProperties, Stability,
};
use asb_engine::{ArmDeployer, Catalog, CatalogError, Module, Service};

const ALL_IN_ONE_SERVICE_ID: &str = "3c715189-9843-4d8b-bb21-6ae653ad95c5";
const DBMS_SERVICE_ID: &str = "8d1c2e4f-11d6-45b6-9c80-7a1b4f1e2ab4";
const DATABASE_SERVICE_ID: &str = "e1d793ea-8115-4a11-a3a8-8c5ee68cc24a";

/// The MySQL module: three services over three managers.
pub struct MysqlModule {
    all_in_one: Arc<AllInOneManager>,
    dbms: Arc<DbmsManager>,
    database: Arc<DatabaseManager>,
}

impl MysqlModule {
    pub fn new(arm: Arc<dyn ArmDeployer>) -> MysqlModule {
        MysqlModule {
            all_in_one: Arc::new(AllInOneManager::new(arm.clone())),
            dbms: Arc::new(DbmsManager::new(arm.clone())),
            database: Arc::new(DatabaseManager::new(arm)),
        }
    }
}

// ──────────────────────────────────────────────
// Plan builders
// ──────────────────────────────────────────────

fn tier_plan(
    id: &str,
    name: &str,
    description: &str,
    metadata: ServicePlanMetadata,
    details: Arc<dyn PlanDetails>,
) -> Plan {
    Plan::new(PlanProperties {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        free: false,
        stability: Stability::Stable,
        metadata,
        schemas: PlanSchemas {
            provisioning_parameters: details.provision_schema(),
            updating_parameters: Some(details.update_schema()),
        },
        tier_details: Some(details),
        extended: BTreeMap::new(),
    })
}

fn basic_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "basic",
        "Basic Tier-- For workloads that require light compute and I/O performance.",
        ServicePlanMetadata {
            display_name: "Basic Tier".to_string(),
            bullets: vec![
                "Up to 2 vCores".to_string(),
                "Variable I/O performance".to_string(),
            ],
        },
        Arc::new(ServerTierDetails {
            tier_name: "Basic",
            tier_short_name: "B",
            allowed_cores: vec![1, 2],
            default_cores: 1,
            max_storage_gb: 1024,
            allowed_backup_redundancy: vec!["local"],
        }),
    )
}

fn general_purpose_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "general-purpose",
        "General Purpose Tier-- For most business workloads that require balanced compute \
         and memory with scalable I/O throughput.",
        ServicePlanMetadata {
            display_name: "General Purpose Tier".to_string(),
            bullets: vec![
                "Up to 32 vCores".to_string(),
                "Predictable I/O Performance".to_string(),
                "Local or Geo-Redundant Backups".to_string(),
            ],
        },
        Arc::new(ServerTierDetails {
            tier_name: "GeneralPurpose",
            tier_short_name: "GP",
            allowed_cores: vec![2, 4, 8, 16, 32],
            default_cores: 2,
            max_storage_gb: 2048,
            allowed_backup_redundancy: vec!["local", "geo"],
        }),
    )
}

fn memory_optimized_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "memory-optimized",
        "Memory Optimized Tier-- For high-performance database workloads that require \
         in-memory performance for faster transaction processing and higher concurrency.",
        ServicePlanMetadata {
            display_name: "Memory Optimized Tier".to_string(),
            bullets: vec![
                "Up to 16 memory optimized vCores".to_string(),
                "Predictable I/O Performance".to_string(),
                "Local or Geo-Redundant Backups".to_string(),
            ],
        },
        Arc::new(ServerTierDetails {
            tier_name: "MemoryOptimized",
            tier_short_name: "MO",
            allowed_cores: vec![2, 4, 8, 16],
            default_cores: 2,
            max_storage_gb: 2048,
            allowed_backup_redundancy: vec!["local", "geo"],
        }),
    )
}

fn database_plan(id: &str) -> Plan {
    Plan::new(PlanProperties {
        id: id.to_string(),
        name: "database".to_string(),
        description: "A database on an existing MySQL DBMS".to_string(),
        free: false,
        stability: Stability::Stable,
        metadata: ServicePlanMetadata {
            display_name: "Azure Database for MySQL-- Database Only".to_string(),
            bullets: vec![],
        },
        schemas: PlanSchemas {
            provisioning_parameters: InputParametersSchema::default(),
            updating_parameters: None,
        },
        tier_details: None,
        extended: BTreeMap::new(),
    })
}

fn service_metadata(display_name: &str, long_description: &str) -> ServiceMetadata {
    ServiceMetadata {
        display_name: display_name.to_string(),
        image_url: "https://azure.microsoft.com/svghandler/mysql/?width=200".to_string(),
        long_description: long_description.to_string(),
        documentation_url: "https://docs.microsoft.com/en-us/azure/mysql/".to_string(),
        support_url: "https://azure.microsoft.com/en-us/support/".to_string(),
    }
}

fn mysql_extended() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([("version".to_string(), json!("5.7"))])
}

fn mysql_tags() -> Vec<String> {
    vec![
        "Azure".to_string(),
        "MySQL".to_string(),
        "DBMS".to_string(),
        "Server".to_string(),
        "Database".to_string(),
    ]
}

impl Module for MysqlModule {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::new(vec![
            Service::new(
                ServiceProperties {
                    id: ALL_IN_ONE_SERVICE_ID.to_string(),
                    name: "azure-mysql-5-7".to_string(),
                    description: "Azure Database for MySQL 5.7-- DBMS and single database"
                        .to_string(),
                    metadata: service_metadata(
                        "Azure Database for MySQL 5.7",
                        "Azure Database for MySQL 5.7-- DBMS and single database",
                    ),
                    bindable: true,
                    tags: mysql_tags(),
                    extended: mysql_extended(),
                    ..Default::default()
                },
                self.all_in_one.clone(),
                vec![
                    basic_plan("284806af-1689-4d02-8ffb-19509483202f"),
                    general_purpose_plan("643038f4-0343-4d94-8daf-738334ede7b6"),
                    memory_optimized_plan("18ff0626-7122-4803-a66a-b59b6ccbb795"),
                ],
            ),
            Service::new(
                ServiceProperties {
                    id: DBMS_SERVICE_ID.to_string(),
                    name: "azure-mysql-5-7-dbms".to_string(),
                    description: "Azure Database for MySQL 5.7-- DBMS only".to_string(),
                    child_service_id: Some(DATABASE_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure Database for MySQL 5.7-- DBMS Only",
                        "Azure Database for MySQL 5.7-- DBMS only",
                    ),
                    bindable: false,
                    tags: mysql_tags(),
                    extended: mysql_extended(),
                    ..Default::default()
                },
                self.dbms.clone(),
                vec![
                    basic_plan("59b83974-c13e-4458-9e9b-9cd0e6ae0b57"),
                    general_purpose_plan("eb0ffb54-6c23-4643-8e04-b9690a9b24e2"),
                    memory_optimized_plan("66e74aa5-dee4-4c1a-9f4b-f5107a8b25c8"),
                ],
            ),
            Service::new(
                ServiceProperties {
                    id: DATABASE_SERVICE_ID.to_string(),
                    name: "azure-mysql-5-7-database".to_string(),
                    description: "Azure Database for MySQL 5.7-- database only".to_string(),
                    parent_service_id: Some(DBMS_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure Database for MySQL 5.7-- Database Only",
                        "Azure Database for MySQL 5.7-- database only",
                    ),
                    bindable: true,
                    tags: vec![
                        "Azure".to_string(),
                        "MySQL".to_string(),
                        "Database".to_string(),
                    ],
                    extended: mysql_extended(),
                    ..Default::default()
                },
                self.database.clone(),
                vec![database_plan("c6a3caa4-4e3f-4a2a-a62d-2323c261ac26")],
            ),
        ]))
    }
}
