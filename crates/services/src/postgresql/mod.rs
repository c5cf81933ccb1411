//! Azure Database for PostgreSQL module: all-in-one, DBMS-only, and
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
pub use plan::PostgresTierDetails;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use asb_core::{
    InputParametersSchema, Plan, PlanDetails, PlanProperties, PlanSchemas, ServiceMetadata,
    ServicePlanMetadata, ServiceProperties, Stability,
};
use asb_engine::{ArmDeployer, Catalog, CatalogError, Module, Service};

use plan::extensions_schema;

const ALL_IN_ONE_SERVICE_ID: &str = "25434f16-d762-41c7-bbdd-8045d7f74ca6";
const DBMS_SERVICE_ID: &str = "d3f74b44-79bc-4d1e-bf7d-c247c2b851f9";
const DATABASE_SERVICE_ID: &str = "25d31b38-5d07-4b83-b9c8-eb3e2fa99eba";

/// The PostgreSQL module: three services over three managers.
pub struct PostgresqlModule {
    all_in_one: Arc<AllInOneManager>,
    dbms: Arc<DbmsManager>,
    database: Arc<DatabaseManager>,
}

impl PostgresqlModule {
    pub fn new(arm: Arc<dyn ArmDeployer>) -> PostgresqlModule {
        PostgresqlModule {
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
        Arc::new(PostgresTierDetails {
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
                "Up to 64 vCores".to_string(),
                "Predictable I/O Performance".to_string(),
                "Local or Geo-Redundant Backups".to_string(),
            ],
        },
        Arc::new(PostgresTierDetails {
            tier_name: "GeneralPurpose",
            tier_short_name: "GP",
            allowed_cores: vec![2, 4, 8, 16, 32, 64],
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
                "Up to 32 memory optimized vCores".to_string(),
                "Predictable I/O Performance".to_string(),
                "Local or Geo-Redundant Backups".to_string(),
            ],
        },
        Arc::new(PostgresTierDetails {
            tier_name: "MemoryOptimized",
            tier_short_name: "MO",
            allowed_cores: vec![2, 4, 8, 16, 32],
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
        description: "A database on an existing PostgreSQL DBMS".to_string(),
        free: false,
        stability: Stability::Stable,
        metadata: ServicePlanMetadata {
            display_name: "Azure Database for PostgreSQL-- Database Only".to_string(),
            bullets: vec![],
        },
        schemas: PlanSchemas {
            provisioning_parameters: InputParametersSchema {
                property_schemas: std::collections::BTreeMap::from([(
                    "extensions".to_string(),
                    extensions_schema(),
                )]),
                ..Default::default()
            },
            updating_parameters: None,
        },
        tier_details: None,
        extended: BTreeMap::new(),
    })
}

fn service_metadata(display_name: &str, long_description: &str) -> ServiceMetadata {
    ServiceMetadata {
        display_name: display_name.to_string(),
        image_url: "https://azure.microsoft.com/svghandler/postgresql/?width=200".to_string(),
        long_description: long_description.to_string(),
        documentation_url: "https://docs.microsoft.com/en-us/azure/postgresql/".to_string(),
        support_url: "https://azure.microsoft.com/en-us/support/".to_string(),
    }
}

fn postgresql_extended() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([("version".to_string(), json!("11"))])
}

fn postgresql_tags() -> Vec<String> {
    vec![
        "Azure".to_string(),
        "PostgreSQL".to_string(),
        "DBMS".to_string(),
        "Server".to_string(),
        "Database".to_string(),
    ]
}

impl Module for PostgresqlModule {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::new(vec![
            Service::new(
                ServiceProperties {
                    id: ALL_IN_ONE_SERVICE_ID.to_string(),
                    name: "azure-postgresql-11".to_string(),
                    description: "Azure Database for PostgreSQL 11-- DBMS and single database"
                        .to_string(),
                    metadata: service_metadata(
                        "Azure Database for PostgreSQL 11",
                        "Azure Database for PostgreSQL 11-- DBMS and single database",
                    ),
                    bindable: true,
                    tags: postgresql_tags(),
                    extended: postgresql_extended(),
                    ..Default::default()
                },
                self.all_in_one.clone(),
                vec![
                    basic_plan("4c4ad2bd-e6a9-4f9c-97f3-c118e5e8bd3a"),
                    general_purpose_plan("9b40e563-4335-4ac6-b496-46d06a37f1e6"),
                    memory_optimized_plan("cbc0f75e-4b88-4db1-b2e4-17f9b4e29d0a"),
                ],
            ),
            Service::new(
                ServiceProperties {
                    id: DBMS_SERVICE_ID.to_string(),
                    name: "azure-postgresql-11-dbms".to_string(),
                    description: "Azure Database for PostgreSQL 11-- DBMS only".to_string(),
                    child_service_id: Some(DATABASE_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure Database for PostgreSQL 11-- DBMS Only",
                        "Azure Database for PostgreSQL 11-- DBMS only",
                    ),
                    bindable: false,
                    tags: postgresql_tags(),
                    extended: postgresql_extended(),
                    ..Default::default()
                },
                self.dbms.clone(),
                vec![
                    basic_plan("843a7317-5f53-4f24-b1cc-3e0c2c37cf64"),
                    general_purpose_plan("9e8f5a82-8b90-48b9-9b23-69d34fe9e4ce"),
                    memory_optimized_plan("8e605af9-6c08-4f19-a0ee-0a79e4b4a2ad"),
                ],
            ),
            Service::new(
                ServiceProperties {
                    id: DATABASE_SERVICE_ID.to_string(),
                    name: "azure-postgresql-11-database".to_string(),
                    description: "Azure Database for PostgreSQL 11-- database only".to_string(),
                    parent_service_id: Some(DBMS_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure Database for PostgreSQL 11-- Database Only",
                        "Azure Database for PostgreSQL 11-- database only",
                    ),
                    bindable: true,
                    tags: vec![
                        "Azure".to_string(),
                        "PostgreSQL".to_string(),
                        "Database".to_string(),
                    ],
                    extended: postgresql_extended(),
                    ..Default::default()
                },
                self.database.clone(),
                vec![database_plan("59f7b82b-1e77-47b4-9c31-24fa2f2c54bf")],
            ),
        ]))
    }
}
