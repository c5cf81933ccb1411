//! Azure SQL failover-group module: disaster-recovery services built from a
//! registered server pair, databases deployed on both sides, and the
//! failover group joining them. Only offered when DR services are enabled in
//! the catalog configuration.

mod common;
mod database_pair;
mod database_pair_fe;
mod database_pair_registered;
mod dbms_pair_registered;
mod details;
mod plan;

pub use database_pair::DatabasePairManager;
pub use database_pair_fe::DatabasePairFromExistingManager;
pub use database_pair_registered::DatabasePairRegisteredManager;
pub use dbms_pair_registered::DbmsPairRegisteredManager;
pub use details::{
    DatabasePairFeInstanceDetails, DatabasePairInstanceDetails,
    DatabasePairRegisteredInstanceDetails, DbmsPairInstanceDetails,
    SecureDbmsPairInstanceDetails,
};
pub use plan::{DtuPairPlanDetails, VCorePairPlanDetails};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use asb_core::{
    InputParametersSchema, Plan, PlanDetails, PlanProperties, PlanSchemas, ServiceMetadata,
    ServicePlanMetadata, ServiceProperties, Stability,
};
use asb_engine::{
    ArmDeployer, Catalog, CatalogError, ConnectionProbe, DatabasesClient, FailoverGroupsClient,
    Module, ServersClient, Service,
};

use common::dbms_pair_provision_schema;

const DBMS_PAIR_REGISTERED_SERVICE_ID: &str = "8aaa462f-2aa9-4b35-bc4c-62dba9c6a69b";
const DATABASE_PAIR_SERVICE_ID: &str = "2eb94a7e-5a7c-46f9-b9d2-ff769f215845";
const DATABASE_PAIR_REGISTERED_SERVICE_ID: &str = "c6af17f5-4f17-4e3a-9f4b-ed9ec6ff9dcf";
const DATABASE_PAIR_FE_SERVICE_ID: &str = "5b12d6ed-0b4c-4b12-9e0c-3a9eaf91ba97";

/// The failover-group module: four services over four managers.
pub struct MssqlFgModule {
    dbms_pair_registered: Arc<DbmsPairRegisteredManager>,
    database_pair: Arc<DatabasePairManager>,
    database_pair_registered: Arc<DatabasePairRegisteredManager>,
    database_pair_fe: Arc<DatabasePairFromExistingManager>,
}

impl MssqlFgModule {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        servers: Arc<dyn ServersClient>,
        databases: Arc<dyn DatabasesClient>,
        failover_groups: Arc<dyn FailoverGroupsClient>,
        probe: Arc<dyn ConnectionProbe>,
        dns_suffix: impl Into<String>,
    ) -> MssqlFgModule {
        MssqlFgModule {
            dbms_pair_registered: Arc::new(DbmsPairRegisteredManager::new(
                arm.clone(),
                servers,
                probe,
                dns_suffix,
            )),
            database_pair: Arc::new(DatabasePairManager::new(
                arm.clone(),
                databases.clone(),
                failover_groups.clone(),
            )),
            database_pair_registered: Arc::new(DatabasePairRegisteredManager::new(
                databases.clone(),
                failover_groups,
            )),
            database_pair_fe: Arc::new(DatabasePairFromExistingManager::new(arm, databases)),
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
        stability: Stability::Preview,
        metadata,
        schemas: PlanSchemas {
            provisioning_parameters: details.provision_schema(),
            updating_parameters: Some(details.update_schema()),
        },
        tier_details: Some(details),
        extended: BTreeMap::new(),
    })
}

fn basic_pair_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "basic",
        "Basic Tier, 5 DTUs, 2GB Storage, 7 days point-in-time restore",
        ServicePlanMetadata {
            display_name: "Basic Tier".to_string(),
            bullets: vec!["5 DTUs".to_string(), "Includes 2GB Storage".to_string()],
        },
        Arc::new(DtuPairPlanDetails {
            tier_name: "Basic",
            sku_map: BTreeMap::from([(5, "Basic")]),
            allowed_dtus: vec![],
            default_dtus: 5,
            storage_gb: 2,
        }),
    )
}

fn standard_pair_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "standard",
        "Standard Tier, Up to 3000 DTUs, 250GB Storage, 35 days point-in-time restore",
        ServicePlanMetadata {
            display_name: "Standard Tier".to_string(),
            bullets: vec!["10-3000 DTUs".to_string(), "250GB".to_string()],
        },
        Arc::new(DtuPairPlanDetails {
            tier_name: "Standard",
            sku_map: BTreeMap::from([
                (10, "S0"),
                (20, "S1"),
                (50, "S2"),
                (100, "S3"),
                (200, "S4"),
                (400, "S6"),
                (800, "S7"),
                (1600, "S9"),
                (3000, "S12"),
            ]),
            allowed_dtus: vec![10, 20, 50, 100, 200, 400, 800, 1600, 3000],
            default_dtus: 10,
            storage_gb: 250,
        }),
    )
}

fn premium_pair_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "premium",
        "Premium Tier, Up to 4000 DTUs, 500GB Storage, 35 days point-in-time restore",
        ServicePlanMetadata {
            display_name: "Premium Tier".to_string(),
            bullets: vec!["Up to 4000 DTUs".to_string(), "Includes 500GB Storage".to_string()],
        },
        Arc::new(DtuPairPlanDetails {
            tier_name: "Premium",
            sku_map: BTreeMap::from([
                (125, "P1"),
                (250, "P2"),
                (500, "P4"),
                (1000, "P6"),
                (1750, "P11"),
                (4000, "P15"),
            ]),
            allowed_dtus: vec![125, 250, 500, 1000, 1750, 4000],
            default_dtus: 125,
            storage_gb: 500,
        }),
    )
}

fn general_purpose_pair_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "general-purpose",
        "Up to 80 vCores, 440 GB memory and 1 TB of storage (preview)",
        ServicePlanMetadata {
            display_name: "General Purpose (preview)".to_string(),
            bullets: vec!["Up to 80 vCores".to_string(), "Up to 440 GB memory".to_string()],
        },
        Arc::new(VCorePairPlanDetails {
            tier_name: "GeneralPurpose",
            tier_short_name: "GP",
        }),
    )
}

fn business_critical_pair_plan(id: &str) -> Plan {
    tier_plan(
        id,
        "business-critical",
        "Up to 80 vCores, 440 GB memory and 1 TB of storage. \
         Local SSD, highest resilience to failures. (preview)",
        ServicePlanMetadata {
            display_name: "Business Critical (preview)".to_string(),
            bullets: vec!["Up to 80 vCores".to_string(), "Up to 440 GB memory".to_string()],
        },
        Arc::new(VCorePairPlanDetails {
            tier_name: "BusinessCritical",
            tier_short_name: "BC",
        }),
    )
}

fn registered_plan(id: &str, name: &str, description: &str, schema: InputParametersSchema) -> Plan {
    Plan::new(PlanProperties {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        free: false,
        stability: Stability::Preview,
        metadata: ServicePlanMetadata {
            display_name: description.to_string(),
            bullets: vec![],
        },
        schemas: PlanSchemas {
            provisioning_parameters: schema,
            updating_parameters: None,
        },
        tier_details: None,
        extended: BTreeMap::new(),
    })
}

fn service_metadata(display_name: &str, long_description: &str) -> ServiceMetadata {
    ServiceMetadata {
        display_name: display_name.to_string(),
        image_url: "https://azure.microsoft.com/svghandler/sql-database/?width=200".to_string(),
        long_description: long_description.to_string(),
        documentation_url: "https://docs.microsoft.com/en-us/azure/sql-database/".to_string(),
        support_url: "https://azure.microsoft.com/en-us/support/".to_string(),
    }
}

fn sql_extended() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([("version".to_string(), json!("12.0"))])
}

fn sql_tags() -> Vec<String> {
    vec![
        "Azure".to_string(),
        "SQL".to_string(),
        "Database".to_string(),
        "Failover".to_string(),
        "DR".to_string(),
    ]
}

impl Module for MssqlFgModule {
    fn name(&self) -> &'static str {
        "mssqlfg"
    }

    fn disaster_recovery(&self) -> bool {
        true
    }

    fn catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::new(vec![
            // registered server pair
            Service::new(
                ServiceProperties {
                    id: DBMS_PAIR_REGISTERED_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dr-dbms-pair-registered".to_string(),
                    description: "Azure SQL 12.0-- DR DBMS pair registered".to_string(),
                    child_service_id: Some(DATABASE_PAIR_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DR DBMS Pair registered",
                        "Azure SQL 12.0-- DR DBMS pair registered",
                    ),
                    bindable: false,
                    tags: sql_tags(),
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.dbms_pair_registered.clone(),
                vec![registered_plan(
                    "4a4c2b67-3bf2-4d53-9dc8-5528f5af05d4",
                    "dbms",
                    "Azure SQL Server-- DBMS pair registered",
                    dbms_pair_provision_schema(),
                )],
            ),
            // database pair
            Service::new(
                ServiceProperties {
                    id: DATABASE_PAIR_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dr-database-pair".to_string(),
                    description: "Azure SQL 12.0-- DR database pair".to_string(),
                    parent_service_id: Some(DBMS_PAIR_REGISTERED_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DR Database Pair",
                        "Azure SQL 12.0-- DR database pair",
                    ),
                    bindable: true,
                    tags: sql_tags(),
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.database_pair.clone(),
                vec![
                    basic_pair_plan("5a75ffc1-555d-4193-b60b-eb464069f913"),
                    standard_pair_plan("9d36b6b3-b5f3-4907-a713-5cc13b785409"),
                    premium_pair_plan("220e922a-a5b2-43e4-9388-fe45a32bbf31"),
                    general_purpose_pair_plan("e5e38c01-a077-41b7-badc-d7f7ca0ae7aa"),
                    business_critical_pair_plan("b8cf1c55-4707-4d3c-b2e4-5a1a66bbe24e"),
                ],
            ),
            // database pair registered
            Service::new(
                ServiceProperties {
                    id: DATABASE_PAIR_REGISTERED_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dr-database-pair-registered".to_string(),
                    description: "Azure SQL 12.0-- DR database pair registered".to_string(),
                    parent_service_id: Some(DBMS_PAIR_REGISTERED_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DR Database Pair registered",
                        "Azure SQL 12.0-- DR database pair registered",
                    ),
                    bindable: true,
                    tags: sql_tags(),
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.database_pair_registered.clone(),
                vec![registered_plan(
                    "1119f6f0-78ee-4eea-9d2f-9c8ea9315a05",
                    "database",
                    "Azure SQL-- database pair registered",
                    DatabasePairRegisteredManager::provision_schema(),
                )],
            ),
            // database pair from existing primary
            Service::new(
                ServiceProperties {
                    id: DATABASE_PAIR_FE_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dr-database-pair-from-existing".to_string(),
                    description: "Azure SQL 12.0-- DR database pair from existing primary"
                        .to_string(),
                    parent_service_id: Some(DBMS_PAIR_REGISTERED_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DR Database Pair from existing",
                        "Azure SQL 12.0-- DR database pair from existing primary",
                    ),
                    bindable: true,
                    tags: sql_tags(),
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.database_pair_fe.clone(),
                vec![
                    basic_pair_plan("1867b269-6a0c-4858-af0d-7b1a79cd8b14"),
                    standard_pair_plan("03c118dc-bf5e-4a22-a3f6-0e2f75d631ab"),
                    premium_pair_plan("8bf42b83-6f5e-4bb8-907b-0e9e1e1e0ce9"),
                    general_purpose_pair_plan("da591616-77a1-4df8-a493-6c119649bc6b"),
                    business_critical_pair_plan("edf43c21-4f33-4d3e-b4b8-b15a1c19b5c2"),
                ],
            ),
        ]))
    }
}
