//! Azure SQL Database module: all-in-one, DBMS-only, database-only,
//! registered, and from-existing variants.

mod all_in_one;
mod common;
mod database;
mod database_fe;
mod dbms;
mod dbms_registered;
mod details;
pub(crate) mod plan;

pub use all_in_one::AllInOneManager;
pub use database::DatabaseManager;
pub use database_fe::DatabaseFromExistingManager;
pub use dbms::DbmsManager;
pub use dbms_registered::DbmsRegisteredManager;
pub use details::{
    AllInOneInstanceDetails, DatabaseInstanceDetails, DbmsInstanceDetails,
    SecureDbmsInstanceDetails,
};
pub use plan::{DtuPlanDetails, VCorePlanDetails};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use asb_core::{
    InputParametersSchema, Plan, PlanDetails, PlanProperties, PlanSchemas, PropertySchema,
    ServiceMetadata, ServicePlanMetadata, ServiceProperties, Stability, StringPropertySchema,
};
use asb_engine::{
    ArmDeployer, Catalog, CatalogError, ConnectionProbe, DatabasesClient, Module, ServersClient,
    Service,
};

const ALL_IN_ONE_SERVICE_ID: &str = "aa62bb24-1d49-4f2d-905a-d387ae339f3a";
const DBMS_SERVICE_ID: &str = "3d07f78a-e15c-4f26-ae82-62a963a7162d";
const DATABASE_SERVICE_ID: &str = "94e4429c-1dd9-4e50-855f-6af2a0f8756e";
const DBMS_REGISTERED_SERVICE_ID: &str = "97c5a775-333f-42a1-bfca-16819ddf7e2e";
const DATABASE_FE_SERVICE_ID: &str = "0938a2d1-3490-41fc-a095-d235debff907";

/// The Azure SQL module: five services over five managers.
pub struct MssqlModule {
    all_in_one: Arc<AllInOneManager>,
    dbms: Arc<DbmsManager>,
    dbms_registered: Arc<DbmsRegisteredManager>,
    database: Arc<DatabaseManager>,
    database_fe: Arc<DatabaseFromExistingManager>,
}

impl MssqlModule {
    pub fn new(
        arm: Arc<dyn ArmDeployer>,
        servers: Arc<dyn ServersClient>,
        databases: Arc<dyn DatabasesClient>,
        probe: Arc<dyn ConnectionProbe>,
        dns_suffix: impl Into<String>,
    ) -> MssqlModule {
        let dns_suffix = dns_suffix.into();
        MssqlModule {
            all_in_one: Arc::new(AllInOneManager::new(arm.clone())),
            dbms: Arc::new(DbmsManager::new(arm.clone())),
            dbms_registered: Arc::new(DbmsRegisteredManager::new(
                arm.clone(),
                servers,
                probe,
                dns_suffix,
            )),
            database: Arc::new(DatabaseManager::new(arm.clone())),
            database_fe: Arc::new(DatabaseFromExistingManager::new(arm, databases)),
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
    stability: Stability,
    metadata: ServicePlanMetadata,
    details: Arc<dyn PlanDetails>,
    fe: bool,
) -> Plan {
    let mut provisioning = details.provision_schema();
    if fe {
        provisioning.required_properties.push("database".to_string());
        provisioning.property_schemas.insert(
            "database".to_string(),
            PropertySchema::String(StringPropertySchema {
                description: "The name of the existing database".to_string(),
                ..Default::default()
            }),
        );
    }
    Plan::new(PlanProperties {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        free: false,
        stability,
        metadata,
        schemas: PlanSchemas {
            provisioning_parameters: provisioning,
            updating_parameters: Some(details.update_schema()),
        },
        tier_details: Some(details),
        extended: BTreeMap::new(),
    })
}

fn basic_plan(id: &str, include_dbms: bool, fe: bool) -> Plan {
    tier_plan(
        id,
        "basic",
        "Basic Tier, 5 DTUs, 2GB Storage, 7 days point-in-time restore",
        Stability::Stable,
        ServicePlanMetadata {
            display_name: "Basic Tier".to_string(),
            bullets: vec![
                "5 DTUs".to_string(),
                "Includes 2GB Storage".to_string(),
                "7 days point-in-time restore".to_string(),
            ],
        },
        Arc::new(DtuPlanDetails {
            tier_name: "Basic",
            sku_map: BTreeMap::from([(5, "Basic")]),
            allowed_dtus: vec![],
            default_dtus: 5,
            storage_gb: 2,
            include_dbms,
        }),
        fe,
    )
}

fn standard_plan(id: &str, include_dbms: bool, fe: bool) -> Plan {
    tier_plan(
        id,
        "standard",
        "Standard Tier, Up to 3000 DTUs, 250GB Storage, 35 days point-in-time restore",
        Stability::Stable,
        ServicePlanMetadata {
            display_name: "Standard Tier".to_string(),
            bullets: vec![
                "10-3000 DTUs".to_string(),
                "250GB".to_string(),
                "35 days point-in-time restore".to_string(),
            ],
        },
        Arc::new(DtuPlanDetails {
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
            include_dbms,
        }),
        fe,
    )
}

fn premium_plan(id: &str, include_dbms: bool, fe: bool) -> Plan {
    tier_plan(
        id,
        "premium",
        "Premium Tier, Up to 4000 DTUs, 500GB Storage, 35 days point-in-time restore",
        Stability::Stable,
        ServicePlanMetadata {
            display_name: "Premium Tier".to_string(),
            bullets: vec![
                "Up to 4000 DTUs".to_string(),
                "Includes 500GB Storage".to_string(),
                "35 days point-in-time restore".to_string(),
            ],
        },
        Arc::new(DtuPlanDetails {
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
            include_dbms,
        }),
        fe,
    )
}

fn general_purpose_plan(id: &str, include_dbms: bool, fe: bool) -> Plan {
    tier_plan(
        id,
        "general-purpose",
        "Up to 80 vCores, 440 GB memory and 1 TB of storage (preview)",
        Stability::Preview,
        ServicePlanMetadata {
            display_name: "General Purpose (preview)".to_string(),
            bullets: vec![
                "Scalable compute and storage options for budget-oriented applications"
                    .to_string(),
                "Up to 80 vCores".to_string(),
                "Up to 440 GB memory".to_string(),
                "7 days point-in-time restore".to_string(),
            ],
        },
        Arc::new(VCorePlanDetails {
            tier_name: "GeneralPurpose",
            tier_short_name: "GP",
            include_dbms,
        }),
        fe,
    )
}

fn business_critical_plan(id: &str, include_dbms: bool, fe: bool) -> Plan {
    tier_plan(
        id,
        "business-critical",
        "Up to 80 vCores, 440 GB memory and 1 TB of storage. \
         Local SSD, highest resilience to failures. (preview)",
        Stability::Preview,
        ServicePlanMetadata {
            display_name: "Business Critical (preview)".to_string(),
            bullets: vec![
                "Up to 80 vCores".to_string(),
                "Up to 440 GB memory".to_string(),
                "7 days point-in-time restore".to_string(),
            ],
        },
        Arc::new(VCorePlanDetails {
            tier_name: "BusinessCritical",
            tier_short_name: "BC",
            include_dbms,
        }),
        fe,
    )
}

fn dbms_plan(
    id: &str,
    schema: InputParametersSchema,
    updating: Option<InputParametersSchema>,
) -> Plan {
    Plan::new(PlanProperties {
        id: id.to_string(),
        name: "dbms".to_string(),
        description: "Azure SQL Server-- DBMS only".to_string(),
        free: false,
        stability: Stability::Preview,
        metadata: ServicePlanMetadata {
            display_name: "Azure SQL Server-- DBMS Only".to_string(),
            bullets: vec![],
        },
        schemas: PlanSchemas {
            provisioning_parameters: schema,
            updating_parameters: updating,
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

impl Module for MssqlModule {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::new(vec![
            // all-in-one (dbms and database) service
            Service::new(
                ServiceProperties {
                    id: ALL_IN_ONE_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0".to_string(),
                    description: "Azure SQL Database 12.0-- DBMS and single database".to_string(),
                    metadata: service_metadata(
                        "Azure SQL Database 12.0",
                        "Azure SQL Database 12.0-- DBMS and single database",
                    ),
                    bindable: true,
                    tags: vec![
                        "Azure".to_string(),
                        "SQL".to_string(),
                        "DBMS".to_string(),
                        "Server".to_string(),
                        "Database".to_string(),
                    ],
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.all_in_one.clone(),
                vec![
                    basic_plan("63d62185-d277-4735-96d6-b7cf6a6d128a", true, false),
                    standard_plan("e5c5d63d-e32f-47ff-9e57-be72872405be", true, false),
                    premium_plan("ebc10094-7d57-4e59-86f6-e1204632f0e5", true, false),
                    general_purpose_plan("fcdce498-a183-4031-96e6-229815a4d75c", true, false),
                    business_critical_plan("81300e34-43d8-456c-bd25-7b760592f138", true, false),
                ],
            ),
            // dbms only service
            Service::new(
                ServiceProperties {
                    id: DBMS_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dbms".to_string(),
                    description: "Azure SQL 12.0-- DBMS only".to_string(),
                    child_service_id: Some(DATABASE_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DBMS Only",
                        "Azure SQL 12.0-- DBMS only",
                    ),
                    bindable: false,
                    tags: vec![
                        "Azure".to_string(),
                        "SQL".to_string(),
                        "DBMS".to_string(),
                        "Server".to_string(),
                    ],
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.dbms.clone(),
                vec![dbms_plan(
                    "d98d557a-983e-4c96-a928-926288583975",
                    DbmsManager::provision_schema(),
                    Some(DbmsManager::update_schema()),
                )],
            ),
            // database only service
            Service::new(
                ServiceProperties {
                    id: DATABASE_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-database".to_string(),
                    description: "Azure SQL 12.0-- database only".to_string(),
                    parent_service_id: Some(DBMS_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- Database Only",
                        "Azure SQL 12.0-- database only",
                    ),
                    bindable: true,
                    tags: vec![
                        "Azure".to_string(),
                        "SQL".to_string(),
                        "Database".to_string(),
                    ],
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.database.clone(),
                vec![
                    basic_plan("756ccc03-e701-4336-a5cd-ea0cf22e597c", false, false),
                    standard_plan("f9613acc-6ffd-4c9e-acdf-7631d971e7dc", false, false),
                    premium_plan("df706b83-cf8e-4e88-bd67-ce7feecef7c8", false, false),
                    general_purpose_plan("8bcd1643-b02c-4d71-8860-c31adae10a6b", false, false),
                    business_critical_plan("9f506da2-4f31-4e1b-85b8-9a5dbf380a0f", false, false),
                ],
            ),
            // dbms only registered service
            Service::new(
                ServiceProperties {
                    id: DBMS_REGISTERED_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-dbms-registered".to_string(),
                    description: "Azure SQL 12.0-- DBMS only registered".to_string(),
                    child_service_id: Some(DATABASE_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- DBMS Only registered",
                        "Azure SQL 12.0-- DBMS only registered",
                    ),
                    bindable: false,
                    tags: vec![
                        "Azure".to_string(),
                        "SQL".to_string(),
                        "DBMS".to_string(),
                        "Server".to_string(),
                    ],
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.dbms_registered.clone(),
                vec![dbms_plan(
                    "840399dd-5593-493e-80c1-3b21f687997d",
                    DbmsRegisteredManager::provision_schema(),
                    None,
                )],
            ),
            // database only from existing service
            Service::new(
                ServiceProperties {
                    id: DATABASE_FE_SERVICE_ID.to_string(),
                    name: "azure-sql-12-0-database-from-existing".to_string(),
                    description: "Azure SQL 12.0-- database only from existing".to_string(),
                    parent_service_id: Some(DBMS_SERVICE_ID.to_string()),
                    metadata: service_metadata(
                        "Azure SQL 12.0-- Database Only from existing",
                        "Azure SQL 12.0-- database only from existing",
                    ),
                    bindable: true,
                    tags: vec![
                        "Azure".to_string(),
                        "SQL".to_string(),
                        "Database".to_string(),
                    ],
                    extended: sql_extended(),
                    ..Default::default()
                },
                self.database_fe.clone(),
                vec![
                    basic_plan("fc2f3117-2539-414d-b5ab-f047fc4c93d4", false, true),
                    standard_plan("fb475332-23ee-4aca-953e-55fc97577d01", false, true),
                    premium_plan("6323a513-98ca-42ca-9ad5-6e78eff8a8fe", false, true),
                    general_purpose_plan("f64950ae-9ed3-4639-afa4-c85b1a2dc759", false, true),
                    business_critical_plan("666d2a9e-a566-4710-a07f-cf712c43701c", false, true),
                ],
            ),
        ]))
    }
}
