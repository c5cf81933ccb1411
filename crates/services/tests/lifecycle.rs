//! End-to-end lifecycle scenarios against the in-memory fakes: provision,
//! resume after failure, update, and deprovision across the service
//! families.

mod common;

use std::sync::Arc;

use serde_json::json;

use asb_core::UpdatingParameters;
use asb_engine::{
    encode_details, ArmDeployer, Module, PipelineError, PipelineRunner, ServerState, StepError,
};
use asb_services::mssql::{AllInOneInstanceDetails, DbmsInstanceDetails};
use asb_services::mssqlfg::DbmsPairInstanceDetails;
use asb_storage::{InstanceStatus, InstanceStore};

use common::{new_instance, object, seed_record, World, DNS_SUFFIX};

const GIB: i64 = 1 << 30;

// ──────────────────────────────────────────────
// Provisioning
// ──────────────────────────────────────────────

#[tokio::test]
async fn all_in_one_mssql_basic_provisions_end_to_end() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0").unwrap();

    let mut instance = new_instance(
        "aio-1",
        service,
        "basic",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    assert_eq!(
        provisioner.step_names(),
        vec!["preProvision", "deployARMTemplate"]
    );

    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: AllInOneInstanceDetails = instance.decode_details().unwrap();
    assert!(!details.arm_deployment_name.is_empty());
    assert!(!details.server_name.is_empty());
    assert_eq!(
        details.fully_qualified_domain_name.as_deref(),
        Some("srv.database.example.net")
    );

    // Basic tier: fixed SKU, 2 GB cap, deployed once into the requested group.
    let deployment = world.arm.deployment(&details.arm_deployment_name).unwrap();
    assert_eq!(deployment.resource_group, "prod-rg");
    assert_eq!(deployment.template_parameters["sku"], json!("Basic"));
    assert_eq!(
        deployment.template_parameters["maxSizeBytes"],
        json!(2 * GIB)
    );

    let record = world.store.get("aio-1").await.unwrap();
    assert_eq!(record.status, InstanceStatus::Provisioned);
    assert_eq!(record.details, instance.details);
}

#[tokio::test]
async fn dbms_registered_validates_probes_then_deploys() {
    let world = World::new();
    world.servers.put(
        "prod-rg",
        ServerState {
            name: "existing-sql".to_string(),
            version: "12.0".to_string(),
            location: "eastus".to_string(),
            fully_qualified_domain_name: format!("existing-sql.{DNS_SUFFIX}"),
        },
    );
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("existing-sql.database.example.net"));

    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-dbms-registered").unwrap();
    let mut instance = new_instance(
        "dbms-reg-1",
        service,
        "dbms",
        json!({
            "location": "eastus",
            "resourceGroup": "prod-rg",
            "server": "existing-sql",
            "administratorLogin": "azureuser",
            "administratorLoginPassword": "opensesame123A",
        }),
        None,
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    assert_eq!(
        provisioner.step_names(),
        vec![
            "preProvision",
            "getServer",
            "testConnection",
            "deployARMTemplate"
        ]
    );

    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: DbmsInstanceDetails = instance.decode_details().unwrap();
    assert_eq!(details.server_name, "existing-sql");
    assert!(details
        .fully_qualified_domain_name
        .as_deref()
        .is_some_and(|fqdn| !fqdn.is_empty()));

    // The password came in through the secure half and never reached the
    // plaintext parameters or details.
    assert!(!instance
        .provisioning_parameters
        .contains_key("administratorLoginPassword"));
    assert!(!instance.details.contains_key("administratorLoginPassword"));
    assert!(instance.secure_details.contains_key("administratorLoginPassword"));
}

#[tokio::test]
async fn missing_server_fails_at_get_server_and_resumes_there() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("existing-sql.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-dbms-registered").unwrap();
    let mut instance = new_instance(
        "dbms-reg-2",
        service,
        "dbms",
        json!({
            "location": "eastus",
            "resourceGroup": "prod-rg",
            "server": "existing-sql",
            "administratorLogin": "azureuser",
            "administratorLoginPassword": "opensesame123A",
        }),
        None,
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    let runner = PipelineRunner::new(&world.store);

    let err = runner
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap_err();
    match &err {
        PipelineError::StepFailed { step, source, .. } => {
            assert_eq!(step, "getServer");
            assert!(matches!(source, StepError::NotFound { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    let record = world.store.get("dbms-reg-2").await.unwrap();
    let InstanceStatus::Failed { step, .. } = record.status else {
        panic!("expected failed status");
    };
    assert_eq!(step, "getServer");

    // The deployment name generated by preProvision survived the failure.
    let details_before: DbmsInstanceDetails = instance.decode_details().unwrap();
    assert!(!details_before.arm_deployment_name.is_empty());

    // Once the server exists, retrying from the failed step finishes the
    // pipeline without re-running preProvision.
    world.servers.put(
        "prod-rg",
        ServerState {
            name: "existing-sql".to_string(),
            version: "12.0".to_string(),
            location: "eastus".to_string(),
            fully_qualified_domain_name: format!("existing-sql.{DNS_SUFFIX}"),
        },
    );
    runner
        .run(provisioner.as_ref(), &mut instance, Some("getServer"))
        .await
        .unwrap();

    let details_after: DbmsInstanceDetails = instance.decode_details().unwrap();
    assert_eq!(
        details_after.arm_deployment_name,
        details_before.arm_deployment_name
    );
    assert_eq!(world.arm.deployment_count(), 1);
}

#[tokio::test]
async fn denied_administrator_aborts_provisioning() {
    let world = World::new();
    world.servers.put(
        "prod-rg",
        ServerState {
            name: "existing-sql".to_string(),
            version: "12.0".to_string(),
            location: "eastus".to_string(),
            fully_qualified_domain_name: format!("existing-sql.{DNS_SUFFIX}"),
        },
    );
    world.probe.deny("azureuser", "ALTER ANY USER");

    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-dbms-registered").unwrap();
    let mut instance = new_instance(
        "dbms-reg-3",
        service,
        "dbms",
        json!({
            "location": "eastus",
            "resourceGroup": "prod-rg",
            "server": "existing-sql",
            "administratorLogin": "azureuser",
            "administratorLoginPassword": "opensesame123A",
        }),
        None,
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    let err = PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap_err();
    match err {
        PipelineError::StepFailed { step, source, .. } => {
            assert_eq!(step, "testConnection");
            assert!(matches!(source, StepError::Probe(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    // No deployment was attempted.
    assert_eq!(world.arm.deployment_count(), 0);
}

// ──────────────────────────────────────────────
// Parent/child
// ──────────────────────────────────────────────

/// Provision a DBMS instance the child tests hang off of.
async fn provisioned_dbms(world: &World) -> Arc<asb_engine::Instance> {
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-dbms").unwrap();
    let mut instance = new_instance(
        "dbms-parent",
        service,
        "dbms",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    );
    seed_record(&world.store, &instance).await;
    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();
    Arc::new(instance)
}

#[tokio::test]
async fn child_database_deploys_on_parent_server() {
    let world = World::new();
    let parent = provisioned_dbms(&world).await;
    let parent_details: DbmsInstanceDetails = parent.decode_details().unwrap();

    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-database").unwrap();
    let mut instance = new_instance(
        "db-child-1",
        service,
        "standard",
        json!({}),
        Some(parent.clone()),
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: asb_services::mssql::DatabaseInstanceDetails =
        instance.decode_details().unwrap();
    let deployment = world.arm.deployment(&details.arm_deployment_name).unwrap();
    assert_eq!(
        deployment.template_parameters["serverName"],
        json!(parent_details.server_name)
    );
    // Standard tier default: 10 DTUs -> S0.
    assert_eq!(deployment.template_parameters["sku"], json!("S0"));
    assert_eq!(deployment.resource_group, "prod-rg");
}

#[tokio::test]
async fn child_with_incomplete_parent_fails_at_the_reading_step() {
    let world = World::new();
    let catalog = world.mssql().catalog().unwrap();

    // A parent whose pipeline never ran: its details lack the server name.
    let dbms_service = catalog.service_named("azure-sql-12-0-dbms").unwrap();
    let parent = Arc::new(new_instance(
        "dbms-unprovisioned",
        dbms_service,
        "dbms",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    ));

    let service = catalog.service_named("azure-sql-12-0-database").unwrap();
    let mut instance = new_instance("db-child-2", service, "basic", json!({}), Some(parent));
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    let err = PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap_err();
    match err {
        PipelineError::StepFailed { step, source, .. } => {
            assert_eq!(step, "deployARMTemplate");
            assert!(matches!(
                source,
                StepError::MissingDetail { field: "server" }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ──────────────────────────────────────────────
// Update
// ──────────────────────────────────────────────

#[tokio::test]
async fn storage_shrink_is_rejected_at_validation_not_in_a_step() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0").unwrap();
    let mut instance = new_instance(
        "aio-vcore",
        service,
        "general-purpose",
        json!({"location": "eastus", "resourceGroup": "prod-rg", "storage": 10}),
        None,
    );
    seed_record(&world.store, &instance).await;
    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    // Shrinking is a validation error naming the property.
    instance.updating_parameters = Some(UpdatingParameters::from_map(object(
        json!({"storage": 5}),
    )));
    let err = service
        .manager()
        .validate_updating_parameters(&instance)
        .unwrap_err();
    assert_eq!(err.field, "storage");

    // Growing passes validation, and the update redeploys by the same name.
    instance.updating_parameters = Some(UpdatingParameters::from_map(object(
        json!({"storage": 20}),
    )));
    service
        .manager()
        .validate_updating_parameters(&instance)
        .unwrap();

    let updater = service.manager().clone().updater(&instance.plan).unwrap();
    PipelineRunner::new(&world.store)
        .run(updater.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: AllInOneInstanceDetails = instance.decode_details().unwrap();
    let deployment = world.arm.deployment(&details.arm_deployment_name).unwrap();
    assert_eq!(deployment.revisions, 2);
    assert_eq!(
        deployment.template_parameters["maxSizeBytes"],
        json!(20 * GIB)
    );
    assert_eq!(world.arm.deployment_count(), 1);
}

#[tokio::test]
async fn update_schema_enforces_the_dtu_table() {
    let world = World::new();
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0-database").unwrap();
    let plan = service.plan_named("standard").unwrap();
    let update_schema = plan.schemas().updating_parameters.as_ref().unwrap();

    let err = update_schema
        .validate(&object(json!({"dtus": 15})))
        .unwrap_err();
    assert_eq!(err.field, "dtus");
    update_schema
        .validate(&object(json!({"dtus": 1600})))
        .unwrap();
}

// ──────────────────────────────────────────────
// Deprovision
// ──────────────────────────────────────────────

#[tokio::test]
async fn deprovision_deletes_deployment_and_record() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0").unwrap();
    let mut instance = new_instance(
        "aio-gone",
        service,
        "basic",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    );
    seed_record(&world.store, &instance).await;
    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let deprovisioner = service
        .manager()
        .clone()
        .deprovisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(deprovisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    assert_eq!(world.arm.deployment_count(), 0);
    assert!(world.store.get("aio-gone").await.is_err());
}

#[tokio::test]
async fn deprovision_tolerates_already_deleted_deployment() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.database.example.net"));
    let catalog = world.mssql().catalog().unwrap();
    let service = catalog.service_named("azure-sql-12-0").unwrap();
    let mut instance = new_instance(
        "aio-half-gone",
        service,
        "basic",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    );
    seed_record(&world.store, &instance).await;
    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    // A prior partial run already deleted the deployment.
    let details: AllInOneInstanceDetails = instance.decode_details().unwrap();
    world
        .arm
        .delete(&details.arm_deployment_name, "prod-rg")
        .await
        .unwrap();

    let deprovisioner = service
        .manager()
        .clone()
        .deprovisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(deprovisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();
    assert!(world.store.get("aio-half-gone").await.is_err());
}

// ──────────────────────────────────────────────
// Failover-group pairs
// ──────────────────────────────────────────────

fn pair_parent(world: &World) -> Arc<asb_engine::Instance> {
    let catalog = world.mssqlfg().catalog().unwrap();
    let service = catalog
        .service_named("azure-sql-12-0-dr-dbms-pair-registered")
        .unwrap();
    let mut parent = new_instance(
        "dbms-pair-parent",
        service,
        "dbms",
        json!({
            "primaryResourceGroup": "pri-rg",
            "primaryLocation": "eastus",
            "primaryServer": "pri-sql",
            "primaryAdministratorLogin": "azureuser",
            "primaryAdministratorLoginPassword": "opensesame123A",
            "secondaryResourceGroup": "sec-rg",
            "secondaryLocation": "westus",
            "secondaryServer": "sec-sql",
            "secondaryAdministratorLogin": "azureuser",
            "secondaryAdministratorLoginPassword": "opensesame123A",
        }),
        None,
    );
    // Stand in for a completed parent pipeline.
    parent.details = encode_details(&DbmsPairInstanceDetails {
        pri_arm_deployment_name: "pri-arm".to_string(),
        pri_server_name: "pri-sql".to_string(),
        pri_administrator_login: "azureuser".to_string(),
        pri_fully_qualified_domain_name: Some(format!("pri-sql.{DNS_SUFFIX}")),
        sec_arm_deployment_name: "sec-arm".to_string(),
        sec_server_name: "sec-sql".to_string(),
        sec_administrator_login: "azureuser".to_string(),
        sec_fully_qualified_domain_name: Some(format!("sec-sql.{DNS_SUFFIX}")),
    })
    .unwrap();
    Arc::new(parent)
}

#[tokio::test]
async fn database_pair_rejects_taken_names() {
    let world = World::new();
    let parent = pair_parent(&world);
    world.databases.put("pri-rg", "pri-sql", "orders");

    let catalog = world.mssqlfg().catalog().unwrap();
    let service = catalog
        .service_named("azure-sql-12-0-dr-database-pair")
        .unwrap();
    let mut instance = new_instance(
        "db-pair-1",
        service,
        "standard",
        json!({"failoverGroup": "orders-fg", "database": "orders"}),
        Some(parent),
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    let err = PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap_err();
    match err {
        PipelineError::StepFailed { step, source, .. } => {
            assert_eq!(step, "checkNameAvailability");
            assert!(matches!(source, StepError::AlreadyExists { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn database_pair_deploys_primary_secondary_and_failover_group() {
    let world = World::new();
    let parent = pair_parent(&world);

    let catalog = world.mssqlfg().catalog().unwrap();
    let service = catalog
        .service_named("azure-sql-12-0-dr-database-pair")
        .unwrap();
    let mut instance = new_instance(
        "db-pair-2",
        service,
        "standard",
        json!({"failoverGroup": "orders-fg", "database": "orders", "dtus": 50}),
        Some(parent),
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    assert_eq!(
        provisioner.step_names(),
        vec![
            "checkNameAvailability",
            "preProvision",
            "deployPriARMTemplate",
            "deploySecARMTemplate",
            "deployFgARMTemplate",
        ]
    );
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: asb_services::mssqlfg::DatabasePairInstanceDetails =
        instance.decode_details().unwrap();
    assert_eq!(world.arm.deployment_count(), 3);

    let pri = world
        .arm
        .deployment(&details.pri_arm_deployment_name)
        .unwrap();
    assert_eq!(pri.resource_group, "pri-rg");
    assert_eq!(pri.template_parameters["serverName"], json!("pri-sql"));
    assert_eq!(pri.template_parameters["sku"], json!("S2"));

    let sec = world
        .arm
        .deployment(&details.sec_arm_deployment_name)
        .unwrap();
    assert_eq!(sec.resource_group, "sec-rg");
    assert_eq!(sec.template_parameters["serverName"], json!("sec-sql"));

    let fg = world
        .arm
        .deployment(&details.fg_arm_deployment_name)
        .unwrap();
    assert_eq!(fg.resource_group, "pri-rg");
    assert_eq!(fg.template_parameters["failoverGroupName"], json!("orders-fg"));
    assert_eq!(fg.template_parameters["databaseName"], json!("orders"));

    // Teardown removes all three, failover group first.
    let deprovisioner = service
        .manager()
        .clone()
        .deprovisioner(&instance.plan)
        .unwrap();
    assert_eq!(
        deprovisioner.step_names(),
        vec![
            "deleteFgARMDeployment",
            "deleteSecARMDeployment",
            "deletePriARMDeployment",
        ]
    );
    PipelineRunner::new(&world.store)
        .run(deprovisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();
    assert_eq!(world.arm.deployment_count(), 0);
}

// ──────────────────────────────────────────────
// Other families
// ──────────────────────────────────────────────

#[tokio::test]
async fn mysql_all_in_one_translates_tier_parameters() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.mysql.example.net"));
    let catalog = world.mysql().catalog().unwrap();
    let service = catalog.service_named("azure-mysql-5-7").unwrap();
    let mut instance = new_instance(
        "mysql-1",
        service,
        "general-purpose",
        json!({
            "location": "eastus",
            "resourceGroup": "prod-rg",
            "cores": 4,
            "storage": 20,
            "backupRedundancy": "geo",
        }),
        None,
    );
    seed_record(&world.store, &instance).await;

    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: asb_services::mysql::AllInOneInstanceDetails =
        instance.decode_details().unwrap();
    let deployment = world.arm.deployment(&details.arm_deployment_name).unwrap();
    assert_eq!(deployment.template_parameters["sku"], json!("GP_Gen5_4"));
    assert_eq!(deployment.template_parameters["storageMB"], json!(20 * 1024));
    assert_eq!(
        deployment.template_parameters["geoRedundantBackup"],
        json!("Enabled")
    );
    assert_eq!(deployment.template_parameters["version"], json!("5.7"));
    // Generated credentials ended up in the secure half only.
    assert!(instance.secure_details.contains_key("administratorLoginPassword"));
}

#[tokio::test]
async fn postgresql_database_passes_extensions_through() {
    let world = World::new();
    world
        .arm
        .set_output("fullyQualifiedDomainName", json!("srv.postgres.example.net"));
    let catalog = world.postgresql().catalog().unwrap();

    let dbms_service = catalog.service_named("azure-postgresql-11-dbms").unwrap();
    let mut parent = new_instance(
        "pg-dbms",
        dbms_service,
        "general-purpose",
        json!({"location": "eastus", "resourceGroup": "prod-rg"}),
        None,
    );
    seed_record(&world.store, &parent).await;
    let provisioner = dbms_service
        .manager()
        .clone()
        .provisioner(&parent.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut parent, None)
        .await
        .unwrap();
    let parent = Arc::new(parent);

    let service = catalog.service_named("azure-postgresql-11-database").unwrap();
    let mut instance = new_instance(
        "pg-db",
        service,
        "database",
        json!({"extensions": ["uuid-ossp", "postgis"]}),
        Some(parent),
    );
    seed_record(&world.store, &instance).await;
    let provisioner = service
        .manager()
        .clone()
        .provisioner(&instance.plan)
        .unwrap();
    PipelineRunner::new(&world.store)
        .run(provisioner.as_ref(), &mut instance, None)
        .await
        .unwrap();

    let details: asb_services::postgresql::DatabaseInstanceDetails =
        instance.decode_details().unwrap();
    let deployment = world.arm.deployment(&details.arm_deployment_name).unwrap();
    assert_eq!(
        deployment.template_parameters["extensions"],
        json!(["uuid-ossp", "postgis"])
    );
}
