//! Step plumbing shared by the failover-group managers.

use std::sync::Arc;

use serde_json::{json, Value};

use asb_core::{InputParametersSchema, Parameters, PlanDetails};
use asb_engine::{ArmDeployer, DeploymentRequest, StepError};

use std::collections::BTreeMap;

use crate::common::{string_property, tags_schema};

pub(crate) const DBMS_PAIR_REGISTERED_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers","existing":true}]}"#;
pub(crate) const DATABASE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers/databases"}]}"#;
pub(crate) const FAILOVER_GROUP_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers/failoverGroups"}]}"#;

/// The provisioning contract of the registered server-pair plan.
pub(crate) fn dbms_pair_provision_schema() -> InputParametersSchema {
    let mut schema = InputParametersSchema {
        property_schemas: BTreeMap::from([("tags".to_string(), tags_schema())]),
        ..Default::default()
    };
    for side in ["primary", "secondary"] {
        for (suffix, description) in [
            ("ResourceGroup", format!("The resource group of the {side} server")),
            ("Location", format!("The location of the {side} server")),
            ("Server", format!("The name of the {side} server")),
            (
                "AdministratorLogin",
                format!("The administrator login of the {side} server"),
            ),
            (
                "AdministratorLoginPassword",
                format!("The administrator login password of the {side} server"),
            ),
        ] {
            let property = format!("{side}{suffix}");
            schema.required_properties.push(property.clone());
            if suffix == "AdministratorLoginPassword" {
                schema.secure_properties.push(property.clone());
            }
            schema
                .property_schemas
                .insert(property, string_property(&description));
        }
    }
    schema
}

/// Deploy one side's database with the plan's tier sizing.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn deploy_database(
    arm: &dyn ArmDeployer,
    deployment_name: &str,
    resource_group: &str,
    location: &str,
    server_name: &str,
    database_name: &str,
    pp: &Parameters,
    tier: &Arc<dyn PlanDetails>,
    tags: std::collections::BTreeMap<String, String>,
) -> Result<(), StepError> {
    let mut params = tier.tier_provision_parameters(pp)?;
    params.insert("serverName".to_string(), json!(server_name));
    params.insert("databaseName".to_string(), json!(database_name));
    params.insert("location".to_string(), json!(location));
    arm.deploy(DeploymentRequest {
        deployment_name,
        resource_group,
        location,
        template: DATABASE_TEMPLATE,
        template_parameters: params,
        arm_parameters: serde_json::Map::new(),
        tags,
    })
    .await?;
    Ok(())
}

/// Deploy the failover group joining the two servers, always on the primary
/// side.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn deploy_failover_group(
    arm: &dyn ArmDeployer,
    deployment_name: &str,
    primary_resource_group: &str,
    primary_location: &str,
    primary_server: &str,
    secondary_server: &str,
    failover_group: &str,
    database: &str,
    tags: std::collections::BTreeMap<String, String>,
) -> Result<(), StepError> {
    let mut params = serde_json::Map::new();
    params.insert("priServerName".to_string(), json!(primary_server));
    params.insert("secServerName".to_string(), json!(secondary_server));
    params.insert("failoverGroupName".to_string(), json!(failover_group));
    params.insert("databaseName".to_string(), Value::String(database.to_string()));
    arm.deploy(DeploymentRequest {
        deployment_name,
        resource_group: primary_resource_group,
        location: primary_location,
        template: FAILOVER_GROUP_TEMPLATE,
        template_parameters: params,
        arm_parameters: serde_json::Map::new(),
        tags,
    })
    .await?;
    Ok(())
}
