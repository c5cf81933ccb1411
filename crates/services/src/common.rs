//! Helpers shared by every service family: schema fragments, parameter
//! plumbing, and the read-validate calls against resource clients.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use serde_json::{json, Value};

use asb_core::{
    ArrayPropertySchema, ObjectPropertySchema, Parameters, Plan, PlanDetails, PropertySchema,
    StringPropertySchema, UpdatingParameters, ValidationError,
};
use asb_engine::{
    DatabasesClient, FailoverGroupsClient, Instance, ServerState, ServersClient, StepError,
};

// ──────────────────────────────────────────────
// Schema fragments
// ──────────────────────────────────────────────

pub(crate) fn ip_validator(field: &str, value: &Value) -> Result<(), ValidationError> {
    let s = value.as_str().unwrap_or_default();
    if s.parse::<Ipv4Addr>().is_err() {
        return Err(ValidationError::new(
            field,
            format!("\"{s}\" is not a valid IPv4 address"),
        ));
    }
    Ok(())
}

pub(crate) fn firewall_rule_validator(field: &str, value: &Value) -> Result<(), ValidationError> {
    let start = value
        .get("startIPAddress")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .parse::<Ipv4Addr>();
    let end = value
        .get("endIPAddress")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .parse::<Ipv4Addr>();
    if let (Ok(start), Ok(end)) = (start, end) {
        if u32::from(start) > u32::from(end) {
            return Err(ValidationError::new(
                field,
                format!("startIPAddress {start} is greater than endIPAddress {end}"),
            ));
        }
    }
    Ok(())
}

/// Firewall rules: an array of named IPv4 ranges, defaulting to Azure-only
/// access.
pub(crate) fn firewall_rules_schema() -> PropertySchema {
    let rule = ObjectPropertySchema {
        description: "Individual firewall rule".to_string(),
        required_properties: vec![
            "name".to_string(),
            "startIPAddress".to_string(),
            "endIPAddress".to_string(),
        ],
        property_schemas: BTreeMap::from([
            (
                "name".to_string(),
                PropertySchema::String(StringPropertySchema {
                    description: "Name of firewall rule".to_string(),
                    ..Default::default()
                }),
            ),
            (
                "startIPAddress".to_string(),
                PropertySchema::String(StringPropertySchema {
                    description: "Start of firewall rule range".to_string(),
                    custom_validator: Some(ip_validator),
                    ..Default::default()
                }),
            ),
            (
                "endIPAddress".to_string(),
                PropertySchema::String(StringPropertySchema {
                    description: "End of firewall rule range".to_string(),
                    custom_validator: Some(ip_validator),
                    ..Default::default()
                }),
            ),
        ]),
        custom_validator: Some(firewall_rule_validator),
        ..Default::default()
    };
    PropertySchema::Array(ArrayPropertySchema {
        description: "Firewall rules to apply to instance. \
            If left unspecified, defaults to only Azure IPs"
            .to_string(),
        items: Some(Box::new(PropertySchema::Object(rule))),
        default_value: Some(json!([{
            "name": "AllowAzure",
            "startIPAddress": "0.0.0.0",
            "endIPAddress": "0.0.0.0",
        }])),
        ..Default::default()
    })
}

/// Tags: arbitrary string key/value pairs stamped onto deployed resources.
pub(crate) fn tags_schema() -> PropertySchema {
    PropertySchema::Object(ObjectPropertySchema {
        description: "Tags to be applied to resources".to_string(),
        additional: Some(Box::new(PropertySchema::String(StringPropertySchema {
            description: "Tag value".to_string(),
            ..Default::default()
        }))),
        ..Default::default()
    })
}

pub(crate) fn string_property(description: &str) -> PropertySchema {
    PropertySchema::String(StringPropertySchema {
        description: description.to_string(),
        ..Default::default()
    })
}

// ──────────────────────────────────────────────
// Parameter plumbing
// ──────────────────────────────────────────────

pub(crate) fn tags_from(pp: &Parameters) -> BTreeMap<String, String> {
    pp.get_object("tags")
        .as_map()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
        .collect()
}

/// The effective parameters of an update redeploy: provisioning parameters
/// overlaid with whatever the update request supplies.
pub(crate) fn merged_update_parameters(
    pp: &Parameters,
    up: Option<&UpdatingParameters>,
) -> Parameters {
    let mut merged = pp.clone();
    if let Some(up) = up {
        for (key, value) in up.as_map() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// The plan's tier details, which every sizing step needs.
pub(crate) fn tier_details(plan: &Plan) -> Result<&Arc<dyn PlanDetails>, StepError> {
    plan.tier_details()
        .ok_or_else(|| StepError::other(format!("plan {} is missing tier details", plan.id())))
}

/// Tier-specific update validation shared by every manager whose plans carry
/// tier details.
pub(crate) fn validate_tier_update(instance: &Instance) -> Result<(), ValidationError> {
    let Some(tier) = instance.plan.tier_details() else {
        return Ok(());
    };
    let Some(up) = instance.updating_parameters.as_ref() else {
        return Ok(());
    };
    tier.validate_update_parameters(&instance.provisioning_parameters, up)
}

// ──────────────────────────────────────────────
// Read-validate calls
// ──────────────────────────────────────────────

/// Fetch a server that provisioning expects to exist, checking its engine
/// version (and location when one is expected).
pub(crate) async fn validate_server(
    servers: &dyn ServersClient,
    resource_group: &str,
    server_name: &str,
    expected_version: &str,
    expected_location: Option<&str>,
) -> Result<ServerState, StepError> {
    let server = servers.get(resource_group, server_name).await?.ok_or_else(|| {
        StepError::NotFound {
            resource: "server",
            name: server_name.to_string(),
        }
    })?;
    if server.version != expected_version {
        return Err(StepError::other(format!(
            "server version validation failed, expected version: {expected_version}, \
             actual version: {}",
            server.version
        )));
    }
    if let Some(expected) = expected_location {
        let normalize = |s: &str| s.to_lowercase().replace(' ', "");
        if normalize(expected) != normalize(&server.location) {
            return Err(StepError::other(format!(
                "server location validation failed, expected location: {expected}, \
                 actual location: {}",
                server.location
            )));
        }
    }
    Ok(server)
}

/// A database that provisioning expects to exist.
pub(crate) async fn require_database(
    databases: &dyn DatabasesClient,
    resource_group: &str,
    server_name: &str,
    database_name: &str,
) -> Result<(), StepError> {
    databases
        .get(resource_group, server_name, database_name)
        .await?
        .ok_or(StepError::NotFound {
            resource: "database",
            name: database_name.to_string(),
        })?;
    Ok(())
}

/// A database name that must still be available.
pub(crate) async fn require_database_absent(
    databases: &dyn DatabasesClient,
    resource_group: &str,
    server_name: &str,
    database_name: &str,
) -> Result<(), StepError> {
    match databases
        .get(resource_group, server_name, database_name)
        .await?
    {
        Some(_) => Err(StepError::AlreadyExists {
            resource: "database",
            name: database_name.to_string(),
        }),
        None => Ok(()),
    }
}

/// A failover group that provisioning expects to exist.
pub(crate) async fn require_failover_group(
    failover_groups: &dyn FailoverGroupsClient,
    resource_group: &str,
    server_name: &str,
    failover_group_name: &str,
) -> Result<(), StepError> {
    failover_groups
        .get(resource_group, server_name, failover_group_name)
        .await?
        .ok_or(StepError::NotFound {
            resource: "failover group",
            name: failover_group_name.to_string(),
        })?;
    Ok(())
}

/// A failover group name that must still be available.
pub(crate) async fn require_failover_group_absent(
    failover_groups: &dyn FailoverGroupsClient,
    resource_group: &str,
    server_name: &str,
    failover_group_name: &str,
) -> Result<(), StepError> {
    match failover_groups
        .get(resource_group, server_name, failover_group_name)
        .await?
    {
        Some(_) => Err(StepError::AlreadyExists {
            resource: "failover group",
            name: failover_group_name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn firewall_rule_range_order_enforced() {
        let rule = json!({
            "name": "office",
            "startIPAddress": "10.0.0.9",
            "endIPAddress": "10.0.0.1",
        });
        let err = firewall_rule_validator("firewallRules[0]", &rule).unwrap_err();
        assert_eq!(err.field, "firewallRules[0]");

        let rule = json!({
            "name": "office",
            "startIPAddress": "10.0.0.1",
            "endIPAddress": "10.0.0.9",
        });
        assert!(firewall_rule_validator("firewallRules[0]", &rule).is_ok());
    }

    #[test]
    fn merged_update_parameters_overlays() {
        let pp: Parameters = [
            ("cores".to_string(), json!(2)),
            ("storage".to_string(), json!(10)),
        ]
        .into_iter()
        .collect();
        let up: Parameters = [("cores".to_string(), json!(8))].into_iter().collect();
        let merged = merged_update_parameters(&pp, Some(&up));
        assert_eq!(merged.get_i64("cores"), 8);
        assert_eq!(merged.get_i64("storage"), 10);
    }
}
