//! Tier details for the MySQL plans: vCore-count tiers with configurable
//! storage and backup redundancy.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use asb_core::{
    InputParametersSchema, IntPropertySchema, Parameters, PlanDetails, PropertySchema,
    StringPropertySchema, ValidationError,
};

use crate::common::{firewall_rules_schema, string_property, tags_schema};
use crate::mssql::plan::validate_storage_update;

/// One MySQL/PostgreSQL-style server tier: allowed core counts, a storage
/// ceiling, and the backup redundancy options the tier supports.
#[derive(Debug, Clone)]
pub struct ServerTierDetails {
    pub tier_name: &'static str,
    pub tier_short_name: &'static str,
    pub allowed_cores: Vec<i64>,
    pub default_cores: i64,
    pub max_storage_gb: i64,
    pub allowed_backup_redundancy: Vec<&'static str>,
}

impl ServerTierDetails {
    fn sku(&self, pp: &Parameters) -> String {
        format!("{}_Gen5_{}", self.tier_short_name, pp.get_i64("cores"))
    }

    fn cores_schema(&self) -> PropertySchema {
        PropertySchema::Int(IntPropertySchema {
            description: "A virtual core represents the logical CPU".to_string(),
            allowed_values: self.allowed_cores.clone(),
            default_value: Some(self.default_cores),
            ..Default::default()
        })
    }

    fn storage_schema(&self) -> PropertySchema {
        PropertySchema::Int(IntPropertySchema {
            description: "The storage capacity (in GB)".to_string(),
            min_value: Some(5),
            max_value: Some(self.max_storage_gb),
            default_value: Some(10),
            ..Default::default()
        })
    }

    fn backup_redundancy_schema(&self) -> PropertySchema {
        PropertySchema::String(StringPropertySchema {
            description: "Specifies the backup redundancy".to_string(),
            allowed_values: self
                .allowed_backup_redundancy
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            default_value: Some("local".to_string()),
            ..Default::default()
        })
    }
}

fn ssl_enforcement_schema() -> PropertySchema {
    PropertySchema::String(StringPropertySchema {
        description: "Specifies whether the server requires the use of TLS when connecting"
            .to_string(),
        allowed_values: vec!["enabled".to_string(), "disabled".to_string()],
        default_value: Some("enabled".to_string()),
        ..Default::default()
    })
}

impl PlanDetails for ServerTierDetails {
    fn provision_schema(&self) -> InputParametersSchema {
        InputParametersSchema {
            required_properties: vec!["location".to_string(), "resourceGroup".to_string()],
            property_schemas: BTreeMap::from([
                (
                    "location".to_string(),
                    string_property("The region in which to provision applicable resources"),
                ),
                (
                    "resourceGroup".to_string(),
                    string_property(
                        "The resource group in which to provision applicable resources",
                    ),
                ),
                ("cores".to_string(), self.cores_schema()),
                ("storage".to_string(), self.storage_schema()),
                (
                    "backupRedundancy".to_string(),
                    self.backup_redundancy_schema(),
                ),
                ("sslEnforcement".to_string(), ssl_enforcement_schema()),
                ("firewallRules".to_string(), firewall_rules_schema()),
                ("tags".to_string(), tags_schema()),
            ]),
            ..Default::default()
        }
    }

    fn tier_provision_parameters(
        &self,
        provisioning: &Parameters,
    ) -> Result<serde_json::Map<String, Value>, ValidationError> {
        let mut params = serde_json::Map::new();
        params.insert("sku".to_string(), json!(self.sku(provisioning)));
        params.insert("tier".to_string(), json!(self.tier_name));
        params.insert("cores".to_string(), json!(provisioning.get_i64("cores")));
        params.insert(
            "storageMB".to_string(),
            json!(provisioning.get_i64("storage") * 1024),
        );
        let geo_redundant = provisioning.get_string("backupRedundancy") == "geo";
        params.insert(
            "geoRedundantBackup".to_string(),
            json!(if geo_redundant { "Enabled" } else { "Disabled" }),
        );
        let ssl_enabled = provisioning.get_string("sslEnforcement") != "disabled";
        params.insert(
            "sslEnforcement".to_string(),
            json!(if ssl_enabled { "Enabled" } else { "Disabled" }),
        );
        Ok(params)
    }

    fn update_schema(&self) -> InputParametersSchema {
        InputParametersSchema {
            property_schemas: BTreeMap::from([
                ("cores".to_string(), self.cores_schema()),
                ("storage".to_string(), self.storage_schema()),
                ("sslEnforcement".to_string(), ssl_enforcement_schema()),
                ("firewallRules".to_string(), firewall_rules_schema()),
            ]),
            ..Default::default()
        }
    }

    fn validate_update_parameters(
        &self,
        provisioning: &Parameters,
        updating: &Parameters,
    ) -> Result<(), ValidationError> {
        validate_storage_update(provisioning, updating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic_tier() -> ServerTierDetails {
        ServerTierDetails {
            tier_name: "Basic",
            tier_short_name: "B",
            allowed_cores: vec![1, 2],
            default_cores: 1,
            max_storage_gb: 1024,
            allowed_backup_redundancy: vec!["local"],
        }
    }

    #[test]
    fn tier_parameters_translate_units_and_toggles() {
        let pp: Parameters = [
            ("cores".to_string(), json!(2)),
            ("storage".to_string(), json!(20)),
            ("backupRedundancy".to_string(), json!("local")),
            ("sslEnforcement".to_string(), json!("disabled")),
        ]
        .into_iter()
        .collect();
        let params = basic_tier().tier_provision_parameters(&pp).unwrap();
        assert_eq!(params["sku"], json!("B_Gen5_2"));
        assert_eq!(params["storageMB"], json!(20 * 1024));
        assert_eq!(params["geoRedundantBackup"], json!("Disabled"));
        assert_eq!(params["sslEnforcement"], json!("Disabled"));
    }

    #[test]
    fn geo_backup_requires_tier_support() {
        let schema = basic_tier().provision_schema();
        let raw: asb_core::ParameterMap = match json!({
            "location": "eastus",
            "resourceGroup": "rg",
            "backupRedundancy": "geo",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = schema.validate(&raw).unwrap_err();
        assert_eq!(err.field, "backupRedundancy");
    }
}
