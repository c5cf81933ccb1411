//! Tier details for the PostgreSQL plans. Same vCore tier shape as MySQL,
//! plus the database-level `extensions` parameter.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use asb_core::{
    ArrayPropertySchema, InputParametersSchema, IntPropertySchema, Parameters, PlanDetails,
    PropertySchema, StringPropertySchema, ValidationError,
};

use crate::common::{firewall_rules_schema, string_property, tags_schema};
use crate::mssql::plan::validate_storage_update;

/// The `extensions` parameter accepted wherever a database is created.
pub(crate) fn extensions_schema() -> PropertySchema {
    PropertySchema::Array(ArrayPropertySchema {
        description: "Database extensions to install".to_string(),
        items: Some(Box::new(PropertySchema::String(StringPropertySchema {
            description: "Extension name".to_string(),
            ..Default::default()
        }))),
        ..Default::default()
    })
}

#[derive(Debug, Clone)]
pub struct PostgresTierDetails {
    pub tier_name: &'static str,
    pub tier_short_name: &'static str,
    pub allowed_cores: Vec<i64>,
    pub default_cores: i64,
    pub max_storage_gb: i64,
    pub allowed_backup_redundancy: Vec<&'static str>,
}

impl PostgresTierDetails {
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

    fn ssl_enforcement_schema(&self) -> PropertySchema {
        PropertySchema::String(StringPropertySchema {
            description: "Specifies whether the server requires the use of TLS when connecting"
                .to_string(),
            allowed_values: vec!["enabled".to_string(), "disabled".to_string()],
            default_value: Some("enabled".to_string()),
            ..Default::default()
        })
    }
}

impl PlanDetails for PostgresTierDetails {
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
                ("sslEnforcement".to_string(), self.ssl_enforcement_schema()),
                ("extensions".to_string(), extensions_schema()),
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
                ("sslEnforcement".to_string(), self.ssl_enforcement_schema()),
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
