//! DTU and vCore tier details for the Azure SQL plans.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use asb_core::{
    InputParametersSchema, IntPropertySchema, Parameters, PlanDetails, PropertySchema,
    ValidationError,
};

use crate::common::{firewall_rules_schema, string_property, tags_schema};

pub(crate) const GIB: i64 = 1 << 30;

/// The provisioning contract shared by every plan that creates a new DBMS.
pub(crate) fn dbms_provision_schema() -> InputParametersSchema {
    InputParametersSchema {
        required_properties: vec!["location".to_string(), "resourceGroup".to_string()],
        property_schemas: BTreeMap::from([
            (
                "location".to_string(),
                string_property("The region in which to provision applicable resources"),
            ),
            (
                "resourceGroup".to_string(),
                string_property("The resource group in which to provision applicable resources"),
            ),
            ("tags".to_string(), tags_schema()),
            ("firewallRules".to_string(), firewall_rules_schema()),
        ]),
        ..Default::default()
    }
}

fn dtus_schema(allowed: &[i64], default: i64) -> PropertySchema {
    PropertySchema::Int(IntPropertySchema {
        description: "DTUs are a bundled measure of compute, storage, and IO resources."
            .to_string(),
        allowed_values: allowed.to_vec(),
        default_value: Some(default),
        ..Default::default()
    })
}

fn cores_schema() -> PropertySchema {
    PropertySchema::Int(IntPropertySchema {
        description: "A virtual core represents the logical CPU".to_string(),
        allowed_values: vec![2, 4, 8, 16, 24, 32, 48, 80],
        default_value: Some(2),
        ..Default::default()
    })
}

fn storage_schema() -> PropertySchema {
    PropertySchema::Int(IntPropertySchema {
        description: "The maximum data storage capacity (in GB)".to_string(),
        min_value: Some(5),
        max_value: Some(1024),
        default_value: Some(10),
        ..Default::default()
    })
}

/// Reject storage shrinkage. Growth and no-change are fine; an update that
/// doesn't mention storage is fine too.
pub(crate) fn validate_storage_update(
    pp: &Parameters,
    up: &Parameters,
) -> Result<(), ValidationError> {
    if !up.contains_key("storage") {
        return Ok(());
    }
    let existing = pp.get_i64("storage");
    let requested = up.get_i64("storage");
    if requested < existing {
        return Err(ValidationError::new(
            "storage",
            format!("invalid value: cannot reduce storage from {existing} to {requested}"),
        ));
    }
    Ok(())
}

// ──────────────────────────────────────────────
// DTU tiers
// ──────────────────────────────────────────────

/// A tier sized by a discrete DTU count with a fixed SKU table.
#[derive(Debug, Clone)]
pub struct DtuPlanDetails {
    pub tier_name: &'static str,
    pub sku_map: BTreeMap<i64, &'static str>,
    /// Empty when the tier has exactly one size (Basic), in which case no
    /// `dtus` parameter is offered at all.
    pub allowed_dtus: Vec<i64>,
    pub default_dtus: i64,
    pub storage_gb: i64,
    pub include_dbms: bool,
}

impl DtuPlanDetails {
    fn sku(&self, pp: &Parameters) -> Result<&'static str, ValidationError> {
        let dtus = if self.allowed_dtus.is_empty() {
            self.default_dtus
        } else {
            pp.get_i64("dtus")
        };
        self.sku_map.get(&dtus).copied().ok_or_else(|| {
            ValidationError::new("dtus", format!("invalid value: no SKU for {dtus} DTUs"))
        })
    }
}

impl PlanDetails for DtuPlanDetails {
    fn provision_schema(&self) -> InputParametersSchema {
        let mut schema = if self.include_dbms {
            dbms_provision_schema()
        } else {
            InputParametersSchema::default()
        };
        if !self.allowed_dtus.is_empty() {
            schema.property_schemas.insert(
                "dtus".to_string(),
                dtus_schema(&self.allowed_dtus, self.default_dtus),
            );
        }
        schema
    }

    fn tier_provision_parameters(
        &self,
        provisioning: &Parameters,
    ) -> Result<serde_json::Map<String, Value>, ValidationError> {
        let mut params = serde_json::Map::new();
        params.insert("sku".to_string(), json!(self.sku(provisioning)?));
        params.insert("tier".to_string(), json!(self.tier_name));
        // The deployment template wants bytes.
        params.insert("maxSizeBytes".to_string(), json!(self.storage_gb * GIB));
        Ok(params)
    }

    fn update_schema(&self) -> InputParametersSchema {
        let mut schema = InputParametersSchema::default();
        if !self.allowed_dtus.is_empty() {
            schema.property_schemas.insert(
                "dtus".to_string(),
                dtus_schema(&self.allowed_dtus, self.default_dtus),
            );
        }
        schema
    }

    fn validate_update_parameters(
        &self,
        _provisioning: &Parameters,
        _updating: &Parameters,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

// ──────────────────────────────────────────────
// vCore tiers
// ──────────────────────────────────────────────

/// A tier sized by explicit virtual-core count; the SKU is computed, not
/// table-driven.
#[derive(Debug, Clone)]
pub struct VCorePlanDetails {
    pub tier_name: &'static str,
    pub tier_short_name: &'static str,
    pub include_dbms: bool,
}

impl VCorePlanDetails {
    fn sku(&self, pp: &Parameters) -> String {
        format!("{}_Gen5_{}", self.tier_short_name, pp.get_i64("cores"))
    }
}

impl PlanDetails for VCorePlanDetails {
    fn provision_schema(&self) -> InputParametersSchema {
        let mut schema = if self.include_dbms {
            dbms_provision_schema()
        } else {
            InputParametersSchema::default()
        };
        schema
            .property_schemas
            .insert("cores".to_string(), cores_schema());
        schema
            .property_schemas
            .insert("storage".to_string(), storage_schema());
        schema
    }

    fn tier_provision_parameters(
        &self,
        provisioning: &Parameters,
    ) -> Result<serde_json::Map<String, Value>, ValidationError> {
        let mut params = serde_json::Map::new();
        params.insert("sku".to_string(), json!(self.sku(provisioning)));
        params.insert("tier".to_string(), json!(self.tier_name));
        params.insert(
            "maxSizeBytes".to_string(),
            json!(provisioning.get_i64("storage") * GIB),
        );
        Ok(params)
    }

    fn update_schema(&self) -> InputParametersSchema {
        InputParametersSchema {
            property_schemas: BTreeMap::from([
                ("cores".to_string(), cores_schema()),
                ("storage".to_string(), storage_schema()),
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

    fn standard_tier() -> DtuPlanDetails {
        DtuPlanDetails {
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
            include_dbms: true,
        }
    }

    #[test]
    fn dtu_sku_lookup() {
        let tier = standard_tier();
        let pp: Parameters = [("dtus".to_string(), json!(200))].into_iter().collect();
        let params = tier.tier_provision_parameters(&pp).unwrap();
        assert_eq!(params["sku"], json!("S4"));
        assert_eq!(params["tier"], json!("Standard"));
        assert_eq!(params["maxSizeBytes"], json!(250 * GIB));
    }

    #[test]
    fn basic_tier_offers_no_dtu_choice() {
        let tier = DtuPlanDetails {
            tier_name: "Basic",
            sku_map: BTreeMap::from([(5, "Basic")]),
            allowed_dtus: vec![],
            default_dtus: 5,
            storage_gb: 2,
            include_dbms: true,
        };
        assert!(!tier.provision_schema().property_schemas.contains_key("dtus"));
        let params = tier.tier_provision_parameters(&Parameters::new()).unwrap();
        assert_eq!(params["sku"], json!("Basic"));
    }

    #[test]
    fn vcore_sku_is_computed() {
        let tier = VCorePlanDetails {
            tier_name: "GeneralPurpose",
            tier_short_name: "GP",
            include_dbms: false,
        };
        let pp: Parameters = [
            ("cores".to_string(), json!(8)),
            ("storage".to_string(), json!(50)),
        ]
        .into_iter()
        .collect();
        let params = tier.tier_provision_parameters(&pp).unwrap();
        assert_eq!(params["sku"], json!("GP_Gen5_8"));
        assert_eq!(params["maxSizeBytes"], json!(50 * GIB));
    }

    #[test]
    fn storage_update_monotonicity() {
        let pp: Parameters = [("storage".to_string(), json!(10))].into_iter().collect();

        let shrink: Parameters = [("storage".to_string(), json!(5))].into_iter().collect();
        assert!(validate_storage_update(&pp, &shrink).is_err());

        let same: Parameters = [("storage".to_string(), json!(10))].into_iter().collect();
        assert!(validate_storage_update(&pp, &same).is_ok());

        let grow: Parameters = [("storage".to_string(), json!(20))].into_iter().collect();
        assert!(validate_storage_update(&pp, &grow).is_ok());

        let untouched = Parameters::new();
        assert!(validate_storage_update(&pp, &untouched).is_ok());
    }
}
