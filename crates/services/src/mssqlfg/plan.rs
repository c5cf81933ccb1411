//! Tier details for the failover-group database plans. Same DTU/vCore split
//! as the plain Azure SQL plans, but every plan requires the failover group
//! and database names up front.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use asb_core::{
    InputParametersSchema, IntPropertySchema, Parameters, PlanDetails, PropertySchema,
    ValidationError,
};

use crate::common::{string_property, tags_schema};
use crate::mssql::plan::{validate_storage_update, GIB};

fn pair_base_schema() -> InputParametersSchema {
    InputParametersSchema {
        required_properties: vec!["failoverGroup".to_string(), "database".to_string()],
        property_schemas: BTreeMap::from([
            (
                "failoverGroup".to_string(),
                string_property("The name of the failover group"),
            ),
            (
                "database".to_string(),
                string_property("The name of the database"),
            ),
            ("tags".to_string(), tags_schema()),
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

/// DTU-sized failover-group database tier.
#[derive(Debug, Clone)]
pub struct DtuPairPlanDetails {
    pub tier_name: &'static str,
    pub sku_map: BTreeMap<i64, &'static str>,
    pub allowed_dtus: Vec<i64>,
    pub default_dtus: i64,
    pub storage_gb: i64,
}

impl DtuPairPlanDetails {
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

impl PlanDetails for DtuPairPlanDetails {
    fn provision_schema(&self) -> InputParametersSchema {
        let mut schema = pair_base_schema();
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

/// vCore-sized failover-group database tier.
#[derive(Debug, Clone)]
pub struct VCorePairPlanDetails {
    pub tier_name: &'static str,
    pub tier_short_name: &'static str,
}

impl PlanDetails for VCorePairPlanDetails {
    fn provision_schema(&self) -> InputParametersSchema {
        let mut schema = pair_base_schema();
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
        params.insert(
            "sku".to_string(),
            json!(format!(
                "{}_Gen5_{}",
                self.tier_short_name,
                provisioning.get_i64("cores")
            )),
        );
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
