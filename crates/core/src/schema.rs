//! Declarative input-parameter schemas.
//!
//! Every plan carries an [`InputParametersSchema`] describing the parameters
//! it accepts for provisioning (and optionally updating). Validation is
//! structural and runs before any pipeline step executes: missing required
//! properties, unrecognized properties, type mismatches, out-of-range or
//! disallowed values, and custom-validator rejections are all surfaced as
//! [`ValidationError`]s naming the offending property.
//!
//! Schemas also drive two pre-step transformations:
//! - declared defaults are materialized for absent optional properties, and
//! - properties listed in `secure_properties` are split into a separate map
//!   that is handled as secret material and never merged back.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ValidationError;
use crate::params::{ParameterMap, Parameters};

/// A custom per-property validation hook.
///
/// Plain function pointers keep schemas `Clone` and `Debug` while still
/// allowing domain checks that the structural rules can't express
/// (IP-address formats, firewall-rule shape, and the like).
pub type PropertyValidator = fn(field: &str, value: &Value) -> Result<(), ValidationError>;

// ──────────────────────────────────────────────
// Schema model
// ──────────────────────────────────────────────

/// The declarative contract for one parameter map.
#[derive(Debug, Clone, Default)]
pub struct InputParametersSchema {
    /// Properties that must be present.
    pub required_properties: Vec<String>,
    /// Properties that must be split out and handled as secret material.
    pub secure_properties: Vec<String>,
    /// Per-property schemas, keyed by property name.
    pub property_schemas: BTreeMap<String, PropertySchema>,
    /// Wildcard schema for properties not listed in `property_schemas`.
    /// When absent, unrecognized properties are rejected.
    pub additional: Option<Box<PropertySchema>>,
}

/// Schema for a single property. A closed set: new property kinds are new
/// variants, not stringly-typed escape hatches.
#[derive(Debug, Clone)]
pub enum PropertySchema {
    String(StringPropertySchema),
    Int(IntPropertySchema),
    Object(ObjectPropertySchema),
    Array(ArrayPropertySchema),
}

#[derive(Debug, Clone, Default)]
pub struct StringPropertySchema {
    pub description: String,
    /// When non-empty, the value must be one of these.
    pub allowed_values: Vec<String>,
    pub default_value: Option<String>,
    pub custom_validator: Option<PropertyValidator>,
}

#[derive(Debug, Clone, Default)]
pub struct IntPropertySchema {
    pub description: String,
    /// When non-empty, the value must be one of these.
    pub allowed_values: Vec<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub default_value: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPropertySchema {
    pub description: String,
    pub required_properties: Vec<String>,
    pub property_schemas: BTreeMap<String, PropertySchema>,
    /// Wildcard schema for nested properties not listed above.
    pub additional: Option<Box<PropertySchema>>,
    pub custom_validator: Option<PropertyValidator>,
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayPropertySchema {
    pub description: String,
    /// Schema every element must satisfy. When absent, any element is legal.
    pub items: Option<Box<PropertySchema>>,
    pub custom_validator: Option<PropertyValidator>,
    pub default_value: Option<Value>,
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

impl PropertySchema {
    /// Validate one value against this schema. `field` is the property path
    /// used in error messages.
    pub fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match self {
            PropertySchema::String(s) => s.validate(field, value),
            PropertySchema::Int(s) => s.validate(field, value),
            PropertySchema::Object(s) => s.validate(field, value),
            PropertySchema::Array(s) => s.validate(field, value),
        }
    }

    /// The declared default for this property, if any.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            PropertySchema::String(s) => s.default_value.clone().map(Value::String),
            PropertySchema::Int(s) => s.default_value.map(Value::from),
            PropertySchema::Object(s) => s.default_value.clone(),
            PropertySchema::Array(s) => s.default_value.clone(),
        }
    }
}

impl StringPropertySchema {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let s = value
            .as_str()
            .ok_or_else(|| ValidationError::new(field, "expected a string"))?;
        if !self.allowed_values.is_empty() && !self.allowed_values.iter().any(|a| a == s) {
            return Err(ValidationError::new(
                field,
                format!("invalid value: \"{s}\" is not an allowed value"),
            ));
        }
        if let Some(validate) = self.custom_validator {
            validate(field, value)?;
        }
        Ok(())
    }
}

impl IntPropertySchema {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let n = value
            .as_i64()
            .ok_or_else(|| ValidationError::new(field, "expected an integer"))?;
        if !self.allowed_values.is_empty() && !self.allowed_values.contains(&n) {
            return Err(ValidationError::new(
                field,
                format!("invalid value: {n} is not an allowed value"),
            ));
        }
        if let Some(min) = self.min_value {
            if n < min {
                return Err(ValidationError::new(
                    field,
                    format!("invalid value: {n} is less than the minimum {min}"),
                ));
            }
        }
        if let Some(max) = self.max_value {
            if n > max {
                return Err(ValidationError::new(
                    field,
                    format!("invalid value: {n} is greater than the maximum {max}"),
                ));
            }
        }
        Ok(())
    }
}

impl ObjectPropertySchema {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::new(field, "expected an object"))?;
        for required in &self.required_properties {
            if !obj.contains_key(required) {
                return Err(ValidationError::missing(format!("{field}.{required}")));
            }
        }
        for (key, nested) in obj {
            let nested_field = format!("{field}.{key}");
            match self.property_schemas.get(key) {
                Some(schema) => schema.validate(&nested_field, nested)?,
                None => match &self.additional {
                    Some(schema) => schema.validate(&nested_field, nested)?,
                    None => {
                        return Err(ValidationError::new(nested_field, "unrecognized property"))
                    }
                },
            }
        }
        if let Some(validate) = self.custom_validator {
            validate(field, value)?;
        }
        Ok(())
    }
}

impl ArrayPropertySchema {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::new(field, "expected an array"))?;
        if let Some(item_schema) = &self.items {
            for (i, item) in items.iter().enumerate() {
                item_schema.validate(&format!("{field}[{i}]"), item)?;
            }
        }
        if let Some(validate) = self.custom_validator {
            validate(field, value)?;
        }
        Ok(())
    }
}

impl InputParametersSchema {
    /// Validate a raw parameter map against this schema.
    pub fn validate(&self, raw: &ParameterMap) -> Result<(), ValidationError> {
        for required in &self.required_properties {
            if !raw.contains_key(required) {
                return Err(ValidationError::missing(required));
            }
        }
        for (key, value) in raw {
            match self.property_schemas.get(key) {
                Some(schema) => schema.validate(key, value)?,
                None => match &self.additional {
                    Some(schema) => schema.validate(key, value)?,
                    None => return Err(ValidationError::new(key, "unrecognized property")),
                },
            }
        }
        Ok(())
    }

    /// Materialize declared defaults for absent optional properties.
    pub fn apply_defaults(&self, raw: &mut ParameterMap) {
        for (key, schema) in &self.property_schemas {
            if raw.contains_key(key) {
                continue;
            }
            if let Some(default) = schema.default_value() {
                raw.insert(key.clone(), default);
            }
        }
    }

    /// Split a map into (plain, secure) halves by `secure_properties`.
    pub fn split(&self, raw: ParameterMap) -> (ParameterMap, ParameterMap) {
        let mut plain = ParameterMap::new();
        let mut secure = ParameterMap::new();
        for (key, value) in raw {
            if self.secure_properties.iter().any(|s| *s == key) {
                secure.insert(key, value);
            } else {
                plain.insert(key, value);
            }
        }
        (plain, secure)
    }

    /// Validate, default, and split raw caller input in one pass.
    ///
    /// This is the entry point the lifecycle layer uses before constructing
    /// or updating an instance: on success the returned pair is the exact
    /// parameter state steps will observe.
    pub fn process(
        &self,
        mut raw: ParameterMap,
    ) -> Result<(Parameters, Parameters), ValidationError> {
        self.validate(&raw)?;
        self.apply_defaults(&mut raw);
        let (plain, secure) = self.split(raw);
        Ok((Parameters::from_map(plain), Parameters::from_map(secure)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> ParameterMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object literal"),
        }
    }

    fn schema_with_int(allowed: Vec<i64>) -> InputParametersSchema {
        InputParametersSchema {
            property_schemas: BTreeMap::from([(
                "dtus".to_string(),
                PropertySchema::Int(IntPropertySchema {
                    allowed_values: allowed,
                    default_value: Some(10),
                    ..Default::default()
                }),
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn missing_required_property_names_it() {
        let schema = InputParametersSchema {
            required_properties: vec!["location".to_string()],
            property_schemas: BTreeMap::from([(
                "location".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            )]),
            ..Default::default()
        };
        let err = schema.validate(&raw(json!({}))).unwrap_err();
        assert_eq!(err.field, "location");
    }

    #[test]
    fn unrecognized_property_rejected_without_additional() {
        let schema = InputParametersSchema::default();
        let err = schema.validate(&raw(json!({"bogus": 1}))).unwrap_err();
        assert_eq!(err.field, "bogus");
    }

    #[test]
    fn additional_wildcard_accepts_unlisted_properties() {
        let schema = InputParametersSchema {
            additional: Some(Box::new(PropertySchema::String(
                StringPropertySchema::default(),
            ))),
            ..Default::default()
        };
        assert!(schema.validate(&raw(json!({"anything": "goes"}))).is_ok());
        assert!(schema.validate(&raw(json!({"anything": 7}))).is_err());
    }

    #[test]
    fn allowed_int_values_enforced() {
        let schema = schema_with_int(vec![10, 20, 50, 100, 200, 400, 800, 1600, 3000]);
        assert!(schema.validate(&raw(json!({"dtus": 50}))).is_ok());
        let err = schema.validate(&raw(json!({"dtus": 15}))).unwrap_err();
        assert_eq!(err.field, "dtus");
    }

    #[test]
    fn int_bounds_enforced() {
        let schema = InputParametersSchema {
            property_schemas: BTreeMap::from([(
                "storage".to_string(),
                PropertySchema::Int(IntPropertySchema {
                    min_value: Some(5),
                    max_value: Some(1024),
                    ..Default::default()
                }),
            )]),
            ..Default::default()
        };
        assert!(schema.validate(&raw(json!({"storage": 5}))).is_ok());
        assert!(schema.validate(&raw(json!({"storage": 4}))).is_err());
        assert!(schema.validate(&raw(json!({"storage": 2048}))).is_err());
    }

    #[test]
    fn defaults_applied_for_absent_properties() {
        let schema = schema_with_int(vec![10, 20]);
        let mut map = raw(json!({}));
        schema.apply_defaults(&mut map);
        assert_eq!(map.get("dtus"), Some(&json!(10)));

        // Present values are left alone.
        let mut map = raw(json!({"dtus": 20}));
        schema.apply_defaults(&mut map);
        assert_eq!(map.get("dtus"), Some(&json!(20)));
    }

    #[test]
    fn secure_properties_split_out() {
        let schema = InputParametersSchema {
            secure_properties: vec!["administratorLoginPassword".to_string()],
            property_schemas: BTreeMap::from([
                (
                    "administratorLogin".to_string(),
                    PropertySchema::String(StringPropertySchema::default()),
                ),
                (
                    "administratorLoginPassword".to_string(),
                    PropertySchema::String(StringPropertySchema::default()),
                ),
            ]),
            ..Default::default()
        };
        let (plain, secure) = schema
            .process(raw(json!({
                "administratorLogin": "azureuser",
                "administratorLoginPassword": "hunter2hunter2",
            })))
            .unwrap();
        assert_eq!(plain.get_string("administratorLogin"), "azureuser");
        assert!(!plain.contains_key("administratorLoginPassword"));
        assert_eq!(
            secure.get_string("administratorLoginPassword"),
            "hunter2hunter2"
        );
    }

    #[test]
    fn nested_object_validation() {
        fn no_reserved_names(field: &str, value: &Value) -> Result<(), ValidationError> {
            if value.get("name").and_then(Value::as_str) == Some("master") {
                return Err(ValidationError::new(field, "\"master\" is reserved"));
            }
            Ok(())
        }

        let rule_schema = PropertySchema::Object(ObjectPropertySchema {
            required_properties: vec!["name".to_string()],
            property_schemas: BTreeMap::from([(
                "name".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            )]),
            custom_validator: Some(no_reserved_names),
            ..Default::default()
        });
        let schema = InputParametersSchema {
            property_schemas: BTreeMap::from([(
                "rules".to_string(),
                PropertySchema::Array(ArrayPropertySchema {
                    items: Some(Box::new(rule_schema)),
                    ..Default::default()
                }),
            )]),
            ..Default::default()
        };

        assert!(schema
            .validate(&raw(json!({"rules": [{"name": "allow"}]})))
            .is_ok());

        let err = schema
            .validate(&raw(json!({"rules": [{"nome": "allow"}]})))
            .unwrap_err();
        assert_eq!(err.field, "rules[0].name");

        let err = schema
            .validate(&raw(json!({"rules": [{"name": "master"}]})))
            .unwrap_err();
        assert_eq!(err.field, "rules[0]");
    }
}
