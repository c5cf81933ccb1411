//! End-to-end schema validation scenarios over realistic plan schemas:
//! required/secure handling, allowed-value tables, defaults, and custom
//! validators composed the way the service modules compose them.

use std::collections::BTreeMap;

use asb_core::{
    ArrayPropertySchema, InputParametersSchema, IntPropertySchema, ObjectPropertySchema,
    ParameterMap, PropertySchema, StringPropertySchema, ValidationError,
};
use serde_json::{json, Value};

fn raw(value: Value) -> ParameterMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object literal"),
    }
}

fn ipv4(field: &str, value: &Value) -> Result<(), ValidationError> {
    let s = value.as_str().unwrap_or_default();
    if s.parse::<std::net::Ipv4Addr>().is_err() {
        return Err(ValidationError::new(
            field,
            format!("\"{s}\" is not a valid IPv4 address"),
        ));
    }
    Ok(())
}

/// A schema shaped like the standard-tier DBMS provisioning contract:
/// required resource placement, optional DTU sizing from a fixed table,
/// secure administrator password, tags, and firewall rules.
fn standard_dbms_schema() -> InputParametersSchema {
    let firewall_rule = PropertySchema::Object(ObjectPropertySchema {
        required_properties: vec![
            "name".to_string(),
            "startIPAddress".to_string(),
            "endIPAddress".to_string(),
        ],
        property_schemas: BTreeMap::from([
            (
                "name".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            ),
            (
                "startIPAddress".to_string(),
                PropertySchema::String(StringPropertySchema {
                    custom_validator: Some(ipv4),
                    ..Default::default()
                }),
            ),
            (
                "endIPAddress".to_string(),
                PropertySchema::String(StringPropertySchema {
                    custom_validator: Some(ipv4),
                    ..Default::default()
                }),
            ),
        ]),
        ..Default::default()
    });

    InputParametersSchema {
        required_properties: vec![
            "resourceGroup".to_string(),
            "location".to_string(),
            "administratorLoginPassword".to_string(),
        ],
        secure_properties: vec!["administratorLoginPassword".to_string()],
        property_schemas: BTreeMap::from([
            (
                "resourceGroup".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            ),
            (
                "location".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            ),
            (
                "administratorLoginPassword".to_string(),
                PropertySchema::String(StringPropertySchema::default()),
            ),
            (
                "dtus".to_string(),
                PropertySchema::Int(IntPropertySchema {
                    allowed_values: vec![10, 20, 50, 100, 200, 400, 800, 1600, 3000],
                    default_value: Some(10),
                    ..Default::default()
                }),
            ),
            (
                "tags".to_string(),
                PropertySchema::Object(ObjectPropertySchema {
                    additional: Some(Box::new(PropertySchema::String(
                        StringPropertySchema::default(),
                    ))),
                    ..Default::default()
                }),
            ),
            (
                "firewallRules".to_string(),
                PropertySchema::Array(ArrayPropertySchema {
                    items: Some(Box::new(firewall_rule)),
                    default_value: Some(json!([{
                        "name": "AllowAzure",
                        "startIPAddress": "0.0.0.0",
                        "endIPAddress": "0.0.0.0",
                    }])),
                    ..Default::default()
                }),
            ),
        ]),
        ..Default::default()
    }
}

fn valid_input() -> ParameterMap {
    raw(json!({
        "resourceGroup": "prod-rg",
        "location": "eastus",
        "administratorLoginPassword": "correct-horse-battery",
    }))
}

#[test]
fn valid_input_processes_with_defaults_and_secure_split() {
    let schema = standard_dbms_schema();
    let (plain, secure) = schema.process(valid_input()).unwrap();

    assert_eq!(plain.get_string("resourceGroup"), "prod-rg");
    assert_eq!(plain.get_i64("dtus"), 10, "default DTU count applied");
    assert_eq!(
        plain.get_array("firewallRules").len(),
        1,
        "default firewall rule applied"
    );
    assert!(!plain.contains_key("administratorLoginPassword"));
    assert_eq!(
        secure.get_string("administratorLoginPassword"),
        "correct-horse-battery"
    );
}

#[test]
fn each_missing_required_property_is_named() {
    let schema = standard_dbms_schema();
    for field in ["resourceGroup", "location", "administratorLoginPassword"] {
        let mut input = valid_input();
        input.remove(field);
        let err = schema.validate(&input).unwrap_err();
        assert_eq!(err.field, field);
    }
}

#[test]
fn dtu_table_rejects_off_table_values() {
    let schema = standard_dbms_schema();
    let mut input = valid_input();
    input.insert("dtus".to_string(), json!(15));
    let err = schema.validate(&input).unwrap_err();
    assert_eq!(err.field, "dtus");

    input.insert("dtus".to_string(), json!(1600));
    assert!(schema.validate(&input).is_ok());
}

#[test]
fn unknown_top_level_property_rejected() {
    let schema = standard_dbms_schema();
    let mut input = valid_input();
    input.insert("sslEnforcement".to_string(), json!("enabled"));
    let err = schema.validate(&input).unwrap_err();
    assert_eq!(err.field, "sslEnforcement");
}

#[test]
fn firewall_rule_ip_validator_fires() {
    let schema = standard_dbms_schema();
    let mut input = valid_input();
    input.insert(
        "firewallRules".to_string(),
        json!([{
            "name": "office",
            "startIPAddress": "10.0.0.1",
            "endIPAddress": "not-an-address",
        }]),
    );
    let err = schema.validate(&input).unwrap_err();
    assert_eq!(err.field, "firewallRules[0].endIPAddress");
}

#[test]
fn tags_accept_arbitrary_string_values_only() {
    let schema = standard_dbms_schema();
    let mut input = valid_input();
    input.insert("tags".to_string(), json!({"team": "data", "env": "prod"}));
    assert!(schema.validate(&input).is_ok());

    input.insert("tags".to_string(), json!({"count": 3}));
    let err = schema.validate(&input).unwrap_err();
    assert_eq!(err.field, "tags.count");
}
