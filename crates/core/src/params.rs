//! Typed parameter containers.
//!
//! Parameters are validated, defaulted JSON maps captured when an instance
//! is created or updated. Steps read them through typed getters that return
//! zero values for absent keys -- schema validation has already guaranteed
//! that everything required is present and well-typed, so getters don't
//! re-litigate that.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The underlying representation: a string-keyed JSON object.
pub type ParameterMap = serde_json::Map<String, Value>;

/// A validated key/value parameter container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(pub ParameterMap);

/// Input captured at provisioning time, immutable thereafter except via an
/// explicit update operation.
pub type ProvisioningParameters = Parameters;
/// The subset of provisioning input the schema marks secure. Never merged
/// back into the plaintext map, never logged.
pub type SecureProvisioningParameters = Parameters;
/// Transient input for an in-flight update operation.
pub type UpdatingParameters = Parameters;
/// Input captured at binding time.
pub type BindingParameters = Parameters;
/// The secure subset of binding input.
pub type SecureBindingParameters = Parameters;

impl Parameters {
    pub fn new() -> Parameters {
        Parameters(ParameterMap::new())
    }

    pub fn from_map(map: ParameterMap) -> Parameters {
        Parameters(map)
    }

    pub fn into_map(self) -> ParameterMap {
        self.0
    }

    pub fn as_map(&self) -> &ParameterMap {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The string value at `key`, or `""` when absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// The integer value at `key`, or `0` when absent or not an integer.
    pub fn get_i64(&self, key: &str) -> i64 {
        self.0.get(key).and_then(Value::as_i64).unwrap_or_default()
    }

    /// The object value at `key` as nested [`Parameters`], empty when absent.
    pub fn get_object(&self, key: &str) -> Parameters {
        match self.0.get(key) {
            Some(Value::Object(map)) => Parameters(map.clone()),
            _ => Parameters::new(),
        }
    }

    /// The array value at `key`, empty when absent or not an array.
    pub fn get_array(&self, key: &str) -> Vec<Value> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// The array value at `key` with every string element extracted.
    pub fn get_string_array(&self, key: &str) -> Vec<String> {
        self.get_array(key)
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<(String, Value)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Parameters(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => Parameters(map),
            _ => panic!("expected an object literal"),
        }
    }

    #[test]
    fn getters_return_zero_values_when_absent() {
        let p = Parameters::new();
        assert_eq!(p.get_string("location"), "");
        assert_eq!(p.get_i64("dtus"), 0);
        assert!(p.get_object("tags").is_empty());
        assert!(p.get_array("firewallRules").is_empty());
    }

    #[test]
    fn typed_getters() {
        let p = params(json!({
            "location": "eastus",
            "dtus": 100,
            "tags": {"team": "data"},
            "extensions": ["uuid-ossp", "postgis"],
        }));
        assert_eq!(p.get_string("location"), "eastus");
        assert_eq!(p.get_i64("dtus"), 100);
        assert_eq!(p.get_object("tags").get_string("team"), "data");
        assert_eq!(
            p.get_string_array("extensions"),
            vec!["uuid-ossp".to_string(), "postgis".to_string()]
        );
    }

    #[test]
    fn mismatched_types_read_as_zero_values() {
        let p = params(json!({"location": 42}));
        assert_eq!(p.get_string("location"), "");
        assert_eq!(p.get_i64("location"), 42);
    }
}
