//! Step plumbing shared by the MySQL managers.

use serde_json::{json, Value};

use asb_core::Parameters;

pub(crate) const ALL_IN_ONE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.DBforMySQL/servers"},{"type":"Microsoft.DBforMySQL/servers/databases"}]}"#;
pub(crate) const DBMS_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.DBforMySQL/servers"}]}"#;
pub(crate) const DATABASE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.DBforMySQL/servers/databases"}]}"#;

/// Template parameters for a new server deployment.
pub(crate) fn dbms_template_parameters(
    server_name: &str,
    administrator_login: &str,
    administrator_login_password: &str,
    pp: &Parameters,
    version: &str,
) -> serde_json::Map<String, Value> {
    let mut params = serde_json::Map::new();
    params.insert("serverName".to_string(), json!(server_name));
    params.insert("administratorLogin".to_string(), json!(administrator_login));
    params.insert(
        "administratorLoginPassword".to_string(),
        json!(administrator_login_password),
    );
    params.insert("version".to_string(), json!(version));
    params.insert("location".to_string(), json!(pp.get_string("location")));
    let firewall_rules = pp.get_array("firewallRules");
    if !firewall_rules.is_empty() {
        params.insert("firewallRules".to_string(), Value::Array(firewall_rules));
    }
    params
}
