//! Step plumbing shared by the Azure SQL managers.

use serde_json::{json, Value};

use asb_core::Parameters;
use asb_engine::StepError;

use super::details::{DbmsInstanceDetails, SecureDbmsInstanceDetails};

// Deployment templates. Resource shapes are owned by the resource manager;
// the broker only parameterizes them.
pub(crate) const ALL_IN_ONE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers"},{"type":"Microsoft.Sql/servers/databases"}]}"#;
pub(crate) const DBMS_TEMPLATE: &[u8] = br#"{"resources":[{"type":"Microsoft.Sql/servers"}]}"#;
pub(crate) const DBMS_REGISTERED_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers","existing":true}]}"#;
pub(crate) const DATABASE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers/databases"}]}"#;
pub(crate) const DATABASE_FE_TEMPLATE: &[u8] =
    br#"{"resources":[{"type":"Microsoft.Sql/servers/databases","existing":true}]}"#;

/// Template parameters for a new (or registered) server deployment.
pub(crate) fn dbms_template_parameters(
    details: &DbmsInstanceDetails,
    secure: &SecureDbmsInstanceDetails,
    pp: &Parameters,
    version: &str,
) -> serde_json::Map<String, Value> {
    let mut params = serde_json::Map::new();
    params.insert("serverName".to_string(), json!(details.server_name));
    params.insert(
        "administratorLogin".to_string(),
        json!(details.administrator_login),
    );
    params.insert(
        "administratorLoginPassword".to_string(),
        json!(secure.administrator_login_password),
    );
    params.insert("version".to_string(), json!(version));
    params.insert("location".to_string(), json!(pp.get_string("location")));
    let firewall_rules = pp.get_array("firewallRules");
    if !firewall_rules.is_empty() {
        params.insert("firewallRules".to_string(), Value::Array(firewall_rules));
    }
    params
}

/// Pull the FQDN out of a server deployment's outputs.
pub(crate) fn fqdn_output(outputs: &serde_json::Map<String, Value>) -> Result<String, StepError> {
    outputs
        .get("fullyQualifiedDomainName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            StepError::other("deployment outputs are missing fullyQualifiedDomainName")
        })
}
