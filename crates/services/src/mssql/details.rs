//! Persisted details shapes for the Azure SQL managers.
//!
//! Field names are the stored wire names; adding fields is forward
//! compatible. Fields produced by later steps are optional and checked with
//! `required_detail` at the step that consumes them.

use serde::{Deserialize, Serialize};

/// Details of a DBMS instance, shared by the dbms and dbms-registered
/// managers (and read by child database pipelines).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbmsInstanceDetails {
    #[serde(rename = "armDeployment")]
    pub arm_deployment_name: String,
    #[serde(rename = "server")]
    pub server_name: String,
    #[serde(rename = "administratorLogin")]
    pub administrator_login: String,
    #[serde(
        rename = "fullyQualifiedDomainName",
        skip_serializing_if = "Option::is_none"
    )]
    pub fully_qualified_domain_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecureDbmsInstanceDetails {
    #[serde(rename = "administratorLoginPassword")]
    pub administrator_login_password: String,
}

/// Details of a database-only instance (child of a DBMS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInstanceDetails {
    #[serde(rename = "armDeployment")]
    pub arm_deployment_name: String,
    #[serde(rename = "database")]
    pub database_name: String,
}

/// Details of an all-in-one instance: a DBMS plus its single database,
/// deployed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllInOneInstanceDetails {
    #[serde(rename = "armDeployment")]
    pub arm_deployment_name: String,
    #[serde(rename = "server")]
    pub server_name: String,
    #[serde(rename = "administratorLogin")]
    pub administrator_login: String,
    #[serde(
        rename = "fullyQualifiedDomainName",
        skip_serializing_if = "Option::is_none"
    )]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(rename = "database")]
    pub database_name: String,
}
