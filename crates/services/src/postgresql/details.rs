//! Persisted details shapes for the PostgreSQL managers.

use serde::{Deserialize, Serialize};

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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInstanceDetails {
    #[serde(rename = "armDeployment")]
    pub arm_deployment_name: String,
    #[serde(rename = "database")]
    pub database_name: String,
}
