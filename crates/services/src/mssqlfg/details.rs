//! Persisted details shapes for the failover-group managers.

use serde::{Deserialize, Serialize};

/// Details of a registered primary/secondary server pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbmsPairInstanceDetails {
    #[serde(rename = "primaryArmDeployment")]
    pub pri_arm_deployment_name: String,
    #[serde(rename = "primaryServer")]
    pub pri_server_name: String,
    #[serde(rename = "primaryAdministratorLogin")]
    pub pri_administrator_login: String,
    #[serde(
        rename = "primaryFullyQualifiedDomainName",
        skip_serializing_if = "Option::is_none"
    )]
    pub pri_fully_qualified_domain_name: Option<String>,
    #[serde(rename = "secondaryArmDeployment")]
    pub sec_arm_deployment_name: String,
    #[serde(rename = "secondaryServer")]
    pub sec_server_name: String,
    #[serde(rename = "secondaryAdministratorLogin")]
    pub sec_administrator_login: String,
    #[serde(
        rename = "secondaryFullyQualifiedDomainName",
        skip_serializing_if = "Option::is_none"
    )]
    pub sec_fully_qualified_domain_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecureDbmsPairInstanceDetails {
    #[serde(rename = "primaryAdministratorLoginPassword")]
    pub pri_administrator_login_password: String,
    #[serde(rename = "secondaryAdministratorLoginPassword")]
    pub sec_administrator_login_password: String,
}

/// Details of a database pair deployed on both servers plus the failover
/// group that joins them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePairInstanceDetails {
    #[serde(rename = "primaryArmDeployment")]
    pub pri_arm_deployment_name: String,
    #[serde(rename = "secondaryArmDeployment")]
    pub sec_arm_deployment_name: String,
    #[serde(rename = "failoverGroupArmDeployment")]
    pub fg_arm_deployment_name: String,
    #[serde(rename = "failoverGroup")]
    pub failover_group_name: String,
    #[serde(rename = "database")]
    pub database_name: String,
}

/// Details of an adopted (registered) database pair: nothing is deployed,
/// only the validated names are retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePairRegisteredInstanceDetails {
    #[serde(rename = "failoverGroup")]
    pub failover_group_name: String,
    #[serde(rename = "database")]
    pub database_name: String,
}

/// Details of a pair built from an existing primary database: the secondary
/// and failover group are deployed, the primary is adopted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePairFeInstanceDetails {
    #[serde(rename = "secondaryArmDeployment")]
    pub sec_arm_deployment_name: String,
    #[serde(rename = "failoverGroupArmDeployment")]
    pub fg_arm_deployment_name: String,
    #[serde(rename = "failoverGroup")]
    pub failover_group_name: String,
    #[serde(rename = "database")]
    pub database_name: String,
}
