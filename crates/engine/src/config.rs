//! Subscription configuration.
//!
//! Resolved once at startup into an immutable value passed into module
//! constructors. Step functions never look anything up from the environment.

use asb_core::ConfigError;

/// Details necessary to interact with one cloud subscription.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub environment: String,
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AzureConfig {
    /// Read subscription configuration from `AZURE_*` environment variables.
    ///
    /// `AZURE_SUBSCRIPTION_ID`, `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, and
    /// `AZURE_CLIENT_SECRET` are required; `AZURE_ENVIRONMENT` defaults to
    /// `AzurePublicCloud`.
    pub fn from_env() -> Result<AzureConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<AzureConfig, ConfigError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
        };
        Ok(AzureConfig {
            environment: lookup("AZURE_ENVIRONMENT")
                .unwrap_or_else(|| "AzurePublicCloud".to_string()),
            subscription_id: required("AZURE_SUBSCRIPTION_ID")?,
            tenant_id: required("AZURE_TENANT_ID")?,
            client_id: required("AZURE_CLIENT_ID")?,
            client_secret: required("AZURE_CLIENT_SECRET")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_variable_is_named() {
        let err = AzureConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVariable("AZURE_SUBSCRIPTION_ID".to_string())
        );
    }

    #[test]
    fn environment_defaults_to_public_cloud() {
        let config = AzureConfig::from_lookup(|name| match name {
            "AZURE_ENVIRONMENT" => None,
            other => Some(format!("value-for-{other}")),
        })
        .unwrap();
        assert_eq!(config.environment, "AzurePublicCloud");
        assert_eq!(config.subscription_id, "value-for-AZURE_SUBSCRIPTION_ID");
    }
}
