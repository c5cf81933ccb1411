//! Catalog configuration derived from the environment.
//!
//! Configuration is resolved once at startup into an immutable value that is
//! passed into catalog assembly; nothing reads the environment after that.

use crate::stability::Stability;

/// Which modules' services should be included in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Minimum stability a plan must have to appear in the catalog.
    pub min_stability: Stability,
    /// Whether disaster-recovery service modules (failover-group pairs)
    /// are offered at all.
    pub enable_dr_services: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            min_stability: Stability::Preview,
            enable_dr_services: false,
        }
    }
}

impl CatalogConfig {
    /// Read catalog configuration from process environment variables.
    ///
    /// `MIN_STABILITY` (default `STABLE`) and
    /// `ENABLE_DISASTER_RECOVERY_SERVICES` (default `false`).
    pub fn from_env() -> Result<CatalogConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable variable
    /// lookup, so tests don't have to mutate process state.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<CatalogConfig, ConfigError> {
        let min_stability = match lookup("MIN_STABILITY") {
            Some(raw) => Stability::parse(&raw).ok_or(ConfigError::UnrecognizedStability(raw))?,
            None => Stability::Stable,
        };
        let enable_dr_services = match lookup("ENABLE_DISASTER_RECOVERY_SERVICES") {
            Some(raw) => parse_bool("ENABLE_DISASTER_RECOVERY_SERVICES", &raw)?,
            None => false,
        };
        Ok(CatalogConfig {
            min_stability,
            enable_dr_services,
        })
    }
}

/// An error building configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unrecognized stability level \"{0}\"")]
    UnrecognizedStability(String),
    #[error("unrecognized boolean \"{value}\" for {name}")]
    UnrecognizedBool { name: String, value: String },
    #[error("required environment variable {0} is not set")]
    MissingVariable(String),
}

pub(crate) fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::UnrecognizedBool {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_to_stable_with_dr_disabled() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.min_stability, Stability::Stable);
        assert!(!config.enable_dr_services);
    }

    #[test]
    fn parses_min_stability() {
        let config =
            CatalogConfig::from_lookup(lookup(&[("MIN_STABILITY", "preview")])).unwrap();
        assert_eq!(config.min_stability, Stability::Preview);
    }

    #[test]
    fn rejects_unknown_stability() {
        let err = CatalogConfig::from_lookup(lookup(&[("MIN_STABILITY", "ROCK_SOLID")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnrecognizedStability("ROCK_SOLID".to_string())
        );
    }

    #[test]
    fn parses_dr_gate() {
        let config = CatalogConfig::from_lookup(lookup(&[(
            "ENABLE_DISASTER_RECOVERY_SERVICES",
            "true",
        )]))
        .unwrap();
        assert!(config.enable_dr_services);
    }
}
