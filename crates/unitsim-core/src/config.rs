//! Engine configuration.
//!
//! Read from TOML or from `UNITSIM_*` environment variables:
//!
//! ```toml
//! profile = "development"   # development | production | test
//! timeout_ms = 2000         # suspending engine only
//! log_differences = true
//! ```

use serde::Deserialize;
use std::time::Duration;
use unitsim_errors::{Result, SimError};
use unitsim_logging::Profile;

pub const ENV_PROFILE: &str = "UNITSIM_PROFILE";
pub const ENV_TIMEOUT_MS: &str = "UNITSIM_TIMEOUT_MS";
pub const ENV_LOG_DIFFERENCES: &str = "UNITSIM_LOG_DIFFERENCES";

/// Settings applied to a `UnitSim` / `CoUnitSim` via `with_config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Logging profile for [`SimConfig::init_logging`]
    pub profile: Profile,
    /// Upper bound on resolving both producers of a suspending engine
    pub timeout_ms: Option<u64>,
    /// Append the difference listing to the failure report
    pub log_differences: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Test,
            timeout_ms: None,
            log_differences: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    profile: Option<String>,
    timeout_ms: Option<u64>,
    log_differences: Option<bool>,
}

fn parse_profile(name: &str) -> Result<Profile> {
    Profile::parse(name).ok_or_else(|| SimError::Config {
        message: format!("unknown profile '{}'", name),
    })
}

impl SimConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// - `Config` — malformed TOML, an unknown key, or an unknown profile name
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(source).map_err(|e| SimError::Config {
            message: e.to_string(),
        })?;
        let defaults = Self::default();
        Ok(Self {
            profile: match raw.profile {
                Some(name) => parse_profile(&name)?,
                None => defaults.profile,
            },
            timeout_ms: raw.timeout_ms.or(defaults.timeout_ms),
            log_differences: raw.log_differences.unwrap_or(defaults.log_differences),
        })
    }

    /// Read `UNITSIM_PROFILE`, `UNITSIM_TIMEOUT_MS` and `UNITSIM_LOG_DIFFERENCES`.
    ///
    /// # Errors
    ///
    /// - `Config` — a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source
    ///
    /// # Errors
    ///
    /// - `Config` — a variable is set but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(name) = lookup(ENV_PROFILE) {
            config.profile = parse_profile(&name)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|e| SimError::Config {
                message: format!("{}='{}': {}", ENV_TIMEOUT_MS, raw, e),
            })?;
            config.timeout_ms = Some(ms);
        }
        if let Some(raw) = lookup(ENV_LOG_DIFFERENCES) {
            config.log_differences = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(SimError::Config {
                        message: format!("{}='{}' is not a boolean", ENV_LOG_DIFFERENCES, raw),
                    })
                }
            };
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Install the global subscriber for this config's profile
    pub fn init_logging(&self) {
        unitsim_logging::init(self.profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use unitsim_errors::ExErrorKind;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.profile, Profile::Test);
        assert_eq!(config.timeout(), None);
        assert!(config.log_differences);
    }

    #[test]
    fn test_from_toml_full() {
        let config = SimConfig::from_toml_str(
            "profile = \"production\"\ntimeout_ms = 250\nlog_differences = false\n",
        )
        .unwrap();
        assert_eq!(config.profile, Profile::Production);
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert!(!config.log_differences);
    }

    #[test]
    fn test_from_toml_empty_keeps_defaults() {
        assert_eq!(SimConfig::from_toml_str("").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_profile_and_keys() {
        let err = SimConfig::from_toml_str("profile = \"loud\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);

        let err = SimConfig::from_toml_str("retries = 3").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_lookup() {
        let config = SimConfig::from_lookup(lookup(&[
            (ENV_PROFILE, "dev"),
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_LOG_DIFFERENCES, "off"),
        ]))
        .unwrap();
        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.timeout_ms, Some(1500));
        assert!(!config.log_differences);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = SimConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));

        let err = SimConfig::from_lookup(lookup(&[(ENV_LOG_DIFFERENCES, "maybe")])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }
}
