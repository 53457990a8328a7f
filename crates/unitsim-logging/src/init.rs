//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for CI log collection
    Production,
    /// Test capture mode for deterministic testing
    #[default]
    Test,
}

impl Profile {
    /// Parse a profile name as used in `UNITSIM_PROFILE` and config files
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Profile::Development),
            "production" | "prod" => Some(Profile::Production),
            "test" => Some(Profile::Test),
            _ => None,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call installs a subscriber; later calls are no-ops, and a
/// subscriber installed by the host beforehand is left alone.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Bare registry; capture is installed via `init_test_capture()`
///
/// # Example
///
/// ```
/// use unitsim_logging::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("unitsim=debug")),
                )
                .try_init()
                .ok(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("unitsim=info")),
                )
                .try_init()
                .ok(),
            Profile::Test => tracing_subscriber::registry().try_init().ok(),
        };
        if installed.is_none() {
            tracing::debug!(?profile, "global subscriber already installed by host");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("development"), Some(Profile::Development));
        assert_eq!(Profile::parse(" PROD "), Some(Profile::Production));
        assert_eq!(Profile::parse("test"), Some(Profile::Test));
        assert_eq!(Profile::parse("verbose"), None);
    }

    #[test]
    fn test_profile_default_is_test() {
        assert_eq!(Profile::default(), Profile::Test);
    }
}
