//! Correlation identifier for a single engine instance
//!
//! Every `UnitSim`/`CoUnitSim` is built fresh per test instance. The
//! `SimId` lets log lines from parallel test threads be told apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one assertion engine instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimId(String);

impl SimId {
    /// Generate a new SimId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for SimId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_id_unique() {
        let a = SimId::new();
        let b = SimId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sim_id_display_matches_as_str() {
        let id = SimId::from_string("sim-1".to_string());
        assert_eq!(id.to_string(), "sim-1");
        assert_eq!(id.as_str(), "sim-1");
    }

    #[test]
    fn test_sim_id_serde_roundtrip() {
        let id = SimId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: SimId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
