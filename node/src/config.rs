//! Node configuration with TOML file support.

use remit_types::Identity;
use remit_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::NodeError;

/// Configuration for a Remit node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Owner of the ledger's control surface. Required to start a fresh
    /// ledger; ignored when a snapshot is restored.
    #[serde(default)]
    pub owner: Option<Identity>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where the engine state is loaded from and saved to.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// External funds available to each identity in the simulated custody.
    #[serde(default)]
    pub custody_funding: BTreeMap<Identity, u64>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            snapshot_path: None,
            custody_funding: BTreeMap::new(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NodeError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The configured owner, or a config error if none was given.
    pub fn require_owner(&self) -> Result<&Identity, NodeError> {
        self.owner
            .as_ref()
            .ok_or_else(|| NodeError::Config("owner identity is not configured".into()))
    }

    /// Custody funding as `(identity, amount)` pairs.
    pub fn funding(&self) -> impl Iterator<Item = (Identity, u128)> + '_ {
        self.custody_funding
            .iter()
            .map(|(who, amount)| (who.clone(), u128::from(*amount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert!(config.owner.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.custody_funding.is_empty());
        assert!(config.require_owner().is_err());
    }

    #[test]
    fn full_toml_parses() {
        let toml = r#"
            owner = "treasury"
            log_format = "json"
            log_level = "debug"
            snapshot_path = "/var/lib/remit/state.bin"

            [custody_funding]
            user1 = 100000000
            user2 = 5
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.require_owner().unwrap().as_str(), "treasury");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/var/lib/remit/state.bin")));
        let funding: Vec<_> = config.funding().collect();
        assert_eq!(funding.len(), 2);
        assert_eq!(funding[0].1, 100_000_000);
    }

    #[test]
    fn invalid_owner_is_a_config_error() {
        let err = NodeConfig::from_toml_str(r#"owner = "has space""#).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = NodeConfig {
            owner: Some(Identity::new("treasury").unwrap()),
            log_level: "warn".into(),
            ..NodeConfig::default()
        };
        let parsed = NodeConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed.owner, config.owner);
        assert_eq!(parsed.log_level, "warn");
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remit.toml");
        std::fs::write(&path, "owner = \"treasury\"\n").unwrap();
        let config = NodeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.require_owner().unwrap().as_str(), "treasury");
        assert!(NodeConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
