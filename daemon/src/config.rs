//! Daemon configuration with TOML file support.

use civitas_governance::GovernanceParams;
use civitas_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),
}

/// Configuration for the `civitas` CLI.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; flags and
/// `CIVITAS_*` environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Snapshot file holding governance state and the local ledger.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "GovernanceParams::default")]
    pub governance: GovernanceParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_state_file() -> PathBuf {
    PathBuf::from("./civitas.state")
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config
            .governance
            .validate()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            governance: GovernanceParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_governance::QvCapPolicy;
    use civitas_types::{TokenAmount, WalletAddress};
    use std::io::Write;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.governance.qv_max_weight, 10);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            state_file = "/var/lib/civitas/state.bin"
            log_format = "json"

            [governance]
            custody = "0x00000000000000000000000000000000000000aa"
            qv_unit = 1000
            qv_cap_policy = "reject"
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.state_file, PathBuf::from("/var/lib/civitas/state.bin"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.governance.qv_unit, TokenAmount::new(1000));
        assert_eq!(config.governance.qv_cap_policy, QvCapPolicy::Reject);
        assert_eq!(config.governance.qv_max_weight, 10);
        let mut custody = [0u8; 20];
        custody[19] = 0xaa;
        assert_eq!(config.governance.custody, WalletAddress::from_bytes(custody));
    }

    #[test]
    fn invalid_governance_params_rejected() {
        let toml = "[governance]\nqv_max_weight = 0\n";
        assert!(matches!(
            DaemonConfig::from_toml_str(toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn bad_custody_address_rejected() {
        let toml = "[governance]\ncustody = \"not-an-address\"\n";
        assert!(DaemonConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let config = DaemonConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = DaemonConfig::from_toml_file(Path::new("/nonexistent/civitas.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
