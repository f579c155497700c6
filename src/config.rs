//! Engine configuration, loadable from TOML.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ledger: LedgerConfig,
    pub keys: KeyConfig,
    pub soda: SodaConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// On-disk sled directory. `None` opens a temporary database.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub case: KeyCase,
}

/// How identifiers are treated before composite keys are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCase {
    #[default]
    Sensitive,
    Insensitive,
}

impl KeyCase {
    pub fn apply(&self, id: &mut String) {
        if *self == KeyCase::Insensitive {
            *id = id.to_lowercase();
        }
    }
}

/// Soda admission draw: uniform in `[gate_min, gate_max)`, admitted when even.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SodaConfig {
    pub gate_min: u32,
    pub gate_max: u32,
}

impl Default for SodaConfig {
    fn default() -> Self {
        Self {
            gate_min: 10,
            gate_max: 100,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.soda.validate()
    }
}

impl SodaConfig {
    /// The draw range must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gate_min >= self.gate_max {
            return Err(ConfigError::Invalid(format!(
                "soda.gate_min ({}) must be below soda.gate_max ({})",
                self.gate_min, self.gate_max
            )));
        }
        Ok(())
    }
}
