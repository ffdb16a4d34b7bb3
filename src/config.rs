//! Configuration file (`courier-rates.yaml`)
//!
//! ```yaml
//! version: 1
//! tariff_path: rates/tariff.csv
//! default_service: EXPRESS
//! currency: LKR
//! log_level: info
//! branches:
//!   - name: Negombo
//!     code: "10"
//!   - name: Dehiwala
//!     code: "20"
//! ```

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name looked up by [`RatesConfig::load_from_dir`]
pub const CONFIG_FILE: &str = "courier-rates.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RatesConfig {
    /// Schema version for migrations
    pub version: u32,

    /// Tariff table, relative to the config file's directory
    #[serde(default = "default_tariff_path")]
    pub tariff_path: PathBuf,

    /// Service level used when a command does not name one
    #[serde(default = "default_service")]
    pub default_service: String,

    /// Currency code printed next to prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Fallback log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// A front-desk branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Branch {
    pub name: String,

    /// Two-digit prefix of the branch's invoice numbers
    pub code: String,
}

fn default_tariff_path() -> PathBuf {
    PathBuf::from("tariff.csv")
}

fn default_service() -> String {
    "EXPRESS".to_string()
}

fn default_currency() -> String {
    "LKR".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            version: 1,
            tariff_path: default_tariff_path(),
            default_service: default_service(),
            currency: default_currency(),
            log_level: default_log_level(),
            branches: Vec::new(),
        }
    }
}

impl RatesConfig {
    /// Parse config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RatesConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        if config.version != 1 {
            return Err(Error::Config(format!(
                "unsupported config version: {}",
                config.version
            )));
        }

        Ok(config)
    }

    /// Load a config file; a relative `tariff_path` is resolved against
    /// the file's directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut config = Self::from_yaml(&content)?;
        if config.tariff_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.tariff_path = dir.join(&config.tariff_path);
            }
        }
        Ok(config)
    }

    /// Load `courier-rates.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Ok(None);
        }
        Self::load(&file).map(Some)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(self)?)
    }

    /// Find a branch by name, ignoring case
    pub fn branch(&self, name: &str) -> Result<&Branch> {
        self.branches
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownBranch(name.to_string()))
    }

    /// Problems that make the config unusable for invoicing
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_service.trim().is_empty() {
            errors.push("default_service must not be empty".into());
        }

        let mut seen = HashSet::new();
        for branch in &self.branches {
            if branch.code.len() != 2 || !branch.code.chars().all(|c| c.is_ascii_digit()) {
                errors.push(format!(
                    "Branch {} has invalid code {:?} (expected two digits)",
                    branch.name, branch.code
                ));
            }
            if !seen.insert(branch.code.as_str()) {
                errors.push(format!("Duplicate branch code: {}", branch.code));
            }
        }

        errors
    }
}
