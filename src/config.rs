//! Checker Configuration
//!
//! Loaded from the environment (with `.env` support) or from a JSON/YAML file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const ENV_ENABLED: &str = "ARGCHECK_ENABLED";
pub const ENV_CHECK_RETURNS: &str = "ARGCHECK_CHECK_RETURNS";
pub const ENV_SHORTFALL: &str = "ARGCHECK_SHORTFALL";

/// What to do when fewer checks are declared than the function has parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Unchecked parameters accept any value
    #[default]
    Ignore,
    /// Decoration fails with `TypeCheckError::NotEnoughSpecs`
    Reject,
}

impl FromStr for ShortfallPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(ShortfallPolicy::Ignore),
            "reject" => Ok(ShortfallPolicy::Reject),
            other => bail!("unknown shortfall policy '{}' (expected 'ignore' or 'reject')", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// When false, decoration yields a pass-through wrapper
    pub enabled: bool,
    pub check_returns: bool,
    pub shortfall: ShortfallPolicy,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_returns: true,
            shortfall: ShortfallPolicy::Ignore,
        }
    }
}

impl CheckerConfig {
    /// Read `ARGCHECK_*` variables, loading a `.env` file first if present.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`CheckerConfig::from_env`], loading the given `.env` file
    /// instead of searching for one. Variables already set in the process
    /// take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dotenv::from_path(path).with_context(|| format!("Failed to load env file at {:?}", path))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_ENABLED) {
            config.enabled = parse_flag(ENV_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CHECK_RETURNS) {
            config.check_returns = parse_flag(ENV_CHECK_RETURNS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SHORTFALL) {
            config.shortfall = raw
                .parse::<ShortfallPolicy>()
                .with_context(|| format!("Invalid value for {}", ENV_SHORTFALL))?;
        }
        Ok(config)
    }

    /// Load from `.json`, `.yaml` or `.yml`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read checker config at {:?}", path))?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse checker config at {:?}", path)),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse checker config at {:?}", path)),
            _ => bail!("Unsupported checker config format: {:?}", path),
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid value for {}: '{}' is not a boolean", key, other),
    }
}
