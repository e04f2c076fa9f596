//! Declarative Checks
//!
//! Checks for a function can be written down as data instead of code:
//!
//! ```yaml
//! function: foo
//! args: [int, [str, pass]]
//! kwargs:
//!   baz: callable
//! returns: int
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::checker::{RawSpec, TypeChecker};

/// A single type name or a list of alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredSpec {
    One(String),
    AnyOf(Vec<String>),
}

impl From<&DeclaredSpec> for RawSpec {
    fn from(spec: &DeclaredSpec) -> Self {
        match spec {
            DeclaredSpec::One(name) => RawSpec::from(name.as_str()),
            DeclaredSpec::AnyOf(names) => RawSpec::any_of(names.iter().map(String::as_str)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Name of the function the checks apply to
    pub function: String,
    #[serde(default)]
    pub args: Vec<DeclaredSpec>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, DeclaredSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<DeclaredSpec>,
}

impl Declaration {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON declaration")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML declaration")
    }

    /// Load from `.json`, `.yaml` or `.yml`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read declaration at {:?}", path))?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => bail!("Unsupported declaration format: {:?}", path),
        }
    }

    /// A checker carrying these checks, with builtin-only name resolution
    /// and default configuration.
    pub fn checker(&self) -> TypeChecker {
        let checker = TypeChecker::new().args(self.args.iter().map(RawSpec::from));
        let checker = self
            .kwargs
            .iter()
            .fold(checker, |checker, (name, spec)| {
                checker.kwarg(name.clone(), RawSpec::from(spec))
            });
        match &self.returns {
            Some(spec) => checker.returns(RawSpec::from(spec)),
            None => checker,
        }
    }
}
