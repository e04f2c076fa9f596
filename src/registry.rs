//! Checked Function Registry
//!
//! Holds decorated functions by name so that calls can be dispatched
//! dynamically, and applies declaration files to host functions in bulk.

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::checker::{Checked, TypeChecker};
use crate::config::CheckerConfig;
use crate::declaration::Declaration;
use crate::error::Error;
use crate::runtime::{Arguments, Function, Reflection, TypeRegistry, Value};

pub struct CheckedRegistry {
    functions: RwLock<HashMap<String, Checked>>,
    reflection: Arc<dyn Reflection>,
    config: CheckerConfig,
}

impl CheckedRegistry {
    pub fn new(reflection: Arc<dyn Reflection>) -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
            reflection,
            config: CheckerConfig::default(),
        }
    }

    /// Configuration used for checkers built from declarations
    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// A checker that resolves names against this registry's host
    pub fn checker(&self) -> TypeChecker {
        TypeChecker::new()
            .with_reflection(self.reflection.clone())
            .with_config(self.config.clone())
    }

    /// Register under the function's full name, replacing any previous entry
    pub fn register(&self, checked: Checked) {
        self.functions.write().insert(checked.name().to_string(), checked);
    }

    pub fn get(&self, name: &str) -> Option<Checked> {
        self.functions.read().get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }

    pub fn call(&self, name: &str, args: &Arguments) -> Result<Value, Error> {
        let checked = self.get(name).ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        checked.call(args)
    }

    /// Apply one declaration to the matching function in `functions`
    pub fn apply(&self, declaration: &Declaration, functions: &[Function]) -> Result<(), Error> {
        let function = functions
            .iter()
            .find(|f| f.name() == declaration.function)
            .cloned()
            .ok_or_else(|| Error::UnknownFunction(declaration.function.clone()))?;
        let checked = declaration
            .checker()
            .with_reflection(self.reflection.clone())
            .with_config(self.config.clone())
            .decorate(function)?;
        self.register(checked);
        Ok(())
    }

    /// Load every `.json`, `.yaml` and `.yml` declaration in `dir_path` and
    /// apply it to the function it names. Files that fail to load or apply
    /// are skipped. Returns the number of functions registered.
    pub fn load_declarations(
        &self,
        dir_path: impl AsRef<Path>,
        functions: &[Function],
    ) -> Result<usize> {
        let path = dir_path.as_ref();
        if !path.exists() {
            return Ok(0);
        }

        let mut entries: Vec<_> = std::fs::read_dir(path)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| {
                matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "yaml" | "yml"))
            })
            .collect();
        entries.sort();

        let mut count = 0;
        for path in entries {
            let applied = Declaration::from_file(&path).and_then(|decl| {
                self.apply(&decl, functions)?;
                Ok(decl)
            });
            match applied {
                Ok(decl) => {
                    info!("Loaded checks for {} from {:?}", decl.function, path);
                    count += 1;
                }
                Err(e) => warn!("Failed to load declaration at {:?}: {}", path, e),
            }
        }
        Ok(count)
    }
}

impl Default for CheckedRegistry {
    fn default() -> Self {
        Self::new(Arc::new(TypeRegistry::new()))
    }
}
