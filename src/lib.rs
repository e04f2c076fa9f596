//! Argcheck
//!
//! Call-time type checking for dynamically typed host callables:
//! - Positional and named parameter checks with alternatives
//! - Exact class, primitive-by-name and callable checks
//! - Optional return-value checks
//! - Declarative checks loaded from JSON/YAML files

pub mod checker;
pub mod config;
pub mod declaration;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod signature;

// Re-exports for convenience
pub use checker::{
    typecheck, Checked, Decoration, Mismatch, ParameterTable, RawSpec, Slot, TypeChecker, TypeSpec,
};
pub use config::{CheckerConfig, ShortfallPolicy};
pub use declaration::{DeclaredSpec, Declaration};
pub use error::{Error, ErrorKind, ResolutionError, TypeCheckError};
pub use registry::CheckedRegistry;
pub use runtime::{
    Arguments, Builtin, Class, Function, Instance, Reflection, TypeRef, TypeRegistry, Value,
};
pub use signature::{Param, Signature};
