//! Declared checks and their canonical form.

use std::sync::Arc;

use crate::runtime::{Builtin, Class, Function, Reflection, TypeRef};

/// A check item as the caller declares it
#[derive(Debug, Clone)]
pub enum RawSpec {
    /// A type name, resolved when the check runs
    Name(String),
    Type(TypeRef),
    /// Any invokable value
    Callable,
    /// No check
    Pass,
    /// Acceptable alternatives
    AnyOf(Vec<RawSpec>),
    /// The function being decorated, given in place of checks
    Function(Function),
}

impl RawSpec {
    pub fn any_of<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RawSpec>,
    {
        RawSpec::AnyOf(items.into_iter().map(Into::into).collect())
    }

    /// Whether a function appears anywhere in this item
    pub fn contains_function(&self) -> bool {
        match self {
            RawSpec::Function(_) => true,
            RawSpec::AnyOf(items) => items.iter().any(RawSpec::contains_function),
            _ => false,
        }
    }
}

impl From<&str> for RawSpec {
    fn from(name: &str) -> Self {
        match name {
            "pass" => RawSpec::Pass,
            "callable" => RawSpec::Callable,
            other => RawSpec::Name(other.to_string()),
        }
    }
}

impl From<String> for RawSpec {
    fn from(name: String) -> Self {
        RawSpec::from(name.as_str())
    }
}

impl From<Builtin> for RawSpec {
    fn from(builtin: Builtin) -> Self {
        RawSpec::Type(TypeRef::Builtin(builtin))
    }
}

impl From<TypeRef> for RawSpec {
    fn from(ty: TypeRef) -> Self {
        RawSpec::Type(ty)
    }
}

impl From<Arc<Class>> for RawSpec {
    fn from(class: Arc<Class>) -> Self {
        RawSpec::Type(TypeRef::Class(class))
    }
}

impl From<&Arc<Class>> for RawSpec {
    fn from(class: &Arc<Class>) -> Self {
        RawSpec::Type(TypeRef::Class(class.clone()))
    }
}

impl From<Function> for RawSpec {
    fn from(function: Function) -> Self {
        RawSpec::Function(function)
    }
}

impl From<Vec<RawSpec>> for RawSpec {
    fn from(items: Vec<RawSpec>) -> Self {
        RawSpec::AnyOf(items)
    }
}

/// Canonical check for one parameter or the return slot
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Ignore,
    Callable,
    /// Instance of a user-defined class or one of its subclasses
    Exact(Arc<Class>),
    /// Builtin or late-bound type name
    Primitive(String),
    /// Conforms if any member conforms
    OneOf(Vec<TypeSpec>),
}

impl TypeSpec {
    /// Human-readable form of the expected type, as used in failures.
    /// Unresolvable names describe the none type they fall back to.
    pub fn describe(&self, reflection: &dyn Reflection) -> String {
        match self {
            TypeSpec::Ignore => "pass".to_string(),
            TypeSpec::Callable => "callable".to_string(),
            TypeSpec::Exact(class) => TypeRef::Class(class.clone()).to_string(),
            TypeSpec::Primitive(name) => resolve(name, reflection).to_string(),
            TypeSpec::OneOf(members) => {
                let members: Vec<_> = members.iter().map(|m| m.describe(reflection)).collect();
                format!("({})", members.join(", "))
            }
        }
    }
}

/// Late binding for primitive names; unknown names degrade to the none type
pub(crate) fn resolve(name: &str, reflection: &dyn Reflection) -> TypeRef {
    reflection.locate(name).unwrap_or_else(|| reflection.none_type())
}

pub(crate) fn normalize(raw: &RawSpec) -> TypeSpec {
    match raw {
        RawSpec::Pass => TypeSpec::Ignore,
        RawSpec::Callable => TypeSpec::Callable,
        RawSpec::AnyOf(items) => {
            let mut members = Vec::with_capacity(items.len());
            for item in items {
                match normalize(item) {
                    TypeSpec::Ignore => return TypeSpec::Ignore,
                    // nested alternatives flatten into one level
                    TypeSpec::OneOf(nested) => members.extend(nested),
                    member => members.push(member),
                }
            }
            TypeSpec::OneOf(members)
        }
        RawSpec::Type(TypeRef::Class(class)) => TypeSpec::Exact(class.clone()),
        RawSpec::Type(TypeRef::Builtin(builtin)) => TypeSpec::Primitive(builtin.name().to_string()),
        RawSpec::Name(name) => TypeSpec::Primitive(name.clone()),
        // rejected by the binder before normalization
        RawSpec::Function(function) => TypeSpec::Primitive(function.name().to_string()),
    }
}
