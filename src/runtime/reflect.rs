//! Reflection
//!
//! The seam between the checker and the host environment: turning a type
//! name into a checkable type and answering membership questions.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Builtin, Class, TypeRef, Value};

/// Host reflection facility consumed by the checker
pub trait Reflection: Send + Sync {
    /// Resolve a type name to a checkable type
    fn locate(&self, name: &str) -> Option<TypeRef>;

    /// The type whose only member is the null value
    fn none_type(&self) -> TypeRef {
        TypeRef::Builtin(Builtin::NoneType)
    }

    fn type_of(&self, value: &Value) -> TypeRef {
        value.type_ref()
    }

    /// Nominal membership, including subclasses
    fn is_instance(&self, value: &Value, ty: &TypeRef) -> bool {
        ty.contains(value)
    }

    fn is_invokable(&self, value: &Value) -> bool {
        value.is_callable()
    }
}

/// Builtin types plus user classes registered by name.
///
/// Classes may be registered after a function was decorated; names are
/// resolved at check time.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: RwLock<HashMap<String, Arc<Class>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under its simple name and, when it has a module,
    /// its dotted name. Re-registering a name replaces the earlier class.
    pub fn register(&self, class: &Arc<Class>) {
        let mut classes = self.classes.write();
        classes.insert(class.name().to_string(), class.clone());
        if class.module().is_some() {
            classes.insert(class.qualname(), class.clone());
        }
    }

    pub fn class(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.read().get(name).cloned()
    }

}

impl Reflection for TypeRegistry {
    fn locate(&self, name: &str) -> Option<TypeRef> {
        let bare = name.strip_prefix("builtins.").unwrap_or(name);
        if let Some(builtin) = Builtin::from_name(bare) {
            return Some(TypeRef::Builtin(builtin));
        }
        self.class(name).map(TypeRef::Class)
    }
}
