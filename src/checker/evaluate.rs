//! Conformance evaluation.

use super::binder::ParameterTable;
use super::report::{Mismatch, Slot};
use super::spec::{resolve, TypeSpec};
use super::unify::{Actual, ValueTable};
use crate::runtime::{Reflection, TypeRef, Value};

pub(crate) fn conforms(spec: &TypeSpec, value: &Value, reflection: &dyn Reflection) -> bool {
    match spec {
        TypeSpec::Ignore => true,
        TypeSpec::Callable => reflection.is_invokable(value),
        TypeSpec::Exact(class) => reflection.is_instance(value, &TypeRef::Class(class.clone())),
        TypeSpec::Primitive(name) => reflection.is_instance(value, &resolve(name, reflection)),
        TypeSpec::OneOf(members) => members.iter().any(|m| conforms(m, value, reflection)),
    }
}

/// Check every parameter in table order, stopping at the first failure
pub(crate) fn evaluate(
    table: &ParameterTable,
    values: &ValueTable<'_>,
    function: &str,
    reflection: &dyn Reflection,
) -> Result<(), Box<Mismatch>> {
    for ((name, spec), (_, actual)) in table.iter().zip(values.iter()) {
        let value = match actual {
            Actual::Value(value) => *value,
            Actual::Ignore => continue,
        };
        if !conforms(spec, value, reflection) {
            let slot = Slot::Parameter(name.to_string());
            return Err(Mismatch::new(slot, function, value, spec, reflection));
        }
    }
    Ok(())
}

pub(crate) fn check_return(
    spec: &TypeSpec,
    value: &Value,
    function: &str,
    reflection: &dyn Reflection,
) -> Result<(), Box<Mismatch>> {
    if conforms(spec, value, reflection) {
        Ok(())
    } else {
        Err(Mismatch::new(Slot::Return, function, value, spec, reflection))
    }
}
