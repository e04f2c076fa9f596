//! Binding declared checks to parameter names.

use tracing::warn;

use super::spec::{normalize, RawSpec, TypeSpec};
use crate::config::ShortfallPolicy;
use crate::error::TypeCheckError;
use crate::signature::ResolvedParams;

/// Parameter name to check, in declaration order. Built once per
/// decoration and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    entries: Vec<(String, TypeSpec)>,
}

impl ParameterTable {
    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.entries.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize the check for one slot. A function can only stand in for the
/// whole check list, never for a single check.
pub(crate) fn check_for(
    function: &str,
    parameter: &str,
    raw: &RawSpec,
) -> Result<TypeSpec, TypeCheckError> {
    if raw.contains_function() {
        return Err(TypeCheckError::InvalidSpec {
            function: function.to_string(),
            parameter: parameter.to_string(),
        });
    }
    Ok(normalize(raw))
}

/// Positional checks fill parameters in order and excess ones are dropped.
/// Named checks must name a declared parameter not already covered
/// positionally. Whatever is left unset becomes `Ignore`, unless the
/// shortfall policy rejects it.
pub(crate) fn bind(
    function: &str,
    positional: &[RawSpec],
    named: &[(String, RawSpec)],
    params: &ResolvedParams,
    shortfall: ShortfallPolicy,
) -> Result<ParameterTable, TypeCheckError> {
    let mut slots: Vec<Option<TypeSpec>> = vec![None; params.len()];

    if positional.len() > params.len() {
        warn!(
            "Discarding {} excess positional checks for function {}",
            positional.len() - params.len(),
            function
        );
    }
    for ((slot, name), raw) in slots.iter_mut().zip(params.names()).zip(positional) {
        *slot = Some(check_for(function, name, raw)?);
    }

    for (name, raw) in named {
        let idx = params.position(name).ok_or_else(|| TypeCheckError::UnknownParameter {
            function: function.to_string(),
            parameter: name.clone(),
        })?;
        if slots[idx].is_some() {
            return Err(TypeCheckError::Collision {
                function: function.to_string(),
                parameter: name.clone(),
            });
        }
        slots[idx] = Some(check_for(function, name, raw)?);
    }

    if shortfall == ShortfallPolicy::Reject {
        if let Some(idx) = slots.iter().position(Option::is_none) {
            return Err(TypeCheckError::NotEnoughSpecs {
                function: function.to_string(),
                parameter: params.names()[idx].clone(),
            });
        }
    }

    let entries = params
        .names()
        .iter()
        .cloned()
        .zip(slots)
        .map(|(name, slot)| (name, slot.unwrap_or(TypeSpec::Ignore)))
        .collect();
    Ok(ParameterTable { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Function, Value};
    use crate::signature::Signature;

    fn params(text: &str) -> ResolvedParams {
        ResolvedParams::from(&Signature::parse(text).unwrap())
    }

    fn bind_positional(specs: &[RawSpec], text: &str) -> Result<ParameterTable, TypeCheckError> {
        bind("foo", specs, &[], &params(text), ShortfallPolicy::Ignore)
    }

    fn int() -> TypeSpec {
        TypeSpec::Primitive("int".into())
    }

    fn str_() -> TypeSpec {
        TypeSpec::Primitive("str".into())
    }

    #[test]
    fn test_positional_in_order() {
        let table = bind_positional(&["int".into(), "str".into()], "(bar, baz)").unwrap();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("bar", &int()), ("baz", &str_())]);
    }

    #[test]
    fn test_excess_positional_discarded() {
        let table = bind_positional(&["int".into(), "int".into()], "(bar)").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("bar"), Some(&int()));
    }

    #[test]
    fn test_shortfall_defaults_to_ignore() {
        let table = bind_positional(&["int".into()], "(bar, baz)").unwrap();
        assert_eq!(table.get("baz"), Some(&TypeSpec::Ignore));
    }

    #[test]
    fn test_shortfall_reject_policy() {
        let positional = [RawSpec::from("int")];
        let err = bind("foo", &positional, &[], &params("(bar, baz)"), ShortfallPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            TypeCheckError::NotEnoughSpecs {
                function: "foo".into(),
                parameter: "baz".into(),
            }
        );

        // named checks may cover the rest
        let named = vec![("baz".to_string(), RawSpec::from("str"))];
        let table = bind("foo", &positional, &named, &params("(bar, baz)"), ShortfallPolicy::Reject)
            .unwrap();
        assert_eq!(table.get("baz"), Some(&str_()));
    }

    #[test]
    fn test_named_fills_uncovered_parameter() {
        let named = vec![("baz".to_string(), RawSpec::from("str"))];
        let table =
            bind("foo", &[], &named, &params("(bar, baz)"), ShortfallPolicy::Ignore).unwrap();
        assert_eq!(table.get("bar"), Some(&TypeSpec::Ignore));
        assert_eq!(table.get("baz"), Some(&str_()));
    }

    #[test]
    fn test_named_collides_with_positional() {
        let named = vec![("a".to_string(), RawSpec::from("str"))];
        let err = bind("f", &["int".into()], &named, &params("(a, b)"), ShortfallPolicy::Ignore)
            .unwrap_err();
        assert_eq!(
            err,
            TypeCheckError::Collision {
                function: "f".into(),
                parameter: "a".into(),
            }
        );
    }

    #[test]
    fn test_named_unknown_parameter() {
        let named = vec![("qux".to_string(), RawSpec::from("str"))];
        let err = bind("f", &[], &named, &params("(a, b)"), ShortfallPolicy::Ignore).unwrap_err();
        assert_eq!(err.parameter(), "qux");
        assert!(matches!(err, TypeCheckError::UnknownParameter { .. }));
    }

    #[test]
    fn test_function_item_is_rejected() {
        let helper = Function::native("helper", |_| Ok(Value::None));

        let err = bind_positional(&[helper.clone().into(), "int".into()], "(a, b)").unwrap_err();
        assert_eq!(
            err,
            TypeCheckError::InvalidSpec {
                function: "foo".into(),
                parameter: "a".into(),
            }
        );

        let nested = RawSpec::any_of([RawSpec::from("int"), helper.clone().into()]);
        let err = bind_positional(&["int".into(), nested], "(a, b)").unwrap_err();
        assert_eq!(err.parameter(), "b");

        let named = vec![("b".to_string(), RawSpec::from(helper))];
        let err = bind("foo", &[], &named, &params("(a, b)"), ShortfallPolicy::Ignore).unwrap_err();
        assert!(matches!(err, TypeCheckError::InvalidSpec { .. }));
    }
}
