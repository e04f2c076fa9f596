//! Unifying call-site arguments into a per-parameter value table.

use crate::error::TypeCheckError;
use crate::runtime::{Arguments, Value};
use crate::signature::ResolvedParams;

/// The value a parameter received for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Actual<'a> {
    Value(&'a Value),
    /// Not supplied, the default applies
    Ignore,
}

/// Parameter name to actual value, in declaration order. Built per call.
#[derive(Debug)]
pub(crate) struct ValueTable<'a> {
    entries: Vec<(&'a str, Actual<'a>)>,
}

impl<'a> ValueTable<'a> {
    pub(crate) fn iter(&self) -> impl Iterator<Item = &(&'a str, Actual<'a>)> {
        self.entries.iter()
    }
}

/// Keywords naming no declared parameter, and positional arguments beyond the
/// parameter list, are left for the wrapped callable to reject.
pub(crate) fn unify<'a>(
    function: &str,
    args: &'a Arguments,
    params: &'a ResolvedParams,
) -> Result<ValueTable<'a>, TypeCheckError> {
    let mut slots: Vec<Option<&'a Value>> = vec![None; params.len()];

    for (slot, value) in slots.iter_mut().zip(args.positional()) {
        *slot = Some(value);
    }
    for (name, value) in args.keywords() {
        if let Some(idx) = params.position(name) {
            slots[idx] = Some(value);
        }
    }

    let entries = params
        .names()
        .iter()
        .zip(slots)
        .map(|(name, slot)| match slot {
            Some(value) => Ok((name.as_str(), Actual::Value(value))),
            None if params.has_default(name) => Ok((name.as_str(), Actual::Ignore)),
            None => Err(TypeCheckError::MissingValue {
                function: function.to_string(),
                parameter: name.clone(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValueTable { entries })
}
