//! Conformance failure reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::spec::TypeSpec;
use crate::runtime::{Reflection, Value};

/// Where the offending value was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Slot {
    Parameter(String),
    Return,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Parameter(name) => f.write_str(name),
            Slot::Return => f.write_str("return"),
        }
    }
}

/// A value that failed its declared check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub slot: Slot,
    pub function: String,
    /// `repr` of the offending value
    pub value: String,
    /// Runtime type of the offending value
    pub value_type: String,
    pub expected: String,
}

impl Mismatch {
    pub(crate) fn new(
        slot: Slot,
        function: &str,
        value: &Value,
        expected: &TypeSpec,
        reflection: &dyn Reflection,
    ) -> Box<Self> {
        Box::new(Self {
            slot,
            function: function.to_string(),
            value: value.to_string(),
            value_type: reflection.type_of(value).to_string(),
            expected: expected.describe(reflection),
        })
    }

    pub fn parameter(&self) -> Option<&str> {
        match &self.slot {
            Slot::Parameter(name) => Some(name),
            Slot::Return => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Parameter(name) => write!(
                f,
                "The value {} sent to parameter {} of function {} is of type {}, expected type {}",
                self.value, name, self.function, self.value_type, self.expected
            ),
            Slot::Return => write!(
                f,
                "The value {} returned by function {} is of type {}, expected type {}",
                self.value, self.function, self.value_type, self.expected
            ),
        }
    }
}

impl std::error::Error for Mismatch {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::TypeRegistry;
    use serde_json::json;

    #[test]
    fn test_parameter_message() {
        let registry = TypeRegistry::new();
        let m = Mismatch::new(
            Slot::Parameter("bar".into()),
            "foo",
            &Value::from("5"),
            &TypeSpec::Primitive("int".into()),
            &registry,
        );
        assert_eq!(
            m.to_string(),
            "The value '5' sent to parameter bar of function foo is of type <class 'str'>, expected type <class 'int'>"
        );
        assert_eq!(m.parameter(), Some("bar"));
    }

    #[test]
    fn test_return_message_and_json() {
        let registry = TypeRegistry::new();
        let m = Mismatch::new(Slot::Return, "foo", &Value::Int(1), &TypeSpec::Callable, &registry);
        assert_eq!(
            m.to_string(),
            "The value 1 returned by function foo is of type <class 'int'>, expected type callable"
        );
        assert_eq!(
            m.to_json(),
            json!({
                "slot": { "kind": "return" },
                "function": "foo",
                "value": "1",
                "value_type": "<class 'int'>",
                "expected": "callable"
            })
        );
    }
}
