//! Host Object Model
//!
//! A small dynamically typed value model that stands in for the host
//! environment: builtin primitive types, user-defined classes with
//! inheritance, instances, and invokable functions.

mod function;
mod reflect;

pub use function::{Arguments, Body, Function};
pub use reflect::{Reflection, TypeRegistry};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builtin primitive types known to every host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Dict,
    Function,
    NoneType,
    Object,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Bool,
        Builtin::Int,
        Builtin::Float,
        Builtin::Str,
        Builtin::List,
        Builtin::Tuple,
        Builtin::Dict,
        Builtin::Function,
        Builtin::NoneType,
        Builtin::Object,
    ];

    /// The host-visible type name
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Str => "str",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Dict => "dict",
            Builtin::Function => "function",
            Builtin::NoneType => "NoneType",
            Builtin::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user-defined class.
///
/// Classes compare by identity: two classes declared with the same name are
/// still distinct types.
#[derive(Debug)]
pub struct Class {
    name: String,
    module: Option<String>,
    bases: Vec<Arc<Class>>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_bases(name, Vec::new())
    }

    pub fn with_bases(name: impl Into<String>, bases: Vec<Arc<Class>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            module: None,
            bases,
        })
    }

    /// A class living in a named module, e.g. `shapes.Circle`
    pub fn in_module(
        module: impl Into<String>,
        name: impl Into<String>,
        bases: Vec<Arc<Class>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            module: Some(module.into()),
            bases,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn bases(&self) -> &[Arc<Class>] {
        &self.bases
    }

    /// Dotted name including the module when one is set
    pub fn qualname(&self) -> String {
        match &self.module {
            Some(module) => format!("{}.{}", module, self.name),
            None => self.name.clone(),
        }
    }

    /// Reflexive and inheritance-inclusive subclass test
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        std::ptr::eq(self, other) || self.bases().iter().any(|base| base.is_subclass_of(other))
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// An instance of a user-defined class
#[derive(Debug)]
pub struct Instance {
    class: Arc<Class>,
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A reference to a checkable type
#[derive(Debug, Clone)]
pub enum TypeRef {
    Builtin(Builtin),
    Class(Arc<Class>),
}

impl TypeRef {
    pub fn name(&self) -> String {
        match self {
            TypeRef::Builtin(builtin) => builtin.name().to_string(),
            TypeRef::Class(class) => class.qualname(),
        }
    }

    /// Nominal, inheritance-inclusive membership
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeRef::Builtin(Builtin::Object), _) => true,
            (TypeRef::Builtin(builtin), value) => value.builtin() == Some(*builtin),
            (TypeRef::Class(class), Value::Object(instance)) => {
                instance.class.is_subclass_of(class)
            }
            (TypeRef::Class(_), _) => false,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Builtin(a), TypeRef::Builtin(b)) => a == b,
            (TypeRef::Class(a), TypeRef::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name())
    }
}

impl From<Builtin> for TypeRef {
    fn from(builtin: Builtin) -> Self {
        TypeRef::Builtin(builtin)
    }
}

impl From<Arc<Class>> for TypeRef {
    fn from(class: Arc<Class>) -> Self {
        TypeRef::Class(class)
    }
}

impl From<&Arc<Class>> for TypeRef {
    fn from(class: &Arc<Class>) -> Self {
        TypeRef::Class(class.clone())
    }
}

/// A dynamically typed host value
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// String-keyed, insertion ordered
    Dict(Vec<(String, Value)>),
    Function(Function),
    Object(Arc<Instance>),
}

impl Value {
    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn dict<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(entries: I) -> Self {
        Value::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Instantiate a user-defined class
    pub fn object<K, I>(class: &Arc<Class>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Arc::new(Instance {
            class: class.clone(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    /// The builtin type of this value, `None` for class instances
    pub fn builtin(&self) -> Option<Builtin> {
        Some(match self {
            Value::None => Builtin::NoneType,
            Value::Bool(_) => Builtin::Bool,
            Value::Int(_) => Builtin::Int,
            Value::Float(_) => Builtin::Float,
            Value::Str(_) => Builtin::Str,
            Value::List(_) => Builtin::List,
            Value::Tuple(_) => Builtin::Tuple,
            Value::Dict(_) => Builtin::Dict,
            Value::Function(_) => Builtin::Function,
            Value::Object(_) => return None,
        })
    }

    /// The runtime type of this value
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Value::Object(instance) => TypeRef::Class(instance.class.clone()),
            other => TypeRef::Builtin(other.builtin().unwrap_or(Builtin::Object)),
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Look up a key in a dict value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Quoted string literal: single quotes unless the text contains a single
/// quote and no double quote.
fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest round-trip digits, positional for exponents in `-4..16` and
/// scientific (`1e+16`, `1.5e-05`) otherwise.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sign = if x.is_sign_negative() { "-" } else { "" };
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..16).contains(&exp) {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exp.abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exp < 0 {
        format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
    } else {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
        } else {
            format!("{}.{}", &digits[..int_len], &digits[int_len..])
        }
    };
    format!("{}{}", sign, body)
}

/// Renders the host `repr` of a value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&float_repr(*x)),
            Value::Str(s) => f.write_str(&str_repr(s)),
            Value::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Dict(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", str_repr(key), value)?;
                }
                f.write_str("}")
            }
            Value::Function(function) => write!(f, "<function {}>", function.name()),
            Value::Object(instance) => write!(f, "<{} object>", instance.class.qualname()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}
