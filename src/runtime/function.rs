//! Host Callables
//!
//! Functions carry an optional introspectable signature and a body. Calling
//! a function directly performs the host's own argument binding.

use anyhow::{anyhow, bail};
use std::fmt;
use std::sync::Arc;

use super::Value;
use crate::error::ResolutionError;
use crate::signature::Signature;

/// The implementation behind a [`Function`]
pub type Body = dyn Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync;

/// Call-site arguments: positional values plus keyword values in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument. Repeating a name is kept as given and
    /// rejected when a function binds the arguments.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keywords: Vec::new(),
        }
    }
}

impl From<(Vec<Value>, Vec<(String, Value)>)> for Arguments {
    fn from((positional, keywords): (Vec<Value>, Vec<(String, Value)>)) -> Self {
        Self {
            positional,
            keywords,
        }
    }
}

struct FunctionInner {
    name: String,
    signature: Option<Signature>,
    body: Box<Body>,
    /// Forwarding wrappers leave binding to the function they forward to
    binds: bool,
}

/// A named host callable.
///
/// Cloning is cheap and preserves identity: clones compare equal as values.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    /// A function with a known signature. The body receives its arguments
    /// already bound: one positional value per parameter, defaults applied.
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::from_parts(name, Some(signature), Box::new(body), true)
    }

    /// A function whose signature is given in textual form, e.g. `"(bar, baz=1)"`
    pub fn parse<F>(
        name: impl Into<String>,
        signature: &str,
        body: F,
    ) -> Result<Self, ResolutionError>
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Ok(Self::new(name, Signature::parse(signature)?, body))
    }

    /// An opaque native callable without an introspectable signature.
    /// The body receives the call-site arguments untouched.
    pub fn native<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::from_parts(name, None, Box::new(body), false)
    }

    /// Advertises `signature` but hands the body the call-site arguments
    /// untouched.
    pub(crate) fn forwarding(
        name: impl Into<String>,
        signature: Option<Signature>,
        body: Box<Body>,
    ) -> Self {
        Self::from_parts(name, signature, body, false)
    }

    fn from_parts(
        name: impl Into<String>,
        signature: Option<Signature>,
        body: Box<Body>,
        binds: bool,
    ) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                signature,
                body,
                binds,
            }),
        }
    }

    /// Full (possibly dotted) name, e.g. `Foo.get_faz`
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Last segment of the dotted name, used in diagnostics
    pub fn display_name(&self) -> &str {
        self.inner.name.rsplit('.').next().unwrap_or(&self.inner.name)
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.inner.signature.as_ref()
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn call(&self, args: &Arguments) -> anyhow::Result<Value> {
        match &self.inner.signature {
            Some(signature) if self.inner.binds => {
                let bound = bind(signature, self.display_name(), args)?;
                (self.inner.body)(&bound)
            }
            _ => (self.inner.body)(args),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("signature", &self.inner.signature)
            .finish_non_exhaustive()
    }
}

/// Host argument binding: positional first, then keywords, then defaults
fn bind(signature: &Signature, function: &str, args: &Arguments) -> anyhow::Result<Arguments> {
    let params = signature.params();
    let positional = args.positional();
    if positional.len() > params.len() {
        bail!(
            "{}() takes {} positional arguments but {} were given",
            function,
            params.len(),
            positional.len()
        );
    }

    let mut slots: Vec<Option<Value>> = positional.iter().cloned().map(Some).collect();
    slots.resize(params.len(), None);

    for (pos, (name, value)) in args.keywords().iter().enumerate() {
        if args.keywords()[..pos].iter().any(|(earlier, _)| earlier == name) {
            bail!("{}() keyword argument repeated: '{}'", function, name);
        }
        let idx = params.iter().position(|p| p.name() == name).ok_or_else(|| {
            anyhow!("{}() got an unexpected keyword argument '{}'", function, name)
        })?;
        if slots[idx].is_some() {
            bail!("{}() got multiple values for argument '{}'", function, name);
        }
        slots[idx] = Some(value.clone());
    }

    let values = params
        .iter()
        .zip(slots)
        .map(|(param, slot)| {
            slot.or_else(|| param.default().cloned()).ok_or_else(|| {
                anyhow!("{}() missing required argument: '{}'", function, param.name())
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Arguments::from(values))
}
