//! Type Checking Decorator
//!
//! Wraps a host function so that each call is validated before it is
//! forwarded:
//! 1. Declared checks are normalized and bound to parameter names once,
//!    at decoration time.
//! 2. Each call's arguments are unified into a per-parameter value table.
//! 3. Every parameter is evaluated in declaration order; the first failure
//!    aborts the call.
//! 4. The wrapped function runs with the original arguments and its result
//!    is checked against the declared return type, if any.

mod binder;
mod evaluate;
mod report;
mod spec;
mod unify;

pub use binder::ParameterTable;
pub use report::{Mismatch, Slot};
pub use spec::{RawSpec, TypeSpec};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::CheckerConfig;
use crate::error::Error;
use crate::runtime::{Arguments, Function, Reflection, TypeRegistry, Value};
use crate::signature::{resolve_parameters, ResolvedParams};

/// The outcome of applying `typecheck` to its arguments
pub enum Decoration {
    /// The sole argument was the function itself: no checks requested
    Passthrough(Checked),
    /// Checks were declared; apply them with [`TypeChecker::decorate`]
    Checker(TypeChecker),
}

impl Decoration {
    pub fn into_passthrough(self) -> Option<Checked> {
        match self {
            Decoration::Passthrough(checked) => Some(checked),
            Decoration::Checker(_) => None,
        }
    }

    pub fn into_checker(self) -> Option<TypeChecker> {
        match self {
            Decoration::Checker(checker) => Some(checker),
            Decoration::Passthrough(_) => None,
        }
    }
}

/// Declare positional checks. A single function argument means the
/// function is being decorated without checks.
pub fn typecheck<I, S>(specs: I) -> Decoration
where
    I: IntoIterator<Item = S>,
    S: Into<RawSpec>,
{
    let mut specs: Vec<RawSpec> = specs.into_iter().map(Into::into).collect();
    if let [RawSpec::Function(_)] = specs.as_slice() {
        if let Some(RawSpec::Function(function)) = specs.pop() {
            return Decoration::Passthrough(Checked::passthrough(function));
        }
    }
    Decoration::Checker(TypeChecker::new().args(specs))
}

/// Builder for the declared checks of one function
pub struct TypeChecker {
    args: Vec<RawSpec>,
    kwargs: Vec<(String, RawSpec)>,
    returns: Option<RawSpec>,
    reflection: Arc<dyn Reflection>,
    config: CheckerConfig,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            kwargs: Vec::new(),
            returns: None,
            reflection: Arc::new(TypeRegistry::new()),
            config: CheckerConfig::default(),
        }
    }

    /// Check for the next positional parameter
    pub fn arg(mut self, spec: impl Into<RawSpec>) -> Self {
        self.args.push(spec.into());
        self
    }

    pub fn args<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RawSpec>,
    {
        self.args.extend(specs.into_iter().map(Into::into));
        self
    }

    /// Check for a parameter by name, replacing an earlier one for that name
    pub fn kwarg(mut self, name: impl Into<String>, spec: impl Into<RawSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        match self.kwargs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = spec,
            None => self.kwargs.push((name, spec)),
        }
        self
    }

    pub fn returns(mut self, spec: impl Into<RawSpec>) -> Self {
        self.returns = Some(spec.into());
        self
    }

    /// Resolve type names against this host instead of the builtins only
    pub fn with_reflection(mut self, reflection: Arc<dyn Reflection>) -> Self {
        self.reflection = reflection;
        self
    }

    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply the declared checks to `function`.
    ///
    /// # Errors
    /// `ResolutionError` if the function has no introspectable signature,
    /// `TypeCheckError` if a named check is unknown or collides with a
    /// positional one, or if a function is given where a type is expected.
    pub fn decorate(self, function: Function) -> Result<Checked, Error> {
        if !self.config.enabled {
            debug!("Type checking disabled, passing {} through", function.name());
            return Ok(Checked::passthrough(function));
        }

        let name = function.display_name().to_string();
        let params = resolve_parameters(&function)?;
        let table = binder::bind(&name, &self.args, &self.kwargs, &params, self.config.shortfall)
            .inspect_err(|e| warn!("Cannot apply checks to {}: {}", name, e))?;
        let returns = self
            .returns
            .as_ref()
            .filter(|_| self.config.check_returns)
            .map(|raw| binder::check_for(&name, "return", raw))
            .transpose()
            .inspect_err(|e| warn!("Cannot apply return check to {}: {}", name, e))?;

        debug!(
            "Decorated {} with {} parameter checks (return check: {})",
            name,
            table.iter().filter(|(_, s)| **s != TypeSpec::Ignore).count(),
            returns.is_some()
        );

        Ok(Checked {
            function,
            plan: Some(Arc::new(Plan {
                params,
                table,
                returns,
                reflection: self.reflection,
            })),
        })
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-decoration state shared by all calls
struct Plan {
    params: ResolvedParams,
    table: ParameterTable,
    returns: Option<TypeSpec>,
    reflection: Arc<dyn Reflection>,
}

/// A decorated function
#[derive(Clone)]
pub struct Checked {
    function: Function,
    plan: Option<Arc<Plan>>,
}

impl Checked {
    /// Forward every call unchanged
    pub fn passthrough(function: Function) -> Self {
        Self { function, plan: None }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn is_passthrough(&self) -> bool {
        self.plan.is_none()
    }

    pub fn parameter_table(&self) -> Option<&ParameterTable> {
        self.plan.as_ref().map(|plan| &plan.table)
    }

    pub fn return_spec(&self) -> Option<&TypeSpec> {
        self.plan.as_ref().and_then(|plan| plan.returns.as_ref())
    }

    /// Validate `args`, forward them to the wrapped function and validate
    /// its result.
    pub fn call(&self, args: &Arguments) -> Result<Value, Error> {
        let Some(plan) = &self.plan else {
            return self.function.call(args).map_err(Error::from_call);
        };
        let name = self.function.display_name();
        let reflection = plan.reflection.as_ref();

        let values = unify::unify(name, args, &plan.params)
            .inspect_err(|e| warn!("Cannot check call to {}: {}", name, e))?;
        evaluate::evaluate(&plan.table, &values, name, reflection)
            .inspect_err(|m| warn!("Rejected call to {}: {}", name, m))?;
        debug!("Arguments to {} passed type checks", name);

        let result = self.function.call(args).map_err(Error::from_call)?;
        if let Some(spec) = &plan.returns {
            evaluate::check_return(spec, &result, name, reflection)
                .inspect_err(|m| warn!("Rejected result of {}: {}", name, m))?;
        }
        Ok(result)
    }

    /// A host function with the same name and signature that performs the
    /// checked call, so it can be passed around as a value.
    pub fn into_function(self) -> Function {
        let name = self.function.name().to_string();
        let signature = self.function.signature().cloned();
        let checked = self;
        Function::forwarding(
            name,
            signature,
            Box::new(move |args: &Arguments| checked.call(args).map_err(anyhow::Error::from)),
        )
    }
}

impl std::fmt::Debug for Checked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checked")
            .field("function", &self.function)
            .field("table", &self.parameter_table())
            .field("returns", &self.return_spec())
            .finish()
    }
}
