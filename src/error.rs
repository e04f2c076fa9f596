//! Error Types
//!
//! `TypeCheckError` is a configuration problem in how checks were applied,
//! found before any value is inspected. `Mismatch` (a `TypeError`) is a
//! concrete value failing its declared check.

use crate::checker::Mismatch;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeCheck,
    Type,
    Resolution,
    Call,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("TypeCheckError: {0}")]
    TypeCheck(#[from] TypeCheckError),

    #[error("TypeError: {0}")]
    Type(#[from] Box<Mismatch>),

    #[error("ResolutionError: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The wrapped callable's own failure, forwarded unchanged
    #[error(transparent)]
    Call(#[from] anyhow::Error),
}

impl Error {
    /// Classify a failure raised by a called function. Failures of nested
    /// checked functions keep their original kind.
    pub fn from_call(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(err) => err,
            Err(err) => Error::Call(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeCheck(_) => ErrorKind::TypeCheck,
            Error::Type(_) => ErrorKind::Type,
            Error::Resolution(_) | Error::UnknownFunction(_) => ErrorKind::Resolution,
            Error::Call(_) => ErrorKind::Call,
        }
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Error::Type(mismatch) => Some(mismatch),
            _ => None,
        }
    }

    pub fn type_check(&self) -> Option<&TypeCheckError> {
        match self {
            Error::TypeCheck(err) => Some(err),
            _ => None,
        }
    }
}

/// Declared checks that cannot be reconciled with a function's parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeCheckError {
    #[error("The given kwarg {parameter} is not a parameter of function {function}")]
    UnknownParameter { function: String, parameter: String },

    #[error("The kwarg {parameter} of function {function} is already set by arg")]
    Collision { function: String, parameter: String },

    #[error("The parameter {parameter} of function {function} received no value and has no default")]
    MissingValue { function: String, parameter: String },

    #[error("The typecheck arg for {parameter} of function {function} is a function, not a type")]
    InvalidSpec { function: String, parameter: String },

    #[error("Cannot check all arguments given, not enough typecheck args given (parameter {parameter} of function {function})")]
    NotEnoughSpecs { function: String, parameter: String },
}

impl TypeCheckError {
    pub fn function(&self) -> &str {
        match self {
            TypeCheckError::UnknownParameter { function, .. }
            | TypeCheckError::Collision { function, .. }
            | TypeCheckError::MissingValue { function, .. }
            | TypeCheckError::InvalidSpec { function, .. }
            | TypeCheckError::NotEnoughSpecs { function, .. } => function,
        }
    }

    pub fn parameter(&self) -> &str {
        match self {
            TypeCheckError::UnknownParameter { parameter, .. }
            | TypeCheckError::Collision { parameter, .. }
            | TypeCheckError::MissingValue { parameter, .. }
            | TypeCheckError::InvalidSpec { parameter, .. }
            | TypeCheckError::NotEnoughSpecs { parameter, .. } => parameter,
        }
    }
}

/// A callable's parameter list could not be determined
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("function {function} has no introspectable signature")]
    NoSignature { function: String },

    #[error("malformed signature: {text}")]
    Malformed { text: String },

    #[error("invalid parameter name '{name}'")]
    InvalidName { name: String },

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },

    #[error("variadic parameter '{text}' is not supported")]
    Variadic { text: String },

    #[error("unsupported default value '{text}' for parameter '{name}'")]
    UnsupportedDefault { name: String, text: String },
}
