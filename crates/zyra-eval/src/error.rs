//! Runtime error types for the Zyra evaluator.

use crate::value::{Member, StructValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Evaluation error. Every variant except [`EvalError::GasExhausted`] and
/// [`EvalError::StackOverflow`] travels as a catchable `throw`.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// A value does not fit a declared type, or an operator got operands it
    /// does not support.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("division by zero: {0}")]
    DivisionByZero(String),
    #[error("union field '{field}' of '{owner}' is not active (active field is '{active}')")]
    InactiveUnionField {
        owner: String,
        field: String,
        active: String,
    },
    #[error("'{type_name}' literal is missing field '{field}', which has no default")]
    MissingField { type_name: String, field: String },
    #[error("invalid union construction: {0}")]
    InvalidUnionConstruction(String),
    #[error("undefined name: {0}")]
    UndefinedName(String),
    #[error("cannot assign to immutable binding '{0}'")]
    ImmutableAssignment(String),
    #[error("no match arm accepts {0}")]
    NoMatch(String),
    /// Payload of an explicit `throw`.
    #[error("uncaught throw: {0}")]
    UserThrown(Value),
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),
    #[error("unknown member: {0}")]
    UnknownMember(String),
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("gas exhausted after {0} steps")]
    GasExhausted(u64),
    #[error("call depth limit of {0} exceeded")]
    StackOverflow(usize),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Fieldless classification of [`EvalError`], as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    TypeMismatch,
    DivisionByZero,
    InactiveUnionField,
    MissingField,
    InvalidUnionConstruction,
    UndefinedName,
    ImmutableAssignment,
    NoMatch,
    UserThrown,
    DuplicateDefinition,
    UnknownMember,
    ArityMismatch,
    IndexOutOfBounds,
    Runtime,
    GasExhausted,
    StackOverflow,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::DivisionByZero => "DivisionByZero",
            ErrorKind::InactiveUnionField => "InactiveUnionField",
            ErrorKind::MissingField => "MissingField",
            ErrorKind::InvalidUnionConstruction => "InvalidUnionConstruction",
            ErrorKind::UndefinedName => "UndefinedName",
            ErrorKind::ImmutableAssignment => "ImmutableAssignment",
            ErrorKind::NoMatch => "NoMatch",
            ErrorKind::UserThrown => "UserThrown",
            ErrorKind::DuplicateDefinition => "DuplicateDefinition",
            ErrorKind::UnknownMember => "UnknownMember",
            ErrorKind::ArityMismatch => "ArityMismatch",
            ErrorKind::IndexOutOfBounds => "IndexOutOfBounds",
            ErrorKind::Runtime => "Runtime",
            ErrorKind::GasExhausted => "GasExhausted",
            ErrorKind::StackOverflow => "StackOverflow",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch(_) => ErrorKind::TypeMismatch,
            Self::DivisionByZero(_) => ErrorKind::DivisionByZero,
            Self::InactiveUnionField { .. } => ErrorKind::InactiveUnionField,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::InvalidUnionConstruction(_) => ErrorKind::InvalidUnionConstruction,
            Self::UndefinedName(_) => ErrorKind::UndefinedName,
            Self::ImmutableAssignment(_) => ErrorKind::ImmutableAssignment,
            Self::NoMatch(_) => ErrorKind::NoMatch,
            Self::UserThrown(_) => ErrorKind::UserThrown,
            Self::DuplicateDefinition(_) => ErrorKind::DuplicateDefinition,
            Self::UnknownMember(_) => ErrorKind::UnknownMember,
            Self::ArityMismatch(_) => ErrorKind::ArityMismatch,
            Self::IndexOutOfBounds(_) => ErrorKind::IndexOutOfBounds,
            Self::Runtime(_) => ErrorKind::Runtime,
            Self::GasExhausted(_) => ErrorKind::GasExhausted,
            Self::StackOverflow(_) => ErrorKind::StackOverflow,
        }
    }

    /// Resource-limit errors end the top-level statement; `catch` never sees them.
    pub fn is_catchable(&self) -> bool {
        !matches!(self, Self::GasExhausted(_) | Self::StackOverflow(_))
    }

    /// The value a `catch` clause binds.
    ///
    /// User payloads are bound unchanged. Built-in errors become a struct
    /// value named after their kind with `kind` and `message` fields.
    pub fn payload(&self) -> Value {
        match self {
            Self::UserThrown(value) => value.clone(),
            other => {
                let kind = other.kind().name();
                Value::Struct(StructValue {
                    type_name: kind.to_string(),
                    members: vec![
                        Member::Field("kind".into(), Value::String(kind.to_string())),
                        Member::Field("message".into(), Value::String(other.to_string())),
                    ],
                })
            }
        }
    }

    /// Whether `catch (<filter> e)` accepts this error.
    ///
    /// `Error` accepts every catchable error; a kind name accepts that kind;
    /// for user payloads the filter is compared with the payload's type name.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter == "Error" || filter == self.kind().name() {
            return true;
        }
        match self {
            Self::UserThrown(value) => value.type_name() == filter,
            _ => false,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            payload: match self {
                Self::UserThrown(value) => Some(value.to_string()),
                _ => None,
            },
        }
    }
}

/// What the host receives for an uncaught error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    /// Display form of a user payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl ErrorReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_payload_is_struct_named_after_kind() {
        let err = EvalError::DivisionByZero("10 / 0".into());
        match err.payload() {
            Value::Struct(s) => {
                assert_eq!(s.type_name, "DivisionByZero");
                assert_eq!(
                    s.field("kind"),
                    Some(&Value::String("DivisionByZero".into()))
                );
            }
            other => panic!("expected struct payload, got {other:?}"),
        }
    }

    #[test]
    fn test_user_payload_is_unchanged() {
        let err = EvalError::UserThrown(Value::String("x".into()));
        assert_eq!(err.payload(), Value::String("x".into()));
    }

    #[test]
    fn test_filters() {
        let thrown = EvalError::UserThrown(Value::String("x".into()));
        assert!(thrown.matches_filter("string"));
        assert!(thrown.matches_filter("UserThrown"));
        assert!(thrown.matches_filter("Error"));
        assert!(!thrown.matches_filter("DivisionByZero"));

        let div = EvalError::DivisionByZero("1 / 0".into());
        assert!(div.matches_filter("DivisionByZero"));
        assert!(!div.matches_filter("string"));
    }

    #[test]
    fn test_limits_are_not_catchable() {
        assert!(!EvalError::GasExhausted(10).is_catchable());
        assert!(!EvalError::StackOverflow(4).is_catchable());
        assert!(EvalError::NoMatch("5".into()).is_catchable());
    }

    #[test]
    fn test_report_json() {
        let report = EvalError::UserThrown(Value::String("boom".into())).report();
        let json = report.to_json().unwrap();
        assert!(json.contains(r#""kind":"UserThrown""#));
        assert!(json.contains(r#""payload":"boom""#));

        let report = EvalError::UndefinedName("x".into()).report();
        let json = report.to_json().unwrap();
        assert!(!json.contains("payload"));
        let back: ErrorReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
