//! Non-local control flow.
//!
//! `return`, `break`, `continue` and thrown errors all unwind through the
//! `Err` side of [`Flow`], so `?` carries them up to the construct that
//! handles each one: calls stop `Return`, loops stop `Break`/`Continue`,
//! `try` stops catchable `Throw`s.

use crate::error::EvalError;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Break,
    Continue,
    Throw(EvalError),
}

pub type Flow<T> = Result<T, Signal>;

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Self {
        Signal::Throw(err)
    }
}

impl Signal {
    /// Turn a signal that escaped every handler into an error.
    pub fn into_error(self) -> EvalError {
        match self {
            Signal::Throw(err) => err,
            Signal::Break => EvalError::Runtime("'break' outside of a loop or switch".into()),
            Signal::Continue => EvalError::Runtime("'continue' outside of a loop".into()),
            Signal::Return(_) => EvalError::Runtime("'return' outside of a function".into()),
        }
    }
}

/// How a top-level statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal(Value),
    /// A top-level `return` ends the program with this value.
    Return(Value),
}

impl Completion {
    pub fn into_value(self) -> Value {
        match self {
            Completion::Normal(v) | Completion::Return(v) => v,
        }
    }
}
