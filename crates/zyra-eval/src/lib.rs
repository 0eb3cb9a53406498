//! Zyra tree-walking evaluator.
//!
//! Executes Zyra programs directly from the AST in [`zyra_types::ast`]:
//! fixed-width integers with wraparound, structs with union groups, tagged
//! unions and enums, closures, pattern matching and try/catch/finally.
//!
//! ```text
//! Program → Session → Evaluator ─┬─ Frame (env)
//!                                ├─ TypeRegistry
//!                                └─ arith / pattern / builtins
//! ```

pub mod arith;
pub mod builtins;
pub mod config;
pub mod decimal;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod flow;
pub mod pattern;
pub mod registry;
pub mod session;
pub mod value;

pub use builtins::Output;
pub use config::EvalConfig;
pub use decimal::Decimal;
pub use env::{Binding, Frame};
pub use error::{ErrorKind, ErrorReport, EvalError, EvalResult};
pub use evaluator::{AwaitHook, Evaluator};
pub use flow::{Completion, Flow, Signal};
pub use registry::TypeRegistry;
pub use session::{evaluate, Session};
pub use value::Value;
