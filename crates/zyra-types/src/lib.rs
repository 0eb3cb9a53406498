//! Shared types for the Zyra runtime.
//!
//! This crate defines the AST node types consumed by the evaluator, source
//! spans, and the fixed-width integer type catalogue. Lexing and parsing live
//! outside the runtime; [`build`] lets hosts assemble trees directly.

mod int_type;
mod span;
pub mod ast;
pub mod build;

pub use int_type::{IntType, PLATFORM_BITS};
pub use span::Span;
