//! Session: the persistent unit a REPL or script runner drives.
//!
//! Each top-level statement runs as a transaction. If it fails, the root
//! frame and the type registry go back to how they were before it started.

use crate::builtins::Output;
use crate::config::EvalConfig;
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::flow::Completion;
use crate::value::Value;
use zyra_types::ast::{Program, Stmt};

pub struct Session {
    eval: Evaluator,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            eval: Evaluator::with_config(config),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Execution
    // ══════════════════════════════════════════════════════════════════════

    /// Run one top-level statement against the persisted state.
    ///
    /// Gas is counted per statement. On error the globals and the registry
    /// are restored; output already written stays written.
    pub fn eval_statement(&mut self, stmt: &Stmt) -> EvalResult<Completion> {
        let globals = self.eval.globals().clone();
        let snapshot = globals.snapshot();
        let registry = self.eval.registry.clone();

        self.eval.reset_gas();
        match self.eval.exec_top_level(stmt) {
            Ok(completion) => Ok(completion),
            Err(err) => {
                tracing::warn!(kind = %err.kind(), error = %err, "statement rolled back");
                globals.restore(snapshot);
                self.eval.registry = registry;
                Err(err)
            }
        }
    }

    /// Run a whole program. A top-level `return` stops it early; the result
    /// is the returned value or the last statement's value.
    pub fn evaluate(&mut self, program: &Program) -> EvalResult<Value> {
        let mut last = Value::Null;
        for stmt in &program.stmts {
            match self.eval_statement(stmt)? {
                Completion::Normal(value) => last = value,
                Completion::Return(value) => {
                    tracing::debug!(value = %value, "program returned");
                    return Ok(value);
                }
            }
        }
        Ok(last)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Inspection
    // ══════════════════════════════════════════════════════════════════════

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.eval.globals().binding(name).map(|b| b.value)
    }

    /// Names bound at top level, built-ins included.
    pub fn global_names(&self) -> Vec<String> {
        self.eval.globals().local_names()
    }

    pub fn output(&self) -> &Output {
        self.eval.output()
    }

    pub fn take_output(&mut self) -> String {
        self.eval.take_output()
    }

    pub fn set_await_hook(&mut self, hook: impl FnMut(&Value) + 'static) {
        self.eval.set_await_hook(hook);
    }

    /// Direct access for hosts that register natives or inspect the registry.
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.eval
    }
}

/// Run `program` in a fresh session.
pub fn evaluate(program: &Program) -> EvalResult<Value> {
    Session::new().evaluate(program)
}
