//! Core statement and expression evaluator.

use crate::arith;
use crate::builtins::{self, Output};
use crate::config::EvalConfig;
use crate::env::{Binding, Frame};
use crate::error::{EvalError, EvalResult};
use crate::flow::{Completion, Flow, Signal};
use crate::pattern::match_pattern;
use crate::registry::{FieldContext, TypeRegistry};
use crate::value::{
    dict_get, dict_insert, set_insert, ActiveField, Closure, NativeFn, RangeValue, Value,
};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use std::rc::Rc;
use zyra_types::ast::*;
use zyra_types::IntType;

/// Below this much remaining native stack, recursion moves to a fresh segment.
const RED_ZONE: usize = 128 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Called with the operand of every `await`.
pub type AwaitHook = Box<dyn FnMut(&Value)>;

/// One step of an assignment target path: `a.b[2].c`.
#[derive(Debug, Clone)]
enum PathSeg {
    Field(String),
    Index(Value),
}

/// The evaluator: walks statements and expressions against a frame chain.
pub struct Evaluator {
    /// User-defined types. Shared by every scope.
    pub registry: TypeRegistry,
    globals: Frame,
    output: Output,
    config: EvalConfig,
    /// Steps used by the current top-level statement.
    gas: u64,
    /// Active user-function calls.
    depth: usize,
    await_hook: Option<AwaitHook>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        let globals = Frame::root();
        builtins::install(&globals);
        Self {
            registry: TypeRegistry::new(),
            globals,
            output: Output::new(config.echo_output),
            config,
            gas: 0,
            depth: 0,
            await_hook: None,
        }
    }

    /// The root frame; top-level statements bind here.
    pub fn globals(&self) -> &Frame {
        &self.globals
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        self.output.take()
    }

    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    pub fn reset_gas(&mut self) {
        self.gas = 0;
    }

    pub fn set_await_hook(&mut self, hook: impl FnMut(&Value) + 'static) {
        self.await_hook = Some(Box::new(hook));
    }

    /// Bind a host function in the root frame, replacing any existing binding.
    pub fn define_native(
        &mut self,
        name: &str,
        func: impl Fn(&mut Output, Vec<Value>) -> EvalResult<Value> + 'static,
    ) {
        let native = NativeFn::new(name, func);
        self.globals
            .insert(name, Binding::new(Value::Native(native), false, None));
    }

    /// Consume one unit of gas.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.config.gas_limit {
            Err(EvalError::GasExhausted(self.config.gas_limit))
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    /// Run one top-level statement in the root frame.
    pub fn exec_top_level(&mut self, stmt: &Stmt) -> EvalResult<Completion> {
        let globals = self.globals.clone();
        match self.exec_stmt(stmt, &globals) {
            Ok(value) => Ok(Completion::Normal(value)),
            Err(Signal::Return(value)) => Ok(Completion::Return(value)),
            Err(signal) => Err(signal.into_error()),
        }
    }

    /// Run a block in a fresh child frame; its value is the last statement's.
    pub fn exec_block(&mut self, block: &Block, env: &Frame) -> Flow<Value> {
        let scope = env.child();
        self.exec_stmts(&block.stmts, &scope)
    }

    fn exec_stmts(&mut self, stmts: &[Stmt], env: &Frame) -> Flow<Value> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = self.exec_stmt(stmt, env)?;
        }
        Ok(last)
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, env: &Frame) -> Flow<Value> {
        stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.exec_stmt_inner(stmt, env))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, env: &Frame) -> Flow<Value> {
        self.tick()?;
        match stmt {
            Stmt::Var(decl) => self.exec_var(decl, env),
            Stmt::Destructure(decl) => {
                let value = self.eval_expr(&decl.value, env)?;
                self.bind_pattern(&decl.pattern, value, env, decl.kind.is_mutable())?;
                Ok(Value::Null)
            }
            Stmt::Function(decl) => {
                let closure = Closure {
                    name: Some(decl.name.name.clone()),
                    params: decl.params.clone(),
                    return_type: decl.return_type.clone(),
                    body: LambdaBody::Block(decl.body.clone()),
                    env: env.clone(),
                    is_async: decl.is_async,
                };
                env.define(
                    &decl.name.name,
                    Value::Function(Rc::new(closure)),
                    false,
                    None,
                )?;
                Ok(Value::Null)
            }
            Stmt::Struct(decl) => {
                self.registry.define_struct(decl, env)?;
                Ok(Value::Null)
            }
            Stmt::Union(decl) => {
                self.registry.define_union(decl, env)?;
                Ok(Value::Null)
            }
            Stmt::Enum(decl) => {
                self.registry.define_enum(decl, env)?;
                Ok(Value::Null)
            }
            Stmt::TypeAlias(decl) => {
                self.registry.define_alias(decl)?;
                Ok(Value::Null)
            }
            Stmt::If(if_stmt) => self.exec_if(if_stmt, env),
            Stmt::While(w) => self.exec_while(w, env),
            Stmt::For(f) => self.exec_for(f, env),
            Stmt::ForIn(f) => self.exec_for_in(f, env),
            Stmt::Switch(s) => self.exec_switch(s, env),
            Stmt::Match(m) => self.eval_match(m, env),
            Stmt::Try(t) => self.exec_try(t, env),
            Stmt::Throw(t) => {
                let payload = self.eval_expr(&t.value, env)?;
                tracing::debug!(payload = %payload, "throw");
                Err(Signal::Throw(EvalError::UserThrown(payload)))
            }
            Stmt::Return(r) => {
                let value = match &r.value {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }
            Stmt::Break(_) => Err(Signal::Break),
            Stmt::Continue(_) => Err(Signal::Continue),
            Stmt::Block(block) => self.exec_block(block, env),
            Stmt::Expr(e) => self.eval_expr(&e.expr, env),
        }
    }

    fn exec_var(&mut self, decl: &VarDecl, env: &Frame) -> Flow<Value> {
        let value = self.eval_expr(&decl.value, env)?;
        let value = match &decl.type_ann {
            Some(ty) => self.registry.coerce(ty, value)?,
            None => value,
        };
        env.define(
            &decl.name.name,
            value,
            decl.kind.is_mutable(),
            decl.type_ann.clone(),
        )?;
        Ok(Value::Null)
    }

    /// Destructure `value` into new bindings in `env`.
    fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        value: Value,
        env: &Frame,
        mutable: bool,
    ) -> EvalResult<()> {
        let mut bindings = Vec::new();
        if !match_pattern(pattern, &value, &mut bindings)? {
            return Err(EvalError::NoMatch(format!(
                "destructuring pattern does not accept {value}"
            )));
        }
        for (name, v) in bindings {
            env.define(&name, v, mutable, None)?;
        }
        Ok(())
    }

    // ── Control Flow ─────────────────────────────────────────────────────

    fn exec_if(&mut self, if_stmt: &IfStmt, env: &Frame) -> Flow<Value> {
        if self.eval_expr(&if_stmt.condition, env)?.is_truthy() {
            return self.exec_block(&if_stmt.then_block, env);
        }
        match &if_stmt.else_branch {
            Some(ElseBranch::ElseIf(next)) => self.exec_if(next, env),
            Some(ElseBranch::Block(block)) => self.exec_block(block, env),
            None => Ok(Value::Null),
        }
    }

    /// Run one loop iteration. `Ok(false)` means the loop must stop.
    fn run_loop_body(&mut self, body: &Block, env: &Frame) -> Flow<bool> {
        match self.exec_block(body, env) {
            Ok(_) | Err(Signal::Continue) => Ok(true),
            Err(Signal::Break) => Ok(false),
            Err(other) => Err(other),
        }
    }

    fn exec_while(&mut self, w: &WhileStmt, env: &Frame) -> Flow<Value> {
        loop {
            self.tick()?;
            if !self.eval_expr(&w.condition, env)?.is_truthy() {
                break;
            }
            if !self.run_loop_body(&w.body, env)? {
                break;
            }
        }
        Ok(Value::Null)
    }

    fn exec_for(&mut self, f: &ForStmt, env: &Frame) -> Flow<Value> {
        let scope = env.child();
        if let Some(init) = &f.init {
            self.exec_stmt(init, &scope)?;
        }
        loop {
            self.tick()?;
            if let Some(cond) = &f.condition {
                if !self.eval_expr(cond, &scope)?.is_truthy() {
                    break;
                }
            }
            if !self.run_loop_body(&f.body, &scope)? {
                break;
            }
            if let Some(update) = &f.update {
                self.eval_expr(update, &scope)?;
            }
        }
        Ok(Value::Null)
    }

    fn exec_for_in(&mut self, f: &ForInStmt, env: &Frame) -> Flow<Value> {
        let iterable = self.eval_expr(&f.iterable, env)?;
        for item in iterate(&iterable)? {
            self.tick()?;
            let scope = env.child();
            self.bind_pattern(&f.item, item, &scope, true)?;
            if !self.run_loop_body(&f.body, &scope)? {
                break;
            }
        }
        Ok(Value::Null)
    }

    /// Labels are compared with `==`; no fall-through. `break` leaves the switch.
    fn exec_switch(&mut self, s: &SwitchStmt, env: &Frame) -> Flow<Value> {
        let subject = self.eval_expr(&s.subject, env)?;
        let mut chosen = None;
        'cases: for case in &s.cases {
            for label in &case.labels {
                if self.eval_expr(label, env)? == subject {
                    chosen = Some(&case.body);
                    break 'cases;
                }
            }
        }
        match chosen.or(s.default.as_ref()) {
            Some(body) => match self.exec_block(body, env) {
                Err(Signal::Break) => Ok(Value::Null),
                other => other,
            },
            None => Ok(Value::Null),
        }
    }

    /// `try`/`catch`/`finally`.
    ///
    /// The first catch whose filter accepts a catchable error handles it.
    /// `finally` always runs; if it ends with its own signal, that signal
    /// replaces the pending outcome.
    fn exec_try(&mut self, t: &TryStmt, env: &Frame) -> Flow<Value> {
        let outcome = match self.exec_block(&t.body, env) {
            Err(Signal::Throw(err)) if err.is_catchable() => self.handle_error(t, err, env),
            other => other,
        };
        match &t.finally {
            Some(finally) => {
                self.exec_block(finally, env)?;
                outcome
            }
            None => outcome,
        }
    }

    fn handle_error(&mut self, t: &TryStmt, err: EvalError, env: &Frame) -> Flow<Value> {
        let clause = t.catches.iter().find(|c| {
            c.type_filter
                .as_ref()
                .map_or(true, |filter| err.matches_filter(&filter.name))
        });
        let Some(clause) = clause else {
            return Err(Signal::Throw(err));
        };
        tracing::debug!(kind = %err.kind(), "caught error");
        let scope = env.child();
        if let Some(binding) = &clause.binding {
            scope.define(&binding.name, err.payload(), true, None)?;
        }
        self.exec_stmts(&clause.body.stmts, &scope)
    }

    /// `match` as statement or expression. Arms are tried in order; the
    /// first whose pattern matches and whose guard holds is taken.
    fn eval_match(&mut self, m: &MatchExpr, env: &Frame) -> Flow<Value> {
        let subject = self.eval_expr(&m.subject, env)?;
        for arm in &m.arms {
            let mut bindings = Vec::new();
            if !match_pattern(&arm.pattern, &subject, &mut bindings)? {
                continue;
            }
            let scope = env.child();
            for (name, value) in bindings {
                scope.define(&name, value, true, None)?;
            }
            if let Some(guard) = &arm.guard {
                if !self.eval_expr(guard, &scope)?.is_truthy() {
                    continue;
                }
            }
            return match &arm.body {
                ArmBody::Expr(e) => self.eval_expr(e, &scope),
                ArmBody::Block(block) => self.exec_stmts(&block.stmts, &scope),
            };
        }
        Err(EvalError::NoMatch(subject.to_string()).into())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr, env: &Frame) -> Flow<Value> {
        stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &Frame) -> Flow<Value> {
        self.tick()?;
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(Value::from_literal(lit)?),
            ExprKind::Interpolation(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        StringPart::Literal(s) => text.push_str(s),
                        StringPart::Expr(e) => text.push_str(&self.eval_expr(e, env)?.to_string()),
                    }
                }
                Ok(Value::String(text))
            }
            ExprKind::ArrayLit(items) => Ok(Value::Array(self.eval_list(items, env)?)),
            ExprKind::TupleLit(items) => Ok(Value::Tuple(self.eval_list(items, env)?)),
            ExprKind::SetLit(items) => {
                let mut set = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.eval_expr(item, env)?;
                    set_insert(&mut set, value);
                }
                Ok(Value::Set(set))
            }
            ExprKind::DictLit(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let key = self.eval_expr(k, env)?;
                    let value = self.eval_expr(v, env)?;
                    dict_insert(&mut entries, key, value);
                }
                Ok(Value::Dict(entries))
            }
            ExprKind::RangeLit {
                start,
                end,
                inclusive,
            } => {
                let start = self.eval_expr(start, env)?;
                let end = self.eval_expr(end, env)?;
                Ok(make_range(&start, &end, *inclusive)?)
            }
            ExprKind::StructLit { name, fields } => {
                let entry = self.registry.get(&name.name)?;
                let mut supplied = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.eval_expr(&field.value, env)?;
                    supplied.push((field.name.name.clone(), value));
                }
                Ok(entry.construct(supplied, self)?)
            }
            ExprKind::VariantLit {
                enum_name,
                variant,
                args,
            } => {
                let entry = self.registry.get(&enum_name.name)?;
                let args = self.eval_list(args, env)?;
                Ok(entry.construct_variant(&variant.name, args, &*self)?)
            }

            ExprKind::Identifier(name) => Ok(env.lookup(name)?),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, env),
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                Ok(index_value(&object, &index)?)
            }
            ExprKind::Member { object, field } => {
                let object = self.eval_expr(object, env)?;
                Ok(self.member_value(&object, &field.name)?)
            }
            ExprKind::Assign { target, op, value } => self.eval_assign(target, *op, value, env),

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, env),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                Ok(arith::unary(*op, &value)?)
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    self.eval_expr(then_expr, env)
                } else {
                    self.eval_expr(else_expr, env)
                }
            }

            ExprKind::Lambda(lambda) => Ok(Value::Function(Rc::new(Closure {
                name: None,
                params: lambda.params.clone(),
                return_type: None,
                body: lambda.body.clone(),
                env: env.clone(),
                is_async: false,
            }))),
            ExprKind::Match(m) => self.eval_match(m, env),
            ExprKind::Await(inner) => {
                let value = self.eval_expr(inner, env)?;
                tracing::trace!(value = %value, "await");
                if let Some(hook) = self.await_hook.as_mut() {
                    hook(&value);
                }
                Ok(value)
            }
        }
    }

    fn eval_list(&mut self, items: &[Expr], env: &Frame) -> Flow<Vec<Value>> {
        items.iter().map(|e| self.eval_expr(e, env)).collect()
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr, env: &Frame) -> Flow<Value> {
        // Short-circuit for logical operators
        if op == BinOp::And {
            let lv = self.eval_expr(left, env)?;
            if !lv.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(self.eval_expr(right, env)?.is_truthy()));
        }
        if op == BinOp::Or {
            let lv = self.eval_expr(left, env)?;
            if lv.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(self.eval_expr(right, env)?.is_truthy()));
        }

        let lv = self.eval_expr(left, env)?;
        let rv = self.eval_expr(right, env)?;
        let lv = adopt_literal_type(op, left, lv, &rv);
        let rv = adopt_literal_type(op, right, rv, &lv);
        Ok(self.apply_binary(op, &lv, &rv)?)
    }

    fn apply_binary(&self, op: BinOp, lv: &Value, rv: &Value) -> EvalResult<Value> {
        match op {
            BinOp::Eq => Ok(Value::Bool(lv == rv)),
            BinOp::NotEq => Ok(Value::Bool(lv != rv)),
            BinOp::And => Ok(Value::Bool(lv.is_truthy() && rv.is_truthy())),
            BinOp::Or => Ok(Value::Bool(lv.is_truthy() || rv.is_truthy())),
            BinOp::Xor => Ok(Value::Bool(lv.is_truthy() != rv.is_truthy())),
            _ => arith::binary(op, lv, rv, self.config.decimal_precision),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Frame) -> Flow<Value> {
        if let ExprKind::Member { object, field } = &callee.kind {
            let receiver = self.eval_expr(object, env)?;
            if let Some(method) = self.find_method(&receiver, &field.name) {
                let args = self.eval_list(args, env)?;
                return Ok(self.call_closure(&method, args, Some(receiver))?);
            }
            let func = self.member_value(&receiver, &field.name)?;
            let args = self.eval_list(args, env)?;
            return Ok(self.call_function(&func, args)?);
        }
        let func = self.eval_expr(callee, env)?;
        let args = self.eval_list(args, env)?;
        Ok(self.call_function(&func, args)?)
    }

    fn find_method(&self, receiver: &Value, name: &str) -> Option<Rc<Closure>> {
        match receiver {
            Value::Struct(s) => self.registry.get(&s.type_name).ok()?.method(name),
            _ => None,
        }
    }

    /// Call a function value with already-evaluated arguments.
    pub fn call_function(&mut self, func: &Value, args: Vec<Value>) -> EvalResult<Value> {
        match func {
            Value::Function(closure) => self.call_closure(closure, args, None),
            Value::Native(native) => (native.func)(&mut self.output, args),
            other => Err(EvalError::TypeMismatch(format!(
                "{} is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> EvalResult<Value> {
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::StackOverflow(self.config.max_call_depth));
        }
        self.depth += 1;
        let result = self.invoke(closure, args, receiver);
        self.depth -= 1;
        result
    }

    fn invoke(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> EvalResult<Value> {
        let name = closure.display_name();
        tracing::trace!(function = name, args = args.len(), depth = self.depth, "call");
        if args.len() > closure.params.len() {
            return Err(EvalError::ArityMismatch(format!(
                "{name}() takes at most {} argument(s), got {}",
                closure.params.len(),
                args.len()
            )));
        }

        let frame = closure.env.child();
        if let Some(receiver) = receiver {
            frame.define("self", receiver, true, None)?;
        }
        let mut args = args.into_iter();
        for param in &closure.params {
            let value = match (args.next(), &param.default) {
                (Some(v), _) => v,
                (None, Some(default)) => self
                    .eval_expr(default, &frame)
                    .map_err(Signal::into_error)?,
                (None, None) => {
                    return Err(EvalError::ArityMismatch(format!(
                        "{name}() is missing argument '{}'",
                        param.name.name
                    )))
                }
            };
            let value = match &param.type_ann {
                Some(ty) => self.registry.coerce(ty, value)?,
                None => value,
            };
            frame.define(&param.name.name, value, true, param.type_ann.clone())?;
        }

        let result = match &closure.body {
            LambdaBody::Expr(e) => self.eval_expr(e, &frame),
            LambdaBody::Block(block) => self.exec_block(block, &frame).map(|_| Value::Null),
        };
        let value = match result {
            Ok(v) | Err(Signal::Return(v)) => v,
            Err(signal) => return Err(signal.into_error()),
        };
        match &closure.return_type {
            Some(ty) => self.registry.coerce(ty, value),
            None => Ok(value),
        }
    }

    // ── Member access ────────────────────────────────────────────────────

    fn member_value(&self, object: &Value, field: &str) -> EvalResult<Value> {
        match object {
            Value::Struct(s) => s.get(field),
            Value::Union(u) => {
                if u.active.name == field {
                    return Ok((*u.active.value).clone());
                }
                let declared = self
                    .registry
                    .get(&u.type_name)
                    .map(|entry| entry.field(field).is_some())
                    .unwrap_or(false);
                if declared {
                    Err(EvalError::InactiveUnionField {
                        owner: u.type_name.clone(),
                        field: field.to_string(),
                        active: u.active.name.clone(),
                    })
                } else {
                    Err(EvalError::UnknownMember(format!(
                        "union '{}' has no field '{field}'",
                        u.type_name
                    )))
                }
            }
            Value::Tuple(items) => {
                let position = tuple_position(field, items.len())?;
                Ok(items[position].clone())
            }
            other => Err(EvalError::TypeMismatch(format!(
                "{} has no member '{field}'",
                other.type_name()
            ))),
        }
    }

    // ── Assignment ───────────────────────────────────────────────────────

    /// `target = value` / `target op= value`.
    ///
    /// Aggregates are values, so assigning into `a.b[i]` rebuilds the path
    /// from the root binding and stores the new root.
    fn eval_assign(
        &mut self,
        target: &Expr,
        op: Option<BinOp>,
        value: &Expr,
        env: &Frame,
    ) -> Flow<Value> {
        let (root, path) = self.resolve_place(target, env)?;
        let mut rhs = self.eval_expr(value, env)?;
        if let Some(op) = op {
            let current = self.read_place(&root, &path, env)?;
            let rhs_typed = adopt_literal_type(op, value, rhs, &current);
            rhs = self.apply_binary(op, &current, &rhs_typed)?;
        }

        if path.is_empty() {
            env.assign(&root, rhs, |ty, v| self.registry.coerce(ty, v))?;
            return Ok(env.lookup(&root)?);
        }
        let current = env.lookup(&root)?;
        let updated = self.store(current, &path, rhs.clone())?;
        env.assign(&root, updated, |ty, v| self.registry.coerce(ty, v))?;
        Ok(rhs)
    }

    fn resolve_place(&mut self, target: &Expr, env: &Frame) -> Flow<(String, Vec<PathSeg>)> {
        match &target.kind {
            ExprKind::Identifier(name) => Ok((name.clone(), Vec::new())),
            ExprKind::Member { object, field } => {
                let (root, mut path) = self.resolve_place(object, env)?;
                path.push(PathSeg::Field(field.name.clone()));
                Ok((root, path))
            }
            ExprKind::Index { object, index } => {
                let (root, mut path) = self.resolve_place(object, env)?;
                let key = self.eval_expr(index, env)?;
                path.push(PathSeg::Index(key));
                Ok((root, path))
            }
            _ => Err(EvalError::Runtime("invalid assignment target".into()).into()),
        }
    }

    fn read_place(&self, root: &str, path: &[PathSeg], env: &Frame) -> EvalResult<Value> {
        let mut value = env.lookup(root)?;
        for seg in path {
            value = match seg {
                PathSeg::Field(name) => self.member_value(&value, name)?,
                PathSeg::Index(key) => index_value(&value, key)?,
            };
        }
        Ok(value)
    }

    /// Return `current` with `value` stored at `path`.
    fn store(&self, current: Value, path: &[PathSeg], value: Value) -> EvalResult<Value> {
        let Some((seg, rest)) = path.split_first() else {
            return Ok(value);
        };
        match (seg, current) {
            (PathSeg::Field(name), Value::Struct(mut s)) => {
                let new_value = if rest.is_empty() {
                    self.coerce_field(&s.type_name, name, value)?
                } else {
                    self.store(s.get(name)?, rest, value)?
                };
                s.set(name, new_value)?;
                Ok(Value::Struct(s))
            }
            (PathSeg::Field(name), Value::Union(mut u)) => {
                if rest.is_empty() {
                    let declared = self
                        .registry
                        .get(&u.type_name)?
                        .field(name)
                        .is_some();
                    if !declared {
                        return Err(EvalError::UnknownMember(format!(
                            "union '{}' has no field '{name}'",
                            u.type_name
                        )));
                    }
                    let new_value = self.coerce_field(&u.type_name, name, value)?;
                    u.active = ActiveField::new(name.clone(), new_value);
                } else {
                    if u.active.name != *name {
                        return Err(EvalError::InactiveUnionField {
                            owner: u.type_name.clone(),
                            field: name.clone(),
                            active: u.active.name.clone(),
                        });
                    }
                    let inner = std::mem::replace(u.active.value.as_mut(), Value::Null);
                    *u.active.value = self.store(inner, rest, value)?;
                }
                Ok(Value::Union(u))
            }
            (PathSeg::Field(name), Value::Tuple(mut items)) => {
                let i = tuple_position(name, items.len())?;
                let old = std::mem::replace(&mut items[i], Value::Null);
                items[i] = self.store(old, rest, value)?;
                Ok(Value::Tuple(items))
            }
            (PathSeg::Index(key), Value::Array(mut items)) => {
                let i = resolve_index(key, items.len())?;
                let old = std::mem::replace(&mut items[i], Value::Null);
                items[i] = self.store(old, rest, value)?;
                Ok(Value::Array(items))
            }
            (PathSeg::Index(key), Value::Dict(mut entries)) => {
                let new_value = if rest.is_empty() {
                    value
                } else {
                    let inner = dict_get(&entries, key).cloned().ok_or_else(|| {
                        EvalError::IndexOutOfBounds(format!("key {key} not found"))
                    })?;
                    self.store(inner, rest, value)?
                };
                dict_insert(&mut entries, key.clone(), new_value);
                Ok(Value::Dict(entries))
            }
            (seg, other) => Err(EvalError::TypeMismatch(format!(
                "cannot assign {} of {}",
                match seg {
                    PathSeg::Field(name) => format!("field '{name}'"),
                    PathSeg::Index(key) => format!("index {key}"),
                },
                other.type_name()
            ))),
        }
    }

    fn coerce_field(&self, type_name: &str, field: &str, value: Value) -> EvalResult<Value> {
        let declared = self
            .registry
            .get(type_name)
            .ok()
            .and_then(|entry| entry.field(field).and_then(|f| f.type_ann.clone()));
        match declared {
            Some(ty) => self.registry.coerce(&ty, value),
            None => Ok(value),
        }
    }
}

impl FieldContext for Evaluator {
    fn eval_default(&mut self, default: &Expr, scope: &Frame) -> EvalResult<Value> {
        self.eval_expr(default, scope).map_err(Signal::into_error)
    }

    fn coerce(&self, ty: &TypeAnnotation, value: Value) -> EvalResult<Value> {
        self.registry.coerce(ty, value)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn is_untyped_int(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(_)) => true,
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => is_untyped_int(operand),
        _ => false,
    }
}

/// An unsuffixed integer literal takes the fixed-width type of the other
/// operand when its value fits, so `x + 1` stays in `x`'s type. A literal
/// outside that range stays `int64` and promotion decides. Shift counts and
/// exponents are never retyped.
fn adopt_literal_type(op: BinOp, expr: &Expr, value: Value, other: &Value) -> Value {
    if matches!(op, BinOp::Shl | BinOp::Shr | BinOp::Pow) {
        return value;
    }
    match (value, other) {
        (Value::Int(n, IntType::I64), Value::Int(_, ty))
            if is_untyped_int(expr) && ty.contains(&n) =>
        {
            Value::Int(n, *ty)
        }
        (value, _) => value,
    }
}

fn make_range(start: &Value, end: &Value, inclusive: bool) -> EvalResult<Value> {
    let (Some(lo), Some(hi)) = (start.as_integer(), end.as_integer()) else {
        return Err(EvalError::TypeMismatch(format!(
            "range bounds must be integers, got {} and {}",
            start.type_name(),
            end.type_name()
        )));
    };
    let ty = match (start, end) {
        (Value::Int(_, a), Value::Int(_, b)) => Some(arith::promote(*a, *b, BinOp::Add)),
        _ => None,
    };
    Ok(Value::Range(RangeValue {
        start: lo.clone(),
        end: hi.clone(),
        inclusive,
        ty,
    }))
}

fn tuple_position(field: &str, len: usize) -> EvalResult<usize> {
    let position: usize = field
        .parse()
        .map_err(|_| EvalError::UnknownMember(format!("tuple has no member '{field}'")))?;
    if position >= len {
        return Err(EvalError::IndexOutOfBounds(format!(
            "tuple position {position} out of range for length {len}"
        )));
    }
    Ok(position)
}

/// Element position for `index`; negative indices count from the end.
fn resolve_index(index: &Value, len: usize) -> EvalResult<usize> {
    let n = index.as_integer().ok_or_else(|| {
        EvalError::TypeMismatch(format!("index must be an integer, got {}", index.type_name()))
    })?;
    let len_big = BigInt::from(len);
    let position = if n.is_negative() { n + &len_big } else { n.clone() };
    if position.is_negative() || position >= len_big {
        return Err(EvalError::IndexOutOfBounds(format!(
            "index {n} out of range for length {len}"
        )));
    }
    position
        .to_usize()
        .ok_or_else(|| EvalError::IndexOutOfBounds(format!("index {n} out of range")))
}

/// Half-open element bounds for slicing by `range`, clamped to `len`.
fn slice_bounds(range: &RangeValue, len: usize) -> (usize, usize) {
    let len_big = BigInt::from(len);
    let normalize = |n: &BigInt| if n.is_negative() { n + &len_big } else { n.clone() };
    let clamp = |n: BigInt| -> usize {
        if n.is_negative() {
            0
        } else {
            n.to_usize().map_or(len, |n| n.min(len))
        }
    };
    let start = clamp(normalize(&range.start));
    let end = normalize(&range.end);
    let stop = clamp(if range.inclusive { end + 1 } else { end });
    (start, stop.max(start))
}

fn index_value(object: &Value, index: &Value) -> EvalResult<Value> {
    match (object, index) {
        (Value::Array(items), Value::Range(r)) => {
            let (start, stop) = slice_bounds(r, items.len());
            Ok(Value::Array(items[start..stop].to_vec()))
        }
        (Value::Tuple(items), Value::Range(r)) => {
            let (start, stop) = slice_bounds(r, items.len());
            Ok(Value::Tuple(items[start..stop].to_vec()))
        }
        (Value::Array(items) | Value::Tuple(items), _) => {
            Ok(items[resolve_index(index, items.len())?].clone())
        }
        (Value::String(s), Value::Range(r)) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, stop) = slice_bounds(r, chars.len());
            Ok(Value::String(chars[start..stop].iter().collect()))
        }
        (Value::String(s), _) => {
            let len = s.chars().count();
            let position = resolve_index(index, len)?;
            s.chars()
                .nth(position)
                .map(Value::Char)
                .ok_or_else(|| EvalError::IndexOutOfBounds(format!("index {index} out of range")))
        }
        (Value::Dict(entries), key) => dict_get(entries, key)
            .cloned()
            .ok_or_else(|| EvalError::IndexOutOfBounds(format!("key {key} not found"))),
        (Value::Range(r), _) => {
            let len = r.len().to_usize().unwrap_or(usize::MAX);
            let position = resolve_index(index, len)?;
            Ok(r.element(&r.start + position))
        }
        (other, _) => Err(EvalError::TypeMismatch(format!(
            "{} cannot be indexed",
            other.type_name()
        ))),
    }
}

/// Items visited by `for x in value`. Dicts yield their keys; strings
/// yield chars; ranges are produced lazily.
fn iterate(value: &Value) -> EvalResult<Box<dyn Iterator<Item = Value>>> {
    match value {
        Value::Array(items) | Value::Tuple(items) | Value::Set(items) => {
            Ok(Box::new(items.clone().into_iter()))
        }
        Value::Dict(entries) => Ok(Box::new(
            entries
                .iter()
                .map(|(k, _)| k.clone())
                .collect::<Vec<_>>()
                .into_iter(),
        )),
        Value::String(s) => Ok(Box::new(
            s.chars().map(Value::Char).collect::<Vec<_>>().into_iter(),
        )),
        Value::Range(r) => Ok(Box::new(RangeIter {
            next: r.start.clone(),
            stop: r.stop(),
            range: r.clone(),
        })),
        other => Err(EvalError::TypeMismatch(format!(
            "cannot iterate over {}",
            other.type_name()
        ))),
    }
}

struct RangeIter {
    next: BigInt,
    stop: BigInt,
    range: RangeValue,
}

impl Iterator for RangeIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.next >= self.stop {
            return None;
        }
        let item = self.range.element(self.next.clone());
        self.next += 1u32;
        Some(item)
    }
}
