//! Terse constructors for assembling ASTs without a parser.
//!
//! Hosts that embed the runtime (and the test suites) build trees with these
//! helpers. Every node gets [`Span::SYNTHETIC`].
//!
//! ```
//! use zyra_types::ast::BinOp;
//! use zyra_types::build::*;
//!
//! // dec x = 1 + 2
//! let stmt = dec("x", binary(int(1), BinOp::Add, int(2)));
//! # let _ = stmt;
//! ```

use crate::ast::*;
use crate::{IntType, Span};
use num_bigint::BigInt;

const S: Span = Span::SYNTHETIC;

fn boxed(e: Expr) -> Box<Expr> {
    Box::new(e)
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, S)
}

pub fn ident(name: &str) -> Ident {
    Ident::new(name, S)
}

pub fn program(stmts: Vec<Stmt>) -> Program {
    Program { stmts, span: S }
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block { stmts, span: S }
}

// ── Literals ─────────────────────────────────────────────────────────────────

pub fn lit(literal: Literal) -> Expr {
    expr(ExprKind::Literal(literal))
}

pub fn null() -> Expr {
    lit(Literal::Null)
}

pub fn boolean(b: bool) -> Expr {
    lit(Literal::Bool(b))
}

pub fn int(n: i64) -> Expr {
    lit(Literal::Int(BigInt::from(n)))
}

/// Unsuffixed integer literal of arbitrary magnitude.
pub fn int_big(n: impl Into<BigInt>) -> Expr {
    lit(Literal::Int(n.into()))
}

pub fn typed_int(n: impl Into<BigInt>, ty: IntType) -> Expr {
    lit(Literal::TypedInt(n.into(), ty))
}

pub fn bigint(n: impl Into<BigInt>) -> Expr {
    lit(Literal::BigInt(n.into()))
}

pub fn float(n: f64) -> Expr {
    lit(Literal::Float(n))
}

pub fn decimal(text: &str) -> Expr {
    lit(Literal::Decimal(text.to_string()))
}

pub fn string(s: &str) -> Expr {
    lit(Literal::Str(s.to_string()))
}

pub fn chr(c: char) -> Expr {
    lit(Literal::Char(c))
}

/// `f"..."`: `Ok` parts are literal text, `Err` parts are expressions.
pub fn interp(parts: Vec<Result<&str, Expr>>) -> Expr {
    expr(ExprKind::Interpolation(
        parts
            .into_iter()
            .map(|p| match p {
                Ok(text) => StringPart::Literal(text.to_string()),
                Err(e) => StringPart::Expr(e),
            })
            .collect(),
    ))
}

pub fn array(elems: Vec<Expr>) -> Expr {
    expr(ExprKind::ArrayLit(elems))
}

pub fn tuple(elems: Vec<Expr>) -> Expr {
    expr(ExprKind::TupleLit(elems))
}

pub fn dict(pairs: Vec<(Expr, Expr)>) -> Expr {
    expr(ExprKind::DictLit(pairs))
}

pub fn set(elems: Vec<Expr>) -> Expr {
    expr(ExprKind::SetLit(elems))
}

pub fn range(start: Expr, end: Expr, inclusive: bool) -> Expr {
    expr(ExprKind::RangeLit {
        start: boxed(start),
        end: boxed(end),
        inclusive,
    })
}

pub fn struct_lit(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    expr(ExprKind::StructLit {
        name: ident(name),
        fields: fields
            .into_iter()
            .map(|(n, value)| FieldInit {
                name: ident(n),
                value,
                span: S,
            })
            .collect(),
    })
}

pub fn variant(enum_name: &str, variant: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::VariantLit {
        enum_name: ident(enum_name),
        variant: ident(variant),
        args,
    })
}

// ── Names, access & calls ────────────────────────────────────────────────────

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Identifier(name.to_string()))
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: boxed(callee),
        args,
    })
}

/// `name(args...)`
pub fn call_named(name: &str, args: Vec<Expr>) -> Expr {
    call(var(name), args)
}

pub fn member(object: Expr, field: &str) -> Expr {
    expr(ExprKind::Member {
        object: boxed(object),
        field: ident(field),
    })
}

/// `object.method(args...)`
pub fn method(object: Expr, name: &str, args: Vec<Expr>) -> Expr {
    call(member(object, name), args)
}

pub fn index(object: Expr, idx: Expr) -> Expr {
    expr(ExprKind::Index {
        object: boxed(object),
        index: boxed(idx),
    })
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    expr(ExprKind::Assign {
        target: boxed(target),
        op: None,
        value: boxed(value),
    })
}

/// `target op= value`
pub fn compound(target: Expr, op: BinOp, value: Expr) -> Expr {
    expr(ExprKind::Assign {
        target: boxed(target),
        op: Some(op),
        value: boxed(value),
    })
}

// ── Operators ────────────────────────────────────────────────────────────────

pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        left: boxed(left),
        op,
        right: boxed(right),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: boxed(operand),
    })
}

pub fn ternary(condition: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    expr(ExprKind::Ternary {
        condition: boxed(condition),
        then_expr: boxed(then_expr),
        else_expr: boxed(else_expr),
    })
}

pub fn await_(inner: Expr) -> Expr {
    expr(ExprKind::Await(boxed(inner)))
}

// ── Lambdas & match ──────────────────────────────────────────────────────────

pub fn lambda(params: &[&str], body: Expr) -> Expr {
    expr(ExprKind::Lambda(Box::new(LambdaExpr {
        params: params.iter().map(|p| param(p)).collect(),
        body: LambdaBody::Expr(body),
        span: S,
    })))
}

pub fn lambda_block(params: &[&str], body: Vec<Stmt>) -> Expr {
    expr(ExprKind::Lambda(Box::new(LambdaExpr {
        params: params.iter().map(|p| param(p)).collect(),
        body: LambdaBody::Block(block(body)),
        span: S,
    })))
}

pub fn match_of(subject: Expr, arms: Vec<MatchArm>) -> MatchExpr {
    MatchExpr {
        subject,
        arms,
        span: S,
    }
}

/// `match` in expression position.
pub fn match_expr(subject: Expr, arms: Vec<MatchArm>) -> Expr {
    expr(ExprKind::Match(Box::new(match_of(subject, arms))))
}

pub fn arm(pattern: Pattern, body: Expr) -> MatchArm {
    MatchArm {
        pattern,
        guard: None,
        body: ArmBody::Expr(body),
        span: S,
    }
}

pub fn arm_guarded(pattern: Pattern, guard: Expr, body: Expr) -> MatchArm {
    MatchArm {
        guard: Some(guard),
        ..arm(pattern, body)
    }
}

pub fn arm_block(pattern: Pattern, body: Vec<Stmt>) -> MatchArm {
    MatchArm {
        pattern,
        guard: None,
        body: ArmBody::Block(block(body)),
        span: S,
    }
}

// ── Patterns ─────────────────────────────────────────────────────────────────

pub fn p_lit(literal: Literal) -> Pattern {
    Pattern::Literal(literal, S)
}

pub fn p_int(n: i64) -> Pattern {
    p_lit(Literal::Int(BigInt::from(n)))
}

pub fn p_str(s: &str) -> Pattern {
    p_lit(Literal::Str(s.to_string()))
}

pub fn p_range(start: i64, end: i64, inclusive: bool) -> Pattern {
    Pattern::Range {
        start: Literal::Int(BigInt::from(start)),
        end: Literal::Int(BigInt::from(end)),
        inclusive,
        span: S,
    }
}

pub fn p_tuple(items: Vec<Pattern>) -> Pattern {
    Pattern::Tuple(items, S)
}

pub fn p_bind(name: &str) -> Pattern {
    Pattern::Binding(ident(name))
}

pub fn p_wild() -> Pattern {
    Pattern::Wildcard(S)
}

pub fn p_variant(enum_name: &str, variant: &str, fields: Vec<Pattern>) -> Pattern {
    Pattern::Variant {
        enum_name: Some(ident(enum_name)),
        variant: ident(variant),
        fields,
        span: S,
    }
}

// ── Types ────────────────────────────────────────────────────────────────────

/// A type annotation from its source name (`uint8`, `string`, `Rectangle`).
pub fn ty(name: &str) -> TypeAnnotation {
    TypeAnnotation::new(TypeKind::from_name(name), S)
}

pub fn ty_kind(kind: TypeKind) -> TypeAnnotation {
    TypeAnnotation::new(kind, S)
}

// ── Statements ───────────────────────────────────────────────────────────────

pub fn expr_stmt(e: Expr) -> Stmt {
    Stmt::Expr(ExprStmt { expr: e, span: S })
}

pub fn dec(name: &str, value: Expr) -> Stmt {
    Stmt::Var(VarDecl {
        kind: DeclKind::Dec,
        name: ident(name),
        type_ann: None,
        value,
        span: S,
    })
}

/// `dec <type> name = value`
pub fn dec_typed(type_name: &str, name: &str, value: Expr) -> Stmt {
    Stmt::Var(VarDecl {
        kind: DeclKind::Dec,
        name: ident(name),
        type_ann: Some(ty(type_name)),
        value,
        span: S,
    })
}

pub fn constant(name: &str, value: Expr) -> Stmt {
    Stmt::Var(VarDecl {
        kind: DeclKind::Const,
        name: ident(name),
        type_ann: None,
        value,
        span: S,
    })
}

pub fn destructure(pattern: Pattern, value: Expr) -> Stmt {
    Stmt::Destructure(DestructureDecl {
        kind: DeclKind::Dec,
        pattern,
        value,
        span: S,
    })
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        value: Some(value),
        span: S,
    })
}

pub fn ret_none() -> Stmt {
    Stmt::Return(ReturnStmt {
        value: None,
        span: S,
    })
}

pub fn brk() -> Stmt {
    Stmt::Break(S)
}

pub fn cont() -> Stmt {
    Stmt::Continue(S)
}

pub fn throw(value: Expr) -> Stmt {
    Stmt::Throw(ThrowStmt { value, span: S })
}

pub fn block_stmt(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(block(stmts))
}

pub fn if_(condition: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>>) -> Stmt {
    Stmt::If(IfStmt {
        condition,
        then_block: block(then),
        else_branch: otherwise.map(|stmts| ElseBranch::Block(block(stmts))),
        span: S,
    })
}

pub fn while_(condition: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileStmt {
        condition,
        body: block(body),
        span: S,
    })
}

pub fn for_(
    init: Option<Stmt>,
    condition: Option<Expr>,
    update: Option<Expr>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::For(ForStmt {
        init: init.map(Box::new),
        condition,
        update,
        body: block(body),
        span: S,
    })
}

pub fn for_in(item: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::ForIn(ForInStmt {
        item: p_bind(item),
        iterable,
        body: block(body),
        span: S,
    })
}

pub fn switch(
    subject: Expr,
    cases: Vec<(Vec<Expr>, Vec<Stmt>)>,
    default: Option<Vec<Stmt>>,
) -> Stmt {
    Stmt::Switch(SwitchStmt {
        subject,
        cases: cases
            .into_iter()
            .map(|(labels, body)| SwitchCase {
                labels,
                body: block(body),
                span: S,
            })
            .collect(),
        default: default.map(block),
        span: S,
    })
}

pub fn match_stmt(subject: Expr, arms: Vec<MatchArm>) -> Stmt {
    Stmt::Match(match_of(subject, arms))
}

pub fn catch(type_filter: Option<&str>, binding: Option<&str>, body: Vec<Stmt>) -> CatchClause {
    CatchClause {
        type_filter: type_filter.map(ident),
        binding: binding.map(ident),
        body: block(body),
        span: S,
    }
}

pub fn try_(body: Vec<Stmt>, catches: Vec<CatchClause>, finally: Option<Vec<Stmt>>) -> Stmt {
    Stmt::Try(TryStmt {
        body: block(body),
        catches,
        finally: finally.map(block),
        span: S,
    })
}

// ── Declarations ─────────────────────────────────────────────────────────────

pub fn param(name: &str) -> Param {
    Param {
        name: ident(name),
        type_ann: None,
        default: None,
        span: S,
    }
}

pub fn param_typed(type_name: &str, name: &str) -> Param {
    Param {
        type_ann: Some(ty(type_name)),
        ..param(name)
    }
}

pub fn param_default(name: &str, default: Expr) -> Param {
    Param {
        default: Some(default),
        ..param(name)
    }
}

pub fn function_decl(name: &str, params: Vec<Param>, body: Vec<Stmt>) -> FunctionDecl {
    FunctionDecl {
        name: ident(name),
        params,
        return_type: None,
        body: block(body),
        is_async: false,
        span: S,
    }
}

pub fn function(name: &str, params: Vec<Param>, body: Vec<Stmt>) -> Stmt {
    Stmt::Function(function_decl(name, params, body))
}

pub fn async_function(name: &str, params: Vec<Param>, body: Vec<Stmt>) -> Stmt {
    Stmt::Function(FunctionDecl {
        is_async: true,
        ..function_decl(name, params, body)
    })
}

/// `name: type [= default]`; an empty type name leaves the field untyped.
pub fn field(name: &str, type_name: &str, default: Option<Expr>) -> FieldDecl {
    FieldDecl {
        name: ident(name),
        type_ann: (!type_name.is_empty()).then(|| ty(type_name)),
        default,
        span: S,
    }
}

pub fn struct_decl(name: &str, members: Vec<StructMember>, methods: Vec<FunctionDecl>) -> Stmt {
    Stmt::Struct(StructDecl {
        name: ident(name),
        members,
        methods,
        span: S,
    })
}

pub fn union_decl(name: &str, fields: Vec<FieldDecl>) -> Stmt {
    Stmt::Union(UnionDecl {
        name: ident(name),
        fields,
        span: S,
    })
}

/// `enum Name { Variant(payload types...), ... }`
pub fn enum_decl(name: &str, variants: Vec<(&str, Vec<&str>)>) -> Stmt {
    Stmt::Enum(EnumDecl {
        name: ident(name),
        variants: variants
            .into_iter()
            .map(|(v, payload)| VariantDecl {
                name: ident(v),
                payload: payload.into_iter().map(ty).collect(),
                span: S,
            })
            .collect(),
        span: S,
    })
}

pub fn type_alias(name: &str, target: &str) -> Stmt {
    Stmt::TypeAlias(TypeAliasDecl {
        name: ident(name),
        target: ty(target),
        span: S,
    })
}
