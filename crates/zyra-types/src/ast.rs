//! AST node types for the Zyra language.
//!
//! The runtime never tokenizes or parses: a front end (or a host using
//! [`crate::build`]) hands it a finished tree of these nodes.
//! Every node carries a [`Span`]; large recursive types are boxed.

use crate::{IntType, Span};
use num_bigint::BigInt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// `dec` bindings are mutable, `const` bindings are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Dec,
    Const,
}

impl DeclKind {
    pub fn is_mutable(self) -> bool {
        matches!(self, DeclKind::Dec)
    }
}

/// `dec [type] name = value` / `const name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: DeclKind,
    pub name: Ident,
    pub type_ann: Option<TypeAnnotation>,
    pub value: Expr,
    pub span: Span,
}

/// `dec (a, (b, _)) = value`
#[derive(Debug, Clone, PartialEq)]
pub struct DestructureDecl {
    pub kind: DeclKind,
    pub pattern: Pattern,
    pub value: Expr,
    pub span: Span,
}

/// `[async] fnc name(params) [-> type] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub is_async: bool,
    pub span: Span,
}

/// A parameter: `[type] name [= default]`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub type_ann: Option<TypeAnnotation>,
    pub default: Option<Expr>,
    pub span: Span,
}

/// A declared field of a struct or union: `name: type [= default]`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub type_ann: Option<TypeAnnotation>,
    pub default: Option<Expr>,
    pub span: Span,
}

/// A struct member: a plain field or an anonymous union group.
#[derive(Debug, Clone, PartialEq)]
pub enum StructMember {
    Field(FieldDecl),
    /// `union { a: int32, b: float32 }` embedded in the struct body.
    Union(Vec<FieldDecl>),
}

/// `struct Name { members... fnc methods... }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub members: Vec<StructMember>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// `union Name { a: int32, b: float32 }`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionDecl {
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// `enum Name { Unit, Tuple(int32, string) }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub variants: Vec<VariantDecl>,
    pub span: Span,
}

/// An enum variant; `payload` is empty for unit variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: Ident,
    pub payload: Vec<TypeAnnotation>,
    pub span: Span,
}

impl VariantDecl {
    pub fn arity(&self) -> usize {
        self.payload.len()
    }
}

/// `type UserId = uint64`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Ident,
    pub target: TypeAnnotation,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var(VarDecl),
    Destructure(DestructureDecl),
    Function(FunctionDecl),
    Struct(StructDecl),
    Union(UnionDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    If(IfStmt),
    While(WhileStmt),
    /// `for (init; cond; update) { ... }`
    For(ForStmt),
    /// `for x in iterable { ... }`
    ForIn(ForInStmt),
    Switch(SwitchStmt),
    Match(MatchExpr),
    Try(TryStmt),
    Throw(ThrowStmt),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
    Block(Block),
    Expr(ExprStmt),
}

/// `if (cond) { ... } [else ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    ElseIf(Box<IfStmt>),
    Block(Block),
}

/// `while (cond) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for (init; cond; update) { ... }`; every header part is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// `for item in iterable { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub item: Pattern,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// `switch (subject) { case a, b: ... default: ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub subject: Expr,
    pub cases: Vec<SwitchCase>,
    pub default: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub labels: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

/// `try { ... } catch (T e) { ... } finally { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
    pub span: Span,
}

/// `catch ([Type] [name]) { ... }`; an absent type catches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub type_filter: Option<Ident>,
    pub binding: Option<Ident>,
    pub body: Block,
    pub span: Span,
}

/// `throw expr`
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: Span,
}

/// `return [expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// A bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    Literal(Literal),
    /// `f"Hello {name}"`
    Interpolation(Vec<StringPart>),
    ArrayLit(Vec<Expr>),
    TupleLit(Vec<Expr>),
    DictLit(Vec<(Expr, Expr)>),
    SetLit(Vec<Expr>),
    RangeLit {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    /// `Name { field: expr, ... }`: struct or union construction.
    StructLit {
        name: Ident,
        fields: Vec<FieldInit>,
    },
    /// `Enum::Variant` or `Enum::Variant(args...)`
    VariantLit {
        enum_name: Ident,
        variant: Ident,
        args: Vec<Expr>,
    },

    // ── Names, access & calls ──
    Identifier(String),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `expr.field`; tuple positions use numeric names (`t.0`).
    Member {
        object: Box<Expr>,
        field: Ident,
    },
    /// `target = value` or `target op= value`
    Assign {
        target: Box<Expr>,
        op: Option<BinOp>,
        value: Box<Expr>,
    },

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `cond ? a : b`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    // ── Functions & control ──
    Lambda(Box<LambdaExpr>),
    Match(Box<MatchExpr>),
    /// `await expr`: the only point where evaluation may suspend.
    Await(Box<Expr>),
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Char(char),
    Str(String),
    /// Unsuffixed integer: `int64` when it fits, otherwise a bigint.
    Int(BigInt),
    /// Integer with an explicit type: `255u8`, `int128(…)` folded by the front end.
    TypedInt(BigInt, IntType),
    /// `123n`
    BigInt(BigInt),
    Float(f64),
    Float32(f32),
    /// `3.14d`, kept as source text so no precision is lost.
    Decimal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    Expr(Expr),
}

/// `name: expr` inside a struct literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

// ── Operators ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    Xor,
    // Comparison
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    /// `<=>`
    Cmp,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Xor => "xor",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Cmp => "<=>",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
    /// `~x`
    BitNot,
}

// ── Match & lambda ────────────────────────────────────────────────────────────

/// `match subject { arms... }`; usable as a statement or an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub subject: Expr,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

/// `pattern [if guard] => body`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: ArmBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArmBody {
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Matches by value equality.
    Literal(Literal, Span),
    /// `a..b` / `a..=b` over numeric scrutinees.
    Range {
        start: Literal,
        end: Literal,
        inclusive: bool,
        span: Span,
    },
    Tuple(Vec<Pattern>, Span),
    /// `Enum::Variant(p, ...)`; the enum name may be omitted.
    Variant {
        enum_name: Option<Ident>,
        variant: Ident,
        fields: Vec<Pattern>,
        span: Span,
    },
    /// A bare name: always matches and binds the scrutinee.
    Binding(Ident),
    /// `_`
    Wildcard(Span),
}

/// `|params| expr` or `|params| { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub body: LambdaBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Block),
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Annotations
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Any,
    Null,
    Bool,
    Char,
    String,
    Int(IntType),
    BigInt,
    Float32,
    Float64,
    Decimal,
    Array(Box<TypeAnnotation>),
    Tuple(Vec<TypeAnnotation>),
    Dict(Box<TypeAnnotation>, Box<TypeAnnotation>),
    Set(Box<TypeAnnotation>),
    Range,
    Function,
    /// Struct, union, enum or alias name.
    Named(String),
}

impl TypeKind {
    /// Resolve a primitive type name as written in source.
    pub fn from_name(name: &str) -> TypeKind {
        if let Some(int) = IntType::from_name(name) {
            return TypeKind::Int(int);
        }
        match name {
            "any" => TypeKind::Any,
            "null" => TypeKind::Null,
            "bool" => TypeKind::Bool,
            "char" => TypeKind::Char,
            "string" | "String" => TypeKind::String,
            "bigint" => TypeKind::BigInt,
            "float32" => TypeKind::Float32,
            "float" | "float64" => TypeKind::Float64,
            "decimal" => TypeKind::Decimal,
            "range" => TypeKind::Range,
            "function" => TypeKind::Function,
            other => TypeKind::Named(other.to_string()),
        }
    }
}
