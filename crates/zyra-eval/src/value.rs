//! Runtime values.
//!
//! Aggregates have value semantics: assigning or passing a struct, union,
//! array or dict copies it. Only function values share state, through the
//! frame they captured.

use crate::builtins::Output;
use crate::decimal::Decimal;
use crate::env::Frame;
use crate::error::{EvalError, EvalResult};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use zyra_types::ast::{LambdaBody, Literal, Param, TypeAnnotation};
use zyra_types::IntType;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    String(String),
    /// Fixed-width integer. The value is always within the type's range;
    /// build through [`Value::int`] to keep it that way.
    Int(BigInt, IntType),
    BigInt(BigInt),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// Insertion-ordered; keys are unique under value equality.
    Dict(Vec<(Value, Value)>),
    /// Insertion-ordered; elements are unique under value equality.
    Set(Vec<Value>),
    Range(RangeValue),
    Struct(StructValue),
    Union(UnionValue),
    Enum(EnumValue),
    Function(Rc<Closure>),
    Native(NativeFn),
}

// ══════════════════════════════════════════════════════════════════════════════
// Aggregates
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub start: BigInt,
    pub end: BigInt,
    pub inclusive: bool,
    /// Integer type of the bounds; `None` for bigint bounds.
    pub ty: Option<IntType>,
}

impl RangeValue {
    /// One past the last element.
    pub fn stop(&self) -> BigInt {
        if self.inclusive {
            &self.end + 1
        } else {
            self.end.clone()
        }
    }

    pub fn len(&self) -> BigInt {
        let span = self.stop() - &self.start;
        if span < BigInt::from(0) {
            BigInt::from(0)
        } else {
            span
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stop() <= self.start
    }

    pub fn element(&self, n: BigInt) -> Value {
        match self.ty {
            Some(ty) => Value::int(n, ty),
            None => Value::BigInt(n),
        }
    }
}

/// The currently active field of a union, or of a struct's union group.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveField {
    pub name: String,
    pub value: Box<Value>,
}

impl ActiveField {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
        }
    }
}

/// An anonymous union embedded in a struct: one of `fields` is active.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionGroup {
    pub fields: Rc<[String]>,
    pub active: ActiveField,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(String, Value),
    Group(UnionGroup),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub type_name: String,
    pub members: Vec<Member>,
}

impl StructValue {
    /// Plain field, or the active field of a union group.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.members.iter().find_map(|m| match m {
            Member::Field(n, v) if n == name => Some(v),
            Member::Group(g) if g.active.name == name => Some(g.active.value.as_ref()),
            _ => None,
        })
    }

    pub fn get(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.field(name) {
            return Ok(value.clone());
        }
        match self.group_of(name) {
            Some(group) => Err(EvalError::InactiveUnionField {
                owner: self.type_name.clone(),
                field: name.to_string(),
                active: group.active.name.clone(),
            }),
            None => Err(EvalError::UnknownMember(format!(
                "'{}' has no field '{name}'",
                self.type_name
            ))),
        }
    }

    /// Store into a plain field, or activate `name` within its union group.
    pub fn set(&mut self, name: &str, value: Value) -> EvalResult<()> {
        for member in &mut self.members {
            match member {
                Member::Field(n, slot) if n == name => {
                    *slot = value;
                    return Ok(());
                }
                Member::Group(group) if group.fields.iter().any(|f| f == name) => {
                    group.active = ActiveField::new(name, value);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(EvalError::UnknownMember(format!(
            "'{}' has no field '{name}'",
            self.type_name
        )))
    }

    fn group_of(&self, name: &str) -> Option<&UnionGroup> {
        self.members.iter().find_map(|m| match m {
            Member::Group(g) if g.fields.iter().any(|f| f == name) => Some(g),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    pub type_name: String,
    pub active: ActiveField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub type_name: String,
    pub variant: String,
    pub payload: Vec<Value>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A user function or lambda together with the frame it was created in.
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: LambdaBody,
    pub env: Frame,
    pub is_async: bool,
}

impl Closure {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<lambda>")
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.display_name())
            .field("params", &self.params.len())
            .field("is_async", &self.is_async)
            .finish()
    }
}

pub type NativeImpl = dyn Fn(&mut Output, Vec<Value>) -> EvalResult<Value>;

/// A host-provided function.
#[derive(Clone)]
pub struct NativeFn {
    pub name: String,
    pub func: Rc<NativeImpl>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Output, Vec<Value>) -> EvalResult<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Construction & Inspection
// ══════════════════════════════════════════════════════════════════════════════

impl Value {
    /// A fixed-width integer, wrapped into range.
    pub fn int(value: BigInt, ty: IntType) -> Value {
        let wrapped = ty.wrap(&value);
        Value::Int(wrapped, ty)
    }

    pub fn from_literal(lit: &Literal) -> EvalResult<Value> {
        Ok(match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Char(c) => Value::Char(*c),
            Literal::Str(s) => Value::String(s.clone()),
            Literal::Int(n) => {
                if IntType::DEFAULT.contains(n) {
                    Value::Int(n.clone(), IntType::DEFAULT)
                } else {
                    Value::BigInt(n.clone())
                }
            }
            Literal::TypedInt(n, ty) => Value::int(n.clone(), *ty),
            Literal::BigInt(n) => Value::BigInt(n.clone()),
            Literal::Float(f) => Value::Float64(*f),
            Literal::Float32(f) => Value::Float32(*f),
            Literal::Decimal(text) => Value::Decimal(Decimal::parse(text).ok_or_else(|| {
                EvalError::Runtime(format!("invalid decimal literal '{text}'"))
            })?),
        })
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Int(_, ty) => ty.name(),
            Value::BigInt(_) => "bigint",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Decimal(_) => "decimal",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Range(_) => "range",
            Value::Struct(s) => &s.type_name,
            Value::Union(u) => &u.type_name,
            Value::Enum(e) => &e.type_name,
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(..)
                | Value::BigInt(_)
                | Value::Float32(_)
                | Value::Float64(_)
                | Value::Decimal(_)
        )
    }

    /// Integer payload of a fixed-width or bigint value.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Int(n, _) | Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|n| n.to_i64())
    }

    /// Python-style truthiness: zero, empty and null are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::String(s) => !s.is_empty(),
            Value::Int(n, _) | Value::BigInt(n) => *n != BigInt::from(0),
            Value::Float32(f) => *f != 0.0,
            Value::Float64(f) => *f != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Array(items) | Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Range(r) => !r.is_empty(),
            Value::Struct(_)
            | Value::Union(_)
            | Value::Enum(_)
            | Value::Function(_)
            | Value::Native(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }
}

// ── Dict & set helpers ────────────────────────────────────────────────────────

pub fn dict_get<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Insert or replace, keeping the original position of an existing key.
pub fn dict_insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

pub fn set_insert(items: &mut Vec<Value>, value: Value) {
    if !items.contains(&value) {
        items.push(value);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Equality
// ══════════════════════════════════════════════════════════════════════════════

/// Structural equality. Numbers compare by value across types; NaN is never
/// equal; dicts and sets ignore order; functions are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return crate::arith::numeric_cmp(self, other) == Some(Ordering::Equal);
        }
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| dict_get(b, k).is_some_and(|w| v == w))
            }
            (Value::Range(a), Value::Range(b)) => {
                a.start == b.start && a.end == b.end && a.inclusive == b.inclusive
            }
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Union(a), Value::Union(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Display
// ══════════════════════════════════════════════════════════════════════════════

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_nested(f, item)?;
    }
    Ok(())
}

/// Inside aggregates strings and chars are quoted.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{s:?}"),
        Value::Char(c) => write!(f, "{c:?}"),
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::Int(n, _) | Value::BigInt(n) => write!(f, "{n}"),
            Value::Float32(x) => write_float(f, f64::from(*x)),
            Value::Float64(x) => write_float(f, *x),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                write_list(f, items)?;
                f.write_str("}")
            }
            Value::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_nested(f, k)?;
                    f.write_str(": ")?;
                    write_nested(f, v)?;
                }
                f.write_str("}")
            }
            Value::Range(r) => {
                let op = if r.inclusive { "..=" } else { ".." };
                write!(f, "{}{op}{}", r.start, r.end)
            }
            Value::Struct(s) => {
                write!(f, "{} {{ ", s.type_name)?;
                for (i, member) in s.members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let (name, value) = match member {
                        Member::Field(name, value) => (name.as_str(), value),
                        Member::Group(g) => (g.active.name.as_str(), g.active.value.as_ref()),
                    };
                    write!(f, "{name}: ")?;
                    write_nested(f, value)?;
                }
                f.write_str(" }")
            }
            Value::Union(u) => {
                write!(f, "{} {{ {}: ", u.type_name, u.active.name)?;
                write_nested(f, &u.active.value)?;
                f.write_str(" }")
            }
            Value::Enum(e) => {
                write!(f, "{}::{}", e.type_name, e.variant)?;
                if !e.payload.is_empty() {
                    f.write_str("(")?;
                    write_list(f, &e.payload)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Value::Function(c) => write!(f, "<function {}>", c.display_name()),
            Value::Native(n) => write!(f, "<native function {}>", n.name),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(BigInt::from(n), IntType::DEFAULT)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float64(x)
    }
}
