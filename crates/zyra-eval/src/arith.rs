//! Arithmetic engine: numeric promotion, fixed-width wrapping, operators
//! and ordering.
//!
//! Integer operations are computed exactly on [`BigInt`] and then wrapped
//! into the promoted result type, so overflow is two's-complement modular
//! for every width.

use crate::decimal::Decimal;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use zyra_types::ast::{BinOp, UnaryOp};
use zyra_types::{IntType, PLATFORM_BITS};

/// Shift counts beyond this on unbounded integers are rejected.
const MAX_BIGINT_SHIFT: usize = 1 << 16;

/// Unbounded `**` results wider than this many bits are rejected.
pub(crate) const MAX_POW_BITS: u64 = 1 << 20;

/// Whether `base ** exp` stays within [`MAX_POW_BITS`]. Bases of magnitude
/// 0 or 1 never grow.
pub(crate) fn pow_fits(base: &BigInt, exp: u32) -> bool {
    let bits = base.bits();
    bits <= 1 || bits.saturating_mul(u64::from(exp)) <= MAX_POW_BITS
}

// ══════════════════════════════════════════════════════════════════════════════
// Promotion
// ══════════════════════════════════════════════════════════════════════════════

/// Result type of a binary integer operation.
///
/// The result is as wide as the wider operand and signed if either operand
/// is signed. Platform-size types count as [`PLATFORM_BITS`] wide and win
/// at that width. Subtracting two values of the same platform-size type
/// yields `ptrdiff`.
pub fn promote(a: IntType, b: IntType, op: BinOp) -> IntType {
    if op == BinOp::Sub && a == b && a.is_platform() {
        return IntType::PtrDiff;
    }
    if a == b {
        return a;
    }
    let bits = a.bits().max(b.bits());
    let signed = a.is_signed() || b.is_signed();
    if bits == PLATFORM_BITS && (a.is_platform() || b.is_platform()) {
        if a == IntType::PtrDiff || b == IntType::PtrDiff {
            return IntType::PtrDiff;
        }
        return if signed { IntType::ISize } else { IntType::USize };
    }
    IntType::fixed(bits, signed).unwrap_or(a)
}

/// Numeric view of a value for operator dispatch.
enum Num<'a> {
    Int(&'a BigInt, IntType),
    Big(&'a BigInt),
    F32(f32),
    F64(f64),
    Dec(&'a Decimal),
}

fn classify(value: &Value) -> Option<Num<'_>> {
    match value {
        Value::Int(n, ty) => Some(Num::Int(n, *ty)),
        Value::BigInt(n) => Some(Num::Big(n)),
        Value::Float32(x) => Some(Num::F32(*x)),
        Value::Float64(x) => Some(Num::F64(*x)),
        Value::Decimal(d) => Some(Num::Dec(d)),
        _ => None,
    }
}

fn big_to_f64(n: &BigInt) -> f64 {
    n.to_f64().unwrap_or(if n.is_negative() {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

impl Num<'_> {
    fn to_f64(&self) -> f64 {
        match self {
            Num::Int(n, _) | Num::Big(n) => big_to_f64(n),
            Num::F32(x) => f64::from(*x),
            Num::F64(x) => *x,
            Num::Dec(d) => d.to_f64(),
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Num::F32(_) | Num::F64(_))
    }
}

fn mismatch(op: &str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{op}' to {} and {}",
        lhs.type_name(),
        rhs.type_name()
    ))
}

// ══════════════════════════════════════════════════════════════════════════════
// Binary Operators
// ══════════════════════════════════════════════════════════════════════════════

/// Apply an arithmetic, bitwise or ordering operator.
///
/// Logical operators and `==`/`!=` are handled by the evaluator.
pub fn binary(op: BinOp, lhs: &Value, rhs: &Value, precision: u32) -> EvalResult<Value> {
    match op {
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
            let ord = compare(lhs, rhs)?;
            Ok(Value::Bool(match op {
                BinOp::Less => ord == Ordering::Less,
                BinOp::Greater => ord == Ordering::Greater,
                BinOp::LessEq => ord != Ordering::Greater,
                _ => ord != Ordering::Less,
            }))
        }
        BinOp::Cmp => {
            let ord = compare(lhs, rhs)?;
            Ok(Value::from(ord as i64))
        }
        BinOp::Add => add(lhs, rhs, precision),
        _ => numeric(op, lhs, rhs, precision),
    }
}

fn add(lhs: &Value, rhs: &Value, precision: u32) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{lhs}{rhs}")))
        }
        (Value::Array(a), Value::Array(b)) => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            Ok(Value::Array(items))
        }
        _ => numeric(BinOp::Add, lhs, rhs, precision),
    }
}

fn numeric(op: BinOp, lhs: &Value, rhs: &Value, precision: u32) -> EvalResult<Value> {
    let (a, b) = match (classify(lhs), classify(rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(mismatch(op.as_str(), lhs, rhs)),
    };
    match (&a, &b) {
        (Num::Int(x, tx), Num::Int(y, ty)) => {
            let result_ty = match op {
                BinOp::Shl | BinOp::Shr | BinOp::Pow => *tx,
                _ => promote(*tx, *ty, op),
            };
            int_op(op, x, y, Some(result_ty))
        }
        (Num::Int(x, _) | Num::Big(x), Num::Int(y, _) | Num::Big(y)) => int_op(op, x, y, None),
        (Num::Dec(_), _) | (_, Num::Dec(_)) if a.is_float() || b.is_float() => Err(
            EvalError::TypeMismatch(format!(
                "cannot mix decimal and {} in '{}'",
                if a.is_float() { lhs.type_name() } else { rhs.type_name() },
                op.as_str()
            )),
        ),
        (Num::Dec(_), _) | (_, Num::Dec(_)) => {
            decimal_op(op, &to_decimal_num(&a), &to_decimal_num(&b), precision)
        }
        _ => {
            let wide = matches!(a, Num::F64(_)) || matches!(b, Num::F64(_));
            let result = float_op(op, a.to_f64(), b.to_f64(), lhs, rhs)?;
            Ok(if wide {
                Value::Float64(result)
            } else {
                Value::Float32(result as f32)
            })
        }
    }
}

fn to_decimal_num(n: &Num<'_>) -> Decimal {
    match n {
        Num::Dec(d) => (*d).clone(),
        Num::Int(x, _) | Num::Big(x) => Decimal::from_int(x),
        // floats never reach here
        Num::F32(_) | Num::F64(_) => Decimal::from_int(&BigInt::zero()),
    }
}

/// Integer operation, wrapped into `ty` when given, unbounded otherwise.
fn int_op(op: BinOp, x: &BigInt, y: &BigInt, ty: Option<IntType>) -> EvalResult<Value> {
    let finish = |n: BigInt| match ty {
        Some(ty) => Value::int(n, ty),
        None => Value::BigInt(n),
    };
    let nonzero = |what: &str| -> EvalResult<()> {
        if y.is_zero() {
            Err(EvalError::DivisionByZero(format!("{x} {what} 0")))
        } else {
            Ok(())
        }
    };

    let n = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            nonzero("/")?;
            x / y
        }
        BinOp::FloorDiv => {
            nonzero("//")?;
            x.div_floor(y)
        }
        BinOp::Mod => {
            nonzero("%")?;
            x % y
        }
        BinOp::Pow => {
            if y.is_negative() {
                return Ok(Value::Float64(big_to_f64(x).powf(big_to_f64(y))));
            }
            match ty {
                Some(ty) => x.modpow(y, &ty.modulus()),
                None => {
                    let exp = y
                        .to_u32()
                        .filter(|exp| pow_fits(x, *exp))
                        .ok_or_else(|| EvalError::Runtime(format!("{x} ** {y} is too large")))?;
                    x.pow(exp)
                }
            }
        }
        BinOp::BitAnd => x & y,
        BinOp::BitOr => x | y,
        BinOp::BitXor => x ^ y,
        BinOp::Shl | BinOp::Shr => {
            if y.is_negative() {
                return Err(EvalError::Runtime(format!("negative shift count {y}")));
            }
            let limit = ty.map_or(MAX_BIGINT_SHIFT, |t| t.bits() as usize);
            let count = y.to_usize().filter(|c| *c < limit);
            match (op, count) {
                (BinOp::Shl, Some(c)) => x << c,
                (BinOp::Shr, Some(c)) => x >> c,
                // every bit shifted out of a fixed width
                (BinOp::Shl, None) if ty.is_some() => BigInt::zero(),
                (BinOp::Shr, None) if ty.is_some() => {
                    if x.is_negative() {
                        -BigInt::one()
                    } else {
                        BigInt::zero()
                    }
                }
                _ => return Err(EvalError::Runtime(format!("shift count {y} is too large"))),
            }
        }
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "'{}' is not an arithmetic operator",
                op.as_str()
            )))
        }
    };
    Ok(finish(n))
}

fn float_op(op: BinOp, x: f64, y: f64, lhs: &Value, rhs: &Value) -> EvalResult<f64> {
    let nonzero = |what: &str| -> EvalResult<()> {
        if y == 0.0 {
            Err(EvalError::DivisionByZero(format!("{lhs} {what} {rhs}")))
        } else {
            Ok(())
        }
    };
    Ok(match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            nonzero("/")?;
            x / y
        }
        BinOp::FloorDiv => {
            nonzero("//")?;
            (x / y).floor()
        }
        BinOp::Mod => {
            nonzero("%")?;
            x % y
        }
        BinOp::Pow => x.powf(y),
        _ => return Err(mismatch(op.as_str(), lhs, rhs)),
    })
}

fn decimal_op(op: BinOp, x: &Decimal, y: &Decimal, precision: u32) -> EvalResult<Value> {
    let by_zero = || EvalError::DivisionByZero(format!("{x} {} {y}", op.as_str()));
    let result = match op {
        BinOp::Add => x.add(y),
        BinOp::Sub => x.sub(y),
        BinOp::Mul => x.mul(y),
        BinOp::Div => x.div(y, precision).ok_or_else(by_zero)?,
        BinOp::FloorDiv => x.floor_div(y).ok_or_else(by_zero)?,
        BinOp::Mod => x.rem(y).ok_or_else(by_zero)?,
        BinOp::Pow => {
            let whole = y.trunc();
            let exp = if Decimal::from_int(&whole) == *y {
                whole.to_u32()
            } else {
                None
            };
            let exp = exp.ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "decimal exponent must be a non-negative integer, got {y}"
                ))
            })?;
            x.pow(exp)
                .ok_or_else(|| EvalError::Runtime(format!("{x} ** {y} is too large")))?
        }
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "cannot apply '{}' to decimal",
                op.as_str()
            )))
        }
    };
    Ok(Value::Decimal(result))
}

// ══════════════════════════════════════════════════════════════════════════════
// Unary Operators
// ══════════════════════════════════════════════════════════════════════════════

/// `-x` and `~x`. `not` is handled by the evaluator.
pub fn unary(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(n, ty)) => Ok(Value::int(-n, *ty)),
        (UnaryOp::Neg, Value::BigInt(n)) => Ok(Value::BigInt(-n)),
        (UnaryOp::Neg, Value::Float32(x)) => Ok(Value::Float32(-x)),
        (UnaryOp::Neg, Value::Float64(x)) => Ok(Value::Float64(-x)),
        (UnaryOp::Neg, Value::Decimal(d)) => Ok(Value::Decimal(d.neg())),
        (UnaryOp::BitNot, Value::Int(n, ty)) => Ok(Value::int(-n - 1, *ty)),
        (UnaryOp::BitNot, Value::BigInt(n)) => Ok(Value::BigInt(-n - 1)),
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot apply unary '{}' to {}",
            match op {
                UnaryOp::Neg => "-",
                UnaryOp::BitNot => "~",
                UnaryOp::Not => "not",
            },
            value.type_name()
        ))),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Ordering
// ══════════════════════════════════════════════════════════════════════════════

/// Ordering of two numbers of any numeric types. `None` if either is not
/// numeric or a NaN is involved.
pub fn numeric_cmp(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    let a = classify(lhs)?;
    let b = classify(rhs)?;
    match (&a, &b) {
        (Num::Int(x, _) | Num::Big(x), Num::Int(y, _) | Num::Big(y)) => Some(x.cmp(y)),
        _ if a.is_float() || b.is_float() => a.to_f64().partial_cmp(&b.to_f64()),
        _ => Some(to_decimal_num(&a).cmp(&to_decimal_num(&b))),
    }
}

/// Ordering used by `<`, `<=`, `>`, `>=` and `<=>`.
pub fn compare(lhs: &Value, rhs: &Value) -> EvalResult<Ordering> {
    if lhs.is_numeric() && rhs.is_numeric() {
        return numeric_cmp(lhs, rhs).ok_or_else(|| {
            EvalError::TypeMismatch(format!("cannot order {lhs} and {rhs}"))
        });
    }
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match compare(x, y)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot compare {} and {}",
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Conversions
// ══════════════════════════════════════════════════════════════════════════════

/// Integer conversion used by the integer constructors. Floats and decimals
/// truncate toward zero; strings are parsed.
pub fn to_bigint(value: &Value) -> EvalResult<BigInt> {
    match value {
        Value::Int(n, _) | Value::BigInt(n) => Ok(n.clone()),
        Value::Bool(b) => Ok(BigInt::from(u8::from(*b))),
        Value::Char(c) => Ok(BigInt::from(u32::from(*c))),
        Value::Float32(x) => float_to_bigint(f64::from(*x)),
        Value::Float64(x) => float_to_bigint(*x),
        Value::Decimal(d) => Ok(d.trunc()),
        Value::String(s) => s.trim().parse::<BigInt>().map_err(|_| {
            EvalError::TypeMismatch(format!("cannot convert \"{s}\" to an integer"))
        }),
        other => Err(EvalError::TypeMismatch(format!(
            "cannot convert {} to an integer",
            other.type_name()
        ))),
    }
}

fn float_to_bigint(x: f64) -> EvalResult<BigInt> {
    if !x.is_finite() {
        return Err(EvalError::TypeMismatch(format!(
            "cannot convert {x} to an integer"
        )));
    }
    // integral finite floats print without exponent
    format!("{:.0}", x.trunc())
        .parse::<BigInt>()
        .map_err(|_| EvalError::TypeMismatch(format!("cannot convert {x} to an integer")))
}

pub fn to_f64(value: &Value) -> EvalResult<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            EvalError::TypeMismatch(format!("cannot convert \"{s}\" to a float"))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => classify(other).map(|n| n.to_f64()).ok_or_else(|| {
            EvalError::TypeMismatch(format!("cannot convert {} to a float", other.type_name()))
        }),
    }
}

pub fn to_decimal(value: &Value) -> EvalResult<Decimal> {
    let converted = match value {
        Value::Decimal(d) => Some(d.clone()),
        Value::Int(n, _) | Value::BigInt(n) => Some(Decimal::from_int(n)),
        Value::Float32(x) => Decimal::from_f64(f64::from(*x)),
        Value::Float64(x) => Decimal::from_f64(*x),
        Value::String(s) => Decimal::parse(s),
        _ => None,
    };
    converted.ok_or_else(|| {
        EvalError::TypeMismatch(format!("cannot convert {value} to a decimal"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: i64, ty: IntType) -> Value {
        Value::int(BigInt::from(n), ty)
    }

    fn eval(op: BinOp, a: &Value, b: &Value) -> Value {
        binary(op, a, b, 28).unwrap()
    }

    fn type_of(v: &Value) -> &str {
        v.type_name()
    }

    #[test]
    fn test_promote_width_and_sign() {
        assert_eq!(promote(IntType::I8, IntType::I32, BinOp::Add), IntType::I32);
        assert_eq!(promote(IntType::U8, IntType::I8, BinOp::Add), IntType::I8);
        assert_eq!(promote(IntType::U16, IntType::I8, BinOp::Mul), IntType::I16);
        assert_eq!(promote(IntType::U64, IntType::U128, BinOp::Add), IntType::U128);
    }

    #[test]
    fn test_promote_platform_types() {
        assert_eq!(promote(IntType::USize, IntType::USize, BinOp::Sub), IntType::PtrDiff);
        assert_eq!(promote(IntType::ISize, IntType::ISize, BinOp::Sub), IntType::PtrDiff);
        assert_eq!(promote(IntType::USize, IntType::USize, BinOp::Add), IntType::USize);
        assert_eq!(promote(IntType::USize, IntType::I64, BinOp::Add), IntType::ISize);
        assert_eq!(promote(IntType::USize, IntType::U32, BinOp::Add), IntType::USize);
        assert_eq!(promote(IntType::PtrDiff, IntType::U64, BinOp::Add), IntType::PtrDiff);
        assert_eq!(promote(IntType::USize, IntType::I128, BinOp::Add), IntType::I128);
    }

    #[test]
    fn test_int8_overflow_wraps() {
        let r = eval(BinOp::Add, &int(127, IntType::I8), &int(1, IntType::I8));
        assert_eq!(r, int(-128, IntType::I8));
        assert_eq!(type_of(&r), "int8");
    }

    #[test]
    fn test_mixed_width_result_type() {
        let r = eval(BinOp::Add, &int(100, IntType::I8), &int(1000, IntType::I32));
        assert_eq!(type_of(&r), "int32");
        assert_eq!(r, Value::from(1100));
    }

    #[test]
    fn test_usize_difference_is_ptrdiff() {
        let r = eval(BinOp::Sub, &int(3, IntType::USize), &int(5, IntType::USize));
        assert_eq!(type_of(&r), "ptrdiff");
        assert_eq!(r, Value::from(-2));
    }

    #[test]
    fn test_division_family() {
        let a = Value::from(-7);
        let b = Value::from(2);
        assert_eq!(eval(BinOp::Div, &a, &b), Value::from(-3));
        assert_eq!(eval(BinOp::FloorDiv, &a, &b), Value::from(-4));
        assert_eq!(eval(BinOp::Mod, &a, &b), Value::from(-1));
    }

    #[test]
    fn test_division_by_zero() {
        let err = binary(BinOp::Div, &Value::from(1), &Value::from(0), 28).unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero(_)));
        let err = binary(BinOp::Mod, &Value::Float64(1.0), &Value::Float64(0.0), 28).unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero(_)));
    }

    #[test]
    fn test_pow() {
        assert_eq!(eval(BinOp::Pow, &Value::from(2), &Value::from(10)), Value::from(1024));
        let r = eval(BinOp::Pow, &int(2, IntType::U8), &int(9, IntType::U8));
        assert_eq!(r, int(0, IntType::U8));
        let r = eval(BinOp::Pow, &Value::from(2), &Value::from(-1));
        assert_eq!(r, Value::Float64(0.5));
    }

    #[test]
    fn test_pow_keeps_base_type() {
        let r = eval(BinOp::Pow, &int(2, IntType::I8), &Value::from(130));
        assert_eq!(type_of(&r), "int8");
        assert_eq!(r, int(0, IntType::I8));
        let r = eval(BinOp::Pow, &int(3, IntType::I8), &int(3, IntType::I64));
        assert_eq!(r, int(27, IntType::I8));
    }

    #[test]
    fn test_unbounded_pow_is_capped() {
        let base = Value::BigInt(BigInt::from(10));
        let huge = Value::BigInt(BigInt::from(u32::MAX));
        let err = binary(BinOp::Pow, &base, &huge, 28).unwrap_err();
        assert!(matches!(err, EvalError::Runtime(_)));
        let r = eval(BinOp::Pow, &Value::BigInt(BigInt::one()), &huge);
        assert_eq!(r, Value::BigInt(BigInt::one()));
        assert_eq!(
            eval(BinOp::Pow, &base, &Value::BigInt(BigInt::from(3))),
            Value::BigInt(BigInt::from(1000))
        );

        let dec = Value::Decimal(Decimal::parse("1.5").unwrap());
        let err = binary(BinOp::Pow, &dec, &Value::from(4_000_000_000i64), 28).unwrap_err();
        assert!(matches!(err, EvalError::Runtime(_)));
        let r = eval(BinOp::Pow, &dec, &Value::from(2));
        assert_eq!(r.to_string(), "2.25");
    }

    #[test]
    fn test_shifts_keep_left_type() {
        let r = eval(BinOp::Shl, &int(1, IntType::U8), &Value::from(7));
        assert_eq!(r, int(128, IntType::U8));
        let r = eval(BinOp::Shl, &int(1, IntType::U8), &Value::from(8));
        assert_eq!(r, int(0, IntType::U8));
        let r = eval(BinOp::Shr, &int(-8, IntType::I8), &Value::from(1));
        assert_eq!(r, int(-4, IntType::I8));
    }

    #[test]
    fn test_bitnot_wraps() {
        assert_eq!(unary(UnaryOp::BitNot, &int(0, IntType::U8)).unwrap(), int(255, IntType::U8));
        assert_eq!(unary(UnaryOp::BitNot, &int(5, IntType::I8)).unwrap(), int(-6, IntType::I8));
        assert_eq!(unary(UnaryOp::Neg, &int(-128, IntType::I8)).unwrap(), int(-128, IntType::I8));
    }

    #[test]
    fn test_bigint_never_wraps() {
        let max = Value::Int(IntType::I64.max(), IntType::I64);
        let r = eval(BinOp::Add, &max, &Value::BigInt(BigInt::one()));
        assert_eq!(type_of(&r), "bigint");
        assert_eq!(r, Value::BigInt(IntType::I64.max() + BigInt::one()));
    }

    #[test]
    fn test_float_promotion() {
        let r = eval(BinOp::Add, &Value::Float32(1.5), &Value::from(1));
        assert_eq!(type_of(&r), "float32");
        let r = eval(BinOp::Add, &Value::Float32(1.5), &Value::Float64(1.0));
        assert_eq!(type_of(&r), "float64");
        assert_eq!(r, Value::Float64(2.5));
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = Value::Decimal(Decimal::parse("0.1").unwrap());
        let b = Value::Decimal(Decimal::parse("0.2").unwrap());
        let r = eval(BinOp::Add, &a, &b);
        assert_eq!(r.to_string(), "0.3");
        let r = eval(BinOp::Mul, &a, &Value::from(3));
        assert_eq!(r.to_string(), "0.3");
        let err = binary(BinOp::Add, &a, &Value::Float64(1.0), 28).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_string_concatenation() {
        let r = eval(BinOp::Add, &Value::from("n = "), &Value::from(5));
        assert_eq!(r, Value::from("n = 5"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval(BinOp::Less, &Value::from(1), &Value::Float64(1.5)), Value::Bool(true));
        assert_eq!(eval(BinOp::Cmp, &Value::from("b"), &Value::from("a")), Value::from(1));
        assert_eq!(eval(BinOp::Cmp, &Value::from(1), &Value::from(1)), Value::from(0));
        assert!(compare(&Value::from(1), &Value::from("1")).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(to_bigint(&Value::Float64(-3.9)).unwrap(), BigInt::from(-3));
        assert_eq!(to_bigint(&Value::from(" 42 ")).unwrap(), BigInt::from(42));
        assert_eq!(to_bigint(&Value::Char('A')).unwrap(), BigInt::from(65));
        assert!(to_bigint(&Value::Float64(f64::NAN)).is_err());
        assert_eq!(to_decimal(&Value::Float64(0.5)).unwrap().to_string(), "0.5");
    }
}
