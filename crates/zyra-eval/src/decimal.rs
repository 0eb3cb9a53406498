//! Arbitrary-precision decimal numbers.
//!
//! A value is `mantissa × 10^-scale`. Addition, subtraction and
//! multiplication are exact; division rounds half-to-even to a configurable
//! number of significant digits.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

fn digit_count(n: &BigInt) -> u32 {
    if n.is_zero() {
        0
    } else {
        n.abs().to_string().len() as u32
    }
}

impl Decimal {
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn from_int(n: &BigInt) -> Self {
        Self::new(n.clone(), 0)
    }

    /// Parse `-12.340`, `.5`, `7`, or `1.5e3`. Trailing zeros are kept.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (body, exponent) = match text.find(['e', 'E']) {
            Some(i) => (&text[..i], text[i + 1..].parse::<i64>().ok()?),
            None => (text, 0),
        };
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body.strip_prefix('+').unwrap_or(body)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let mut mantissa: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
        let mut scale = frac_part.len() as i64 - exponent;
        if scale < 0 {
            mantissa *= pow10(u32::try_from(-scale).ok()?);
            scale = 0;
        }
        if negative {
            mantissa = -mantissa;
        }
        Some(Self::new(mantissa, u32::try_from(scale).ok()?))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::parse(&value.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Integer part, truncated toward zero.
    pub fn trunc(&self) -> BigInt {
        &self.mantissa / pow10(self.scale)
    }

    /// Both mantissas rescaled to the larger scale.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        (
            &self.mantissa * pow10(scale - self.scale),
            &other.mantissa * pow10(scale - other.scale),
            scale,
        )
    }

    fn normalized(mut self) -> Self {
        let ten = BigInt::from(10u32);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa /= &ten;
            self.scale -= 1;
        }
        self
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a + b, scale)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a - b, scale)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::new(&self.mantissa * &other.mantissa, self.scale + other.scale)
    }

    pub fn neg(&self) -> Self {
        Self::new(-&self.mantissa, self.scale)
    }

    /// `None` when the result would be too large to represent.
    pub fn pow(&self, exponent: u32) -> Option<Self> {
        if !crate::arith::pow_fits(&self.mantissa, exponent) {
            return None;
        }
        let scale = self.scale.checked_mul(exponent)?;
        Some(Self::new(self.mantissa.pow(exponent), scale))
    }

    /// `None` when dividing by zero.
    pub fn div(&self, other: &Self, precision: u32) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let num = &self.mantissa * pow10(other.scale);
        let den = &other.mantissa * pow10(self.scale);
        if num.is_zero() {
            return Some(Self::new(BigInt::zero(), 0));
        }

        let int_digits = digit_count(&(num.abs() / den.abs()));
        let scale = if int_digits > 0 {
            precision.saturating_sub(int_digits)
        } else {
            // leading zeros after the point are not significant
            let mut n = num.abs();
            let d = den.abs();
            let mut shift = 0u32;
            while n < d {
                n *= 10u32;
                shift += 1;
            }
            precision + shift - 1
        };

        let scaled = &num * pow10(scale);
        let (quotient, remainder) = scaled.div_rem(&den);
        let step = if scaled.is_negative() == den.is_negative() {
            BigInt::from(1)
        } else {
            BigInt::from(-1)
        };
        let quotient = match (remainder.abs() * 2u32).cmp(&den.abs()) {
            Ordering::Greater => quotient + step,
            Ordering::Equal if quotient.is_odd() => quotient + step,
            _ => quotient,
        };
        Some(Self::new(quotient, scale).normalized())
    }

    /// Quotient rounded toward negative infinity.
    pub fn floor_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let (a, b, _) = self.aligned(other);
        Some(Self::new(a.div_floor(&b), 0))
    }

    /// Remainder with the sign of the dividend.
    pub fn rem(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let (a, b, scale) = self.aligned(other);
        Some(Self::new(a % b, scale))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        if self.mantissa.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{int_part}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> Decimal {
        Decimal::parse(text).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(d("12.340").to_string(), "12.340");
        assert_eq!(d("-0.05").to_string(), "-0.05");
        assert_eq!(d(".5").to_string(), "0.5");
        assert_eq!(d("1.5e3").to_string(), "1500");
        assert_eq!(d("7").to_string(), "7");
        assert!(Decimal::parse("1.2.3").is_none());
        assert!(Decimal::parse("").is_none());
    }

    #[test]
    fn test_exact_addition() {
        assert_eq!(d("0.1").add(&d("0.2")), d("0.3"));
        assert_eq!(d("0.1").add(&d("0.2")).to_string(), "0.3");
        assert_eq!(d("1.10").add(&d("2")).to_string(), "3.10");
    }

    #[test]
    fn test_multiplication_scale() {
        assert_eq!(d("1.5").mul(&d("0.25")).to_string(), "0.375");
    }

    #[test]
    fn test_division() {
        assert_eq!(d("1").div(&d("4"), 28).unwrap().to_string(), "0.25");
        assert_eq!(d("10").div(&d("2"), 28).unwrap().to_string(), "5");
        assert_eq!(
            d("1").div(&d("3"), 28).unwrap().to_string(),
            "0.3333333333333333333333333333"
        );
        assert_eq!(
            d("2").div(&d("3"), 28).unwrap().to_string(),
            "0.6666666666666666666666666667"
        );
        assert!(d("1").div(&d("0.00"), 28).is_none());
    }

    #[test]
    fn test_floor_div_and_rem() {
        assert_eq!(d("-7").floor_div(&d("2")).unwrap(), d("-4"));
        assert_eq!(d("-7").rem(&d("2")).unwrap(), d("-1"));
        assert_eq!(d("7.5").rem(&d("2")).unwrap(), d("1.5"));
    }

    #[test]
    fn test_ordering_ignores_scale() {
        assert_eq!(d("1.0"), d("1"));
        assert!(d("1.01") > d("1.001"));
        assert!(d("-2") < d("-1.5"));
    }

    #[test]
    fn test_trunc() {
        assert_eq!(d("-3.99").trunc(), BigInt::from(-3));
        assert_eq!(d("3.99").trunc(), BigInt::from(3));
    }
}
