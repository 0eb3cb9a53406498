//! Built-in functions and the output sink.
//!
//! Built-ins are ordinary [`NativeFn`] values bound in the root frame, so a
//! program can shadow them in inner scopes.

use crate::arith::{to_bigint, to_decimal, to_f64};
use crate::env::{Binding, Frame};
use crate::error::{EvalError, EvalResult};
use crate::value::{NativeFn, Value};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use zyra_types::IntType;

// ══════════════════════════════════════════════════════════════════════════════
// Output
// ══════════════════════════════════════════════════════════════════════════════

/// Captured program output.
#[derive(Debug, Default)]
pub struct Output {
    buffer: String,
    echo: bool,
}

impl Output {
    pub fn new(echo: bool) -> Self {
        Self {
            buffer: String::new(),
            echo,
        }
    }

    pub fn write(&mut self, text: &str) {
        if self.echo {
            print!("{text}");
        }
        self.buffer.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Registration
// ══════════════════════════════════════════════════════════════════════════════

/// Bind every built-in in `frame`.
pub fn install(frame: &Frame) {
    let define = |native: NativeFn| {
        let name = native.name.clone();
        frame.insert(&name, Binding::new(Value::Native(native), false, None));
    };

    define(NativeFn::new("print", |out, args| {
        let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        out.write(&parts.join(" "));
        out.write("\n");
        Ok(Value::Null)
    }));
    define(NativeFn::new("printf", |out, args| {
        let (fmt, rest) = match args.split_first() {
            Some((Value::String(fmt), rest)) => (fmt, rest),
            _ => {
                return Err(EvalError::TypeMismatch(
                    "printf expects a format string as its first argument".into(),
                ))
            }
        };
        let text = format_printf(fmt, rest)?;
        out.write(&text);
        Ok(Value::Null)
    }));

    for ty in IntType::ALL {
        define(NativeFn::new(ty.name(), move |_, args| {
            let arg = single(ty.name(), &args)?;
            Ok(Value::int(to_bigint(arg)?, ty))
        }));
    }
    define(NativeFn::new("bigint", |_, args| {
        Ok(Value::BigInt(to_bigint(single("bigint", &args)?)?))
    }));
    define(NativeFn::new("float32", |_, args| {
        Ok(Value::Float32(to_f64(single("float32", &args)?)? as f32))
    }));
    for name in ["float64", "float"] {
        define(NativeFn::new(name, move |_, args| {
            Ok(Value::Float64(to_f64(single(name, &args)?)?))
        }));
    }
    define(NativeFn::new("decimal", |_, args| {
        Ok(Value::Decimal(to_decimal(single("decimal", &args)?)?))
    }));

    define(NativeFn::new("len", |_, args| {
        let n = match single("len", &args)? {
            Value::String(s) => BigInt::from(s.chars().count()),
            Value::Array(items) | Value::Tuple(items) | Value::Set(items) => {
                BigInt::from(items.len())
            }
            Value::Dict(entries) => BigInt::from(entries.len()),
            Value::Range(r) => r.len(),
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "len() is not defined for {}",
                    other.type_name()
                )))
            }
        };
        Ok(Value::int(n, IntType::DEFAULT))
    }));
    define(NativeFn::new("type_of", |_, args| {
        Ok(Value::String(single("type_of", &args)?.type_name().to_string()))
    }));
    define(NativeFn::new("str", |_, args| {
        Ok(Value::String(single("str", &args)?.to_string()))
    }));
}

fn single<'a>(name: &str, args: &'a [Value]) -> EvalResult<&'a Value> {
    match args {
        [arg] => Ok(arg),
        _ => Err(EvalError::ArityMismatch(format!(
            "{name}() takes 1 argument, got {}",
            args.len()
        ))),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// printf
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
}

impl Spec {
    fn pad(&self, body: String) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let fill = self.width - len;
        if self.left {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero {
            // zeros go after any sign
            let (sign, digits) = match body.strip_prefix(['-', '+', ' ']) {
                Some(rest) => (&body[..1], rest),
                None => ("", body.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }
}

fn radix_digits(n: &BigInt, radix: u32, upper: bool) -> String {
    let digits = n.abs().to_str_radix(radix);
    if upper {
        digits.to_uppercase()
    } else {
        digits
    }
}

/// C-style formatting: `%d %i %u %s %f %e %x %X %o %b %c %%` with
/// `-`, `0`, `+`, space and `#` flags, width and precision.
pub fn format_printf(fmt: &str, args: &[Value]) -> EvalResult<String> {
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    let mut next_arg = args.iter();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.alt = true,
                _ => break,
            }
            chars.next();
        }
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            spec.width = spec.width * 10 + d as usize;
            chars.next();
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut precision = 0;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                precision = precision * 10 + d as usize;
                chars.next();
            }
            spec.precision = Some(precision);
        }

        let conv = chars.next().ok_or_else(|| {
            EvalError::Runtime("printf format ends in the middle of a conversion".into())
        })?;
        if conv == '%' {
            out.push('%');
            continue;
        }
        let arg = next_arg.next().ok_or_else(|| {
            EvalError::ArityMismatch(format!("printf: no argument for '%{conv}'"))
        })?;

        let body = match conv {
            'd' | 'i' | 'u' => {
                let n = to_bigint(arg)?;
                format!("{}{}", spec.sign(n.is_negative()), n.abs())
            }
            'x' | 'X' | 'o' | 'b' => {
                let n = to_bigint(arg)?;
                let (radix, prefix) = match conv {
                    'x' => (16, "0x"),
                    'X' => (16, "0X"),
                    'o' => (8, "0o"),
                    _ => (2, "0b"),
                };
                let prefix = if spec.alt { prefix } else { "" };
                format!(
                    "{}{prefix}{}",
                    spec.sign(n.is_negative()),
                    radix_digits(&n, radix, conv == 'X')
                )
            }
            'f' | 'F' => {
                let x = to_f64(arg)?;
                let precision = spec.precision.unwrap_or(6);
                format!("{}{:.*}", spec.sign(x.is_sign_negative() && x != 0.0), precision, x.abs())
            }
            'e' | 'E' => {
                let x = to_f64(arg)?;
                let precision = spec.precision.unwrap_or(6);
                let text = format!("{:.*e}", precision, x.abs());
                let text = if conv == 'E' { text.to_uppercase() } else { text };
                format!("{}{text}", spec.sign(x.is_sign_negative() && x != 0.0))
            }
            's' => {
                let text = arg.to_string();
                match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
            'c' => match arg {
                Value::Char(c) => c.to_string(),
                Value::String(s) if s.chars().count() == 1 => s.clone(),
                other => {
                    let code = to_bigint(other)?
                        .to_u32()
                        .and_then(char::from_u32)
                        .ok_or_else(|| {
                            EvalError::TypeMismatch(format!("printf: {other} is not a character"))
                        })?;
                    code.to_string()
                }
            },
            other => {
                return Err(EvalError::Runtime(format!(
                    "printf: unknown conversion '%{other}'"
                )))
            }
        };
        out.push_str(&spec.pad(body));
    }

    Ok(out)
}
