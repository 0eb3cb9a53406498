//! Pattern matching for `match` arms, destructuring declarations and
//! `for` loop items.

use crate::arith::numeric_cmp;
use crate::error::EvalResult;
use crate::value::Value;
use std::cmp::Ordering;
use zyra_types::ast::Pattern;

/// Test `value` against `pattern`, appending the names it binds.
///
/// On a failed match `bindings` is left as it was.
pub fn match_pattern(
    pattern: &Pattern,
    value: &Value,
    bindings: &mut Vec<(String, Value)>,
) -> EvalResult<bool> {
    let mark = bindings.len();
    let matched = match_inner(pattern, value, bindings)?;
    if !matched {
        bindings.truncate(mark);
    }
    Ok(matched)
}

fn match_inner(
    pattern: &Pattern,
    value: &Value,
    bindings: &mut Vec<(String, Value)>,
) -> EvalResult<bool> {
    match pattern {
        Pattern::Wildcard(_) => Ok(true),
        Pattern::Binding(name) => {
            bindings.push((name.name.clone(), value.clone()));
            Ok(true)
        }
        Pattern::Literal(lit, _) => Ok(Value::from_literal(lit)? == *value),
        Pattern::Range {
            start,
            end,
            inclusive,
            ..
        } => {
            if !value.is_numeric() {
                return Ok(false);
            }
            let lo = Value::from_literal(start)?;
            let hi = Value::from_literal(end)?;
            let above = matches!(
                numeric_cmp(value, &lo),
                Some(Ordering::Greater | Ordering::Equal)
            );
            let below = match numeric_cmp(value, &hi) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => *inclusive,
                _ => false,
            };
            Ok(above && below)
        }
        Pattern::Tuple(items, _) => match value {
            Value::Tuple(values) if values.len() == items.len() => {
                for (p, v) in items.iter().zip(values) {
                    if !match_inner(p, v, bindings)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        },
        Pattern::Variant {
            enum_name,
            variant,
            fields,
            ..
        } => match value {
            Value::Enum(e)
                if e.variant == variant.name
                    && enum_name.as_ref().map_or(true, |n| n.name == e.type_name)
                    && (fields.is_empty() || fields.len() == e.payload.len()) =>
            {
                for (p, v) in fields.iter().zip(&e.payload) {
                    if !match_inner(p, v, bindings)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EnumValue;
    use zyra_types::build::*;

    fn matches(pattern: &Pattern, value: &Value) -> Option<Vec<(String, Value)>> {
        let mut bindings = Vec::new();
        match_pattern(pattern, value, &mut bindings)
            .unwrap()
            .then_some(bindings)
    }

    #[test]
    fn test_literal_pattern() {
        assert!(matches(&p_int(5), &Value::from(5)).is_some());
        assert!(matches(&p_int(5), &Value::from(6)).is_none());
        assert!(matches(&p_str("a"), &Value::from("a")).is_some());
    }

    #[test]
    fn test_range_pattern_bounds() {
        let exclusive = p_range(1, 10, false);
        assert!(matches(&exclusive, &Value::from(1)).is_some());
        assert!(matches(&exclusive, &Value::from(9)).is_some());
        assert!(matches(&exclusive, &Value::from(10)).is_none());
        assert!(matches(&exclusive, &Value::Float64(9.5)).is_some());
        assert!(matches(&exclusive, &Value::from("5")).is_none());

        let inclusive = p_range(1, 10, true);
        assert!(matches(&inclusive, &Value::from(10)).is_some());
    }

    #[test]
    fn test_tuple_pattern_binds() {
        let pattern = p_tuple(vec![p_bind("a"), p_wild(), p_int(3)]);
        let value = Value::Tuple(vec![Value::from(1), Value::from(2), Value::from(3)]);
        let bound = matches(&pattern, &value).unwrap();
        assert_eq!(bound, vec![("a".to_string(), Value::from(1))]);

        let wrong_len = Value::Tuple(vec![Value::from(1)]);
        assert!(matches(&pattern, &wrong_len).is_none());
    }

    #[test]
    fn test_failed_match_leaves_no_bindings() {
        let pattern = p_tuple(vec![p_bind("a"), p_int(9)]);
        let value = Value::Tuple(vec![Value::from(1), Value::from(2)]);
        let mut bindings = vec![("keep".to_string(), Value::Null)];
        assert!(!match_pattern(&pattern, &value, &mut bindings).unwrap());
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_variant_pattern() {
        let circle = Value::Enum(EnumValue {
            type_name: "Shape".into(),
            variant: "Circle".into(),
            payload: vec![Value::Float64(2.0)],
        });
        let bound = matches(&p_variant("Shape", "Circle", vec![p_bind("r")]), &circle).unwrap();
        assert_eq!(bound, vec![("r".to_string(), Value::Float64(2.0))]);
        assert!(matches(&p_variant("Shape", "Square", vec![]), &circle).is_none());
        assert!(matches(&p_variant("Other", "Circle", vec![p_wild()]), &circle).is_none());
    }
}
