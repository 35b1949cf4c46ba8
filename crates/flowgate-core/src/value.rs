//! Coercion and equality between JSON values.
//!
//! Mapping predicates compare the value found at a key path against an
//! expected value. Depending on strictness and on whether both sides are
//! structured, the comparison is one of:
//!
//! | Strict | Both structured | Comparison |
//! |--------|-----------------|------------|
//! | yes | yes | [`serialized_eq`] (object key order matters) |
//! | no | yes | [`semantic_eq`] (key order does not matter) |
//! | yes | no | [`strict_eq`] |
//! | no | no | [`coerce`] to the expected kind, then compare |
//!
//! Coercion follows the usual dynamic-language conversions: `"5"` becomes
//! `5`, `""` becomes `0`, any non-empty string is `true`, and so on.

use crate::error::{DispatchError, DispatchResult};
use serde_json::{Number, Value};

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Returns `true` for objects, arrays and `null`.
///
/// `null` counts as structured because dynamically typed hosts report it as
/// an object.
#[must_use]
pub fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
}

/// Host truthiness of a value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The presence rule used by key-path predicates.
///
/// A path fails only when nothing was found (`None` or `null`) or when the
/// value is exactly `false`. `0`, `""` and empty structures pass.
#[must_use]
pub fn is_present(found: Option<&Value>) -> bool {
    match found {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(_) => true,
    }
}

/// Compares two values by their serialized JSON text.
///
/// Object key order is significant.
#[must_use]
pub fn serialized_eq(left: &Value, right: &Value) -> bool {
    left.to_string() == right.to_string()
}

/// Deep semantic equality.
///
/// Objects compare by key set regardless of order, arrays element-wise, and
/// numbers by numeric value (`1` equals `1.0`).
#[must_use]
pub fn semantic_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, lv)| r.get(key).is_some_and(|rv| semantic_eq(lv, rv)))
        }
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(lv, rv)| semantic_eq(lv, rv))
        }
        _ => strict_eq(left, right),
    }
}

/// Strict equality between scalars.
///
/// Values of different kinds are never equal. Structured values are never
/// strictly equal to anything but `null` to `null`, since they have no
/// identity to share once deserialized.
#[must_use]
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => numbers_eq(l, r),
        _ => false,
    }
}

fn numbers_eq(left: &Number, right: &Number) -> bool {
    match (as_i128(left), as_i128(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left.as_f64() == right.as_f64(),
    }
}

fn as_i128(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

/// The kind a value is coerced to before a non-strict comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionTarget {
    /// Text.
    String,
    /// Double-precision number.
    Number,
    /// Arbitrary integer; integral expected values beyond
    /// [`MAX_SAFE_INTEGER`] in magnitude.
    BigInt,
    /// Boolean.
    Boolean,
}

impl CoercionTarget {
    /// Picks the target for an expected value.
    ///
    /// Returns [`DispatchError::InvalidType`] for arrays, objects and `null`.
    pub fn for_expected(expected: &Value, path: &str) -> DispatchResult<Self> {
        match expected {
            Value::String(_) => Ok(Self::String),
            Value::Bool(_) => Ok(Self::Boolean),
            Value::Number(n) => match as_i128(n) {
                Some(i) if i.unsigned_abs() > u128::from(MAX_SAFE_INTEGER) => Ok(Self::BigInt),
                _ => Ok(Self::Number),
            },
            Value::Null => Err(DispatchError::invalid_type(path, "null")),
            Value::Array(_) => Err(DispatchError::invalid_type(path, "array")),
            Value::Object(_) => Err(DispatchError::invalid_type(path, "object")),
        }
    }
}

/// A value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Coerced to text.
    String(String),
    /// Coerced to a number; may be NaN.
    Number(f64),
    /// Coerced to a big integer.
    BigInt(i128),
    /// Coerced to a boolean.
    Boolean(bool),
}

impl Coerced {
    /// Strict equality against the expected value.
    #[must_use]
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (Self::String(s), Value::String(e)) => s == e,
            (Self::Number(n), Value::Number(e)) => e.as_f64() == Some(*n),
            (Self::BigInt(n), Value::Number(e)) => as_i128(e) == Some(*n),
            (Self::Boolean(b), Value::Bool(e)) => b == e,
            _ => false,
        }
    }
}

/// Coerces `value` to `target`.
///
/// Only big-integer coercion can fail, when the value is not integral.
pub fn coerce(value: &Value, target: CoercionTarget, path: &str) -> DispatchResult<Coerced> {
    match target {
        CoercionTarget::String => Ok(Coerced::String(to_text(value))),
        CoercionTarget::Number => Ok(Coerced::Number(to_number(value))),
        CoercionTarget::Boolean => Ok(Coerced::Boolean(is_truthy(value))),
        CoercionTarget::BigInt => to_bigint(value)
            .map(Coerced::BigInt)
            .ok_or_else(|| DispatchError::coercion(path, value.to_string())),
    }
}

/// Converts a value to text the way string conversion does in dynamic hosts.
#[must_use]
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_string(number: &Number) -> String {
    if let Some(i) = as_i128(number) {
        return i.to_string();
    }
    let f = number.as_f64().unwrap_or(f64::NAN);
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        // Also folds -0 into "0".
        format!("{}", f as i128)
    } else {
        float_to_string(f)
    }
}

/// Shortest round-trip digits, in exponent form (`1e-7`, `1e+21`) when the
/// decimal exponent is below -6 or above 20.
fn float_to_string(f: f64) -> String {
    let scientific = format!("{:e}", f.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{f}");
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-6..21).contains(&exponent) {
        return format!("{f}");
    }

    let sign = if f < 0.0 { "-" } else { "" };
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exponent_sign}{}", exponent.unsigned_abs())
}

/// Converts a value to a number; unparseable input yields NaN.
#[must_use]
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn string_to_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = strip_prefix_ignore_case(trimmed, prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }

    // Rust accepts "inf" and "nan"; the host does not.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
        .filter(|digits| !digits.is_empty())
}

fn to_bigint(value: &Value) -> Option<i128> {
    match value {
        Value::Bool(b) => Some(i128::from(*b)),
        Value::Number(n) => as_i128(n).or_else(|| {
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e37).then_some(f as i128)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0);
            }
            for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
                if let Some(digits) = strip_prefix_ignore_case(trimmed, prefix) {
                    return i128::from_str_radix(digits, radix).ok();
                }
            }
            trimmed.parse().ok()
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence_rule() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&Value::Null)));
        assert!(!is_present(Some(&json!(false))));
        assert!(is_present(Some(&json!(true))));
        assert!(is_present(Some(&json!(0))));
        assert!(is_present(Some(&json!(""))));
        assert!(is_present(Some(&json!({}))));
        assert!(is_present(Some(&json!([]))));
    }

    #[test]
    fn test_serialized_eq_is_order_sensitive() {
        let left: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let right: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert!(!serialized_eq(&left, &right));
        assert!(serialized_eq(&left, &left.clone()));
    }

    #[test]
    fn test_semantic_eq_ignores_key_order() {
        let left: Value = serde_json::from_str(r#"{"a":1,"b":[1,{"c":true}]}"#).unwrap();
        let right: Value = serde_json::from_str(r#"{"b":[1,{"c":true}],"a":1.0}"#).unwrap();
        assert!(semantic_eq(&left, &right));
        assert!(!semantic_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(!semantic_eq(&json!({ "a": 1 }), &json!({ "a": 1, "b": 2 })));
    }

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(&json!(5), &json!(5.0)));
        assert!(!strict_eq(&json!("5"), &json!(5)));
        assert!(!strict_eq(&json!(true), &json!(1)));
        assert!(!strict_eq(&json!({}), &json!("{}")));
    }

    #[test]
    fn test_target_for_expected() {
        assert_eq!(
            CoercionTarget::for_expected(&json!("x"), "p").unwrap(),
            CoercionTarget::String
        );
        assert_eq!(
            CoercionTarget::for_expected(&json!(5), "p").unwrap(),
            CoercionTarget::Number
        );
        assert_eq!(
            CoercionTarget::for_expected(&json!(9_007_199_254_740_993_u64), "p").unwrap(),
            CoercionTarget::BigInt
        );
        assert_eq!(
            CoercionTarget::for_expected(&json!(false), "p").unwrap(),
            CoercionTarget::Boolean
        );
        assert_eq!(
            CoercionTarget::for_expected(&json!([1]), "p").unwrap_err(),
            DispatchError::invalid_type("p", "array")
        );
        assert!(CoercionTarget::for_expected(&Value::Null, "p").is_err());
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(to_number(&json!("5")), 5.0);
        assert_eq!(to_number(&json!("  -2.5 ")), -2.5);
        assert_eq!(to_number(&json!("")), 0.0);
        assert_eq!(to_number(&json!("0x1A")), 26.0);
        assert_eq!(to_number(&json!("1e3")), 1000.0);
        assert_eq!(to_number(&json!("Infinity")), f64::INFINITY);
        assert!(to_number(&json!("inf")).is_nan());
        assert!(to_number(&json!("abc")).is_nan());
        assert!(to_number(&json!({ "a": 1 })).is_nan());
        assert_eq!(to_number(&json!(true)), 1.0);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!(5)), "5");
        assert_eq!(to_text(&json!(5.0)), "5");
        assert_eq!(to_text(&json!(2.5)), "2.5");
        assert_eq!(to_text(&json!(true)), "true");
        assert_eq!(to_text(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_text(&json!({ "a": 1 })), "[object Object]");
    }

    #[test]
    fn test_to_text_exponent_form() {
        assert_eq!(to_text(&json!(1e-7)), "1e-7");
        assert_eq!(to_text(&json!(1.5e-10)), "1.5e-10");
        assert_eq!(to_text(&json!(-2.5e-8)), "-2.5e-8");
        assert_eq!(to_text(&json!(1e21)), "1e+21");
        assert_eq!(to_text(&json!(1.25e22)), "1.25e+22");
        assert_eq!(to_text(&json!(0.000001)), "0.000001");
        assert_eq!(to_text(&json!(1e20)), "100000000000000000000");
        assert_eq!(to_text(&json!(123.456)), "123.456");

        let coerced = coerce(&json!(1e-7), CoercionTarget::String, "p").unwrap();
        assert!(coerced.matches(&json!("1e-7")));
    }

    #[test]
    fn test_coerce_and_match() {
        let coerced = coerce(&json!("5"), CoercionTarget::Number, "n").unwrap();
        assert!(coerced.matches(&json!(5)));

        let coerced = coerce(&json!(42), CoercionTarget::String, "s").unwrap();
        assert!(coerced.matches(&json!("42")));

        let coerced = coerce(&json!("yes"), CoercionTarget::Boolean, "b").unwrap();
        assert!(coerced.matches(&json!(true)));

        let coerced = coerce(&json!(0), CoercionTarget::Boolean, "b").unwrap();
        assert!(coerced.matches(&json!(false)));

        let coerced = coerce(&json!("abc"), CoercionTarget::Number, "n").unwrap();
        assert!(!coerced.matches(&json!(0)));
    }

    #[test]
    fn test_bigint_coercion() {
        let expected = json!(9_007_199_254_740_993_u64);
        let coerced = coerce(&json!("9007199254740993"), CoercionTarget::BigInt, "id").unwrap();
        assert!(coerced.matches(&expected));

        let err = coerce(&json!("1.5"), CoercionTarget::BigInt, "id").unwrap_err();
        assert_eq!(err, DispatchError::coercion("id", "\"1.5\""));
    }
}
