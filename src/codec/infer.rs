//! Scalar type inference for response field text.
//!
//! Decision order is boolean, float, integer, string. A value like `"10"`
//! is an integer, never a float, and a bit sent as `0`/`1` stays an
//! integer; see [`TypedValue::as_flag`] for reading flags explicitly.

use crate::models::TypedValue;

/// Infer the scalar type of a raw field value. Never fails.
pub fn infer(raw: &str) -> TypedValue {
    if let Some(b) = parse_bool(raw) {
        return TypedValue::Boolean(b);
    }
    if is_decimal(raw) {
        if let Ok(x) = raw.parse::<f64>() {
            return TypedValue::Float(x);
        }
    }
    if is_integer(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return TypedValue::Integer(i);
        }
    }
    TypedValue::String(raw.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn strip_sign(raw: &str) -> &str {
    raw.strip_prefix(['-', '+']).unwrap_or(raw)
}

/// Optional sign, digits, exactly one `.`, at least one digit overall.
fn is_decimal(raw: &str) -> bool {
    let body = strip_sign(raw);
    let mut dots = 0;
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '.' => dots += 1,
            '0'..='9' => digits += 1,
            _ => return false,
        }
    }
    dots == 1 && digits > 0
}

/// Optional sign followed by one or more ASCII digits.
fn is_integer(raw: &str) -> bool {
    let body = strip_sign(raw);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}
