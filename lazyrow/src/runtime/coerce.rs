//! Value coercions used by generated accessors.

use serde_json::Value;

use crate::RuntimeError;

/// Longest prefix of `s` (after leading whitespace) that reads as a number.
fn numeric_prefix(s: &str, fraction: bool) -> &str {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits(end);
    let mut seen_digits = int_end > end;
    end = int_end;
    if fraction {
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits(end + 1);
            if frac_end > end + 1 || seen_digits {
                seen_digits |= frac_end > end + 1;
                end = frac_end;
            }
        }
        if seen_digits && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
            let exp_end = digits(end + 1 + sign);
            if exp_end > end + 1 + sign {
                end = exp_end;
            }
        }
    }
    if seen_digits { &s[..end] } else { "" }
}

/// Integer value: numbers truncate, strings read their leading integer,
/// anything else is 0 or 1.
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| f as i64)),
        Value::String(s) => {
            let prefix = numeric_prefix(s, false);
            match prefix.parse::<i64>() {
                Ok(n) => n,
                Err(_) if prefix.is_empty() => 0,
                Err(_) if prefix.starts_with('-') => i64::MIN,
                Err(_) => i64::MAX,
            }
        }
        Value::Array(a) => i64::from(!a.is_empty()),
        Value::Object(o) => i64::from(!o.is_empty()),
    }
}

pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s, true).parse().unwrap_or(0.0),
        other => to_int(other) as f64,
    }
}

/// False for `null`, `false`, `0`, `""`, `"0"`, `"false"` in any case, and
/// empty arrays or objects.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Decodes stored JSON text. Values that are not strings are already decoded.
pub fn decode_json(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(s) => Ok(serde_json::from_str(s)?),
        other => Ok(other.clone()),
    }
}

pub fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
}
