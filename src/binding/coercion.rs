// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Loose value coercion for resolved binding parameters.
//!
//! Block state arrives as untyped JSON, so parameters are converted to the
//! action's declared type with the same loose rules a browser would apply:
//! `"42"` becomes `42`, `"TRUE"` becomes `true`, `7` becomes `"7"`. Numbers
//! that do not survive conversion become `null`.

use crate::assembly::ValueType;
use serde_json::{Number, Value};

/// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn coerce(value: Option<Value>, target: ValueType) -> Option<Value> {
    let value = value?;
    Some(match target {
        ValueType::Number => match value {
            Value::Number(_) => value,
            other => number_value(to_number(&other)),
        },
        ValueType::Boolean => match &value {
            Value::String(s) => Value::Bool(s.to_lowercase() == "true"),
            other => Value::Bool(is_truthy(other)),
        },
        ValueType::String => match value {
            Value::String(_) => value,
            other => Value::String(to_display_string(&other)),
        },
        _ => value,
    })
}

/// Numeric value of `value`; `NaN` when it has none.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [_] => parse_number(&to_display_string(value)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of `value` as it would be interpolated into text.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whole numbers keep an integer JSON representation; non-finite results are `null`.
pub fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
    }

    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}
