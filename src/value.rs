use std::collections::HashMap;

use smol_str::SmolStr;

use crate::largetext::LargeText;

/// One parsed JSON value.
///
/// Containers do not own their children: an object carries its ordered
/// member names and an array its element count, while the children live
/// in the [`ValueTable`] under paths built from the container's own
/// path. This keeps the table free of recursive ownership.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    LargeText(LargeText),
    /// Ordered member names; members live at `<path>.<name>`.
    Object(Vec<SmolStr>),
    /// Element count; elements live at `<path>[i]` with 1-based `i`.
    Array(usize),
}

impl Value {
    /// Kind name used in error messages. The two boolean values report
    /// distinct names.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(true) => "true",
            Value::Boolean(false) => "false",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::LargeText(_) => "large-text",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Array(_))
    }
}

/// Flat mapping from path string to parsed [`Value`].
///
/// The root path is `"."`; see [`crate::path::join`] for the key
/// syntax. A table is rebuilt from scratch by each parse call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    entries: HashMap<String, Value>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: String, value: Value) {
        self.entries.insert(path, value);
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Formats a number the way the generator writes it: plain decimal
/// notation with no exponent, a digit before any decimal point, and
/// `null` for non-finite input.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value == value.trunc() && value.abs() < 9_007_199_254_740_992.0 {
        // Exactly representable integral doubles print without ryu.
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }
    let mut buffer = ryu::Buffer::new();
    let raw = buffer.format_finite(value);
    if raw.contains('e') || raw.contains('E') {
        return expand_exponent(raw);
    }
    trim_number(raw.to_string())
}

/// Rewrites ryu's scientific notation into the positional form the
/// engine always emits, shifting the decimal point by the exponent.
fn expand_exponent(raw: &str) -> String {
    let (mantissa, exponent) = match raw.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (raw, 0),
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut digits = String::with_capacity(int_digits.len() + frac_digits.len());
    digits.push_str(int_digits);
    digits.push_str(frac_digits);
    let point = int_digits.len() as i32 + exponent;

    let mut out = String::with_capacity(digits.len() + point.unsigned_abs() as usize + 3);
    if negative {
        out.push('-');
    }
    if point <= 0 {
        out.push_str("0.");
        for _ in 0..-point {
            out.push('0');
        }
        out.push_str(&digits);
    } else if point as usize >= digits.len() {
        out.push_str(&digits);
        for _ in digits.len()..point as usize {
            out.push('0');
        }
    } else {
        let (head, tail) = digits.split_at(point as usize);
        out.push_str(head);
        out.push('.');
        out.push_str(tail);
    }
    trim_number(out)
}

/// Converts to a `serde_json` number, using the integer representation
/// whenever the value is an exactly representable integral double.
pub(crate) fn json_number(value: f64) -> serde_json::Value {
    if value.is_finite() && value == value.trunc() && value.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(serde_json::Number::from(value as i64));
    }
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Drops a trailing fractional zero run (and a then-bare point), and
/// collapses any rendition of zero to plain `0`.
fn trim_number(mut value: String) -> String {
    if value.contains('.') {
        while value.ends_with('0') {
            value.pop();
        }
        if value.ends_with('.') {
            value.pop();
        }
    }
    if value.bytes().all(|b| matches!(b, b'-' | b'0' | b'.')) {
        return "0".to_string();
    }
    value
}
