//! Query-string codec

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Join `key=value` pairs with `separator`, skipping falsy values
/// (`null`, `false`, `0`, `""`). Keys and values are percent-encoded
/// unless `encode` is false.
pub fn kvjoin(params: &Map<String, Value>, separator: &str, encode: bool) -> String {
    params
        .iter()
        .filter(|(_, value)| is_truthy(value))
        .map(|(key, value)| {
            let value = render(value);
            if encode {
                format!("{}={}", utf8_percent_encode(key, COMPONENT), utf8_percent_encode(&value, COMPONENT))
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// `kvjoin` with `&` and encoding on
pub fn kvjoin_default(params: &Map<String, Value>) -> String {
    kvjoin(params, "&", true)
}

/// Append `params` to `base` as a query string
pub fn urlcat(base: &str, params: &Map<String, Value>) -> String {
    let joiner = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, joiner, kvjoin_default(params))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
