//! Shallow copy between JSON containers

use serde_json::Value;

/// Copy `src` into `dest`, one level deep.
///
/// Arrays copy index by index and `dest` ends up with the length of `src`,
/// growing or truncating as needed. Objects merge by
/// key, overwriting existing entries. An array copied into an object lands
/// under its index keys (`"0"`, `"1"`, ...). Any other pairing leaves
/// `dest` unchanged.
pub fn extend(dest: &mut Value, src: &Value) {
    match (dest, src) {
        (Value::Array(dest), Value::Array(src)) => {
            for (i, item) in src.iter().enumerate() {
                match dest.get_mut(i) {
                    Some(slot) => *slot = item.clone(),
                    None => dest.push(item.clone()),
                }
            }
            dest.truncate(src.len());
        }
        (Value::Object(dest), Value::Object(src)) => {
            for (key, value) in src {
                dest.insert(key.clone(), value.clone());
            }
        }
        (Value::Object(dest), Value::Array(src)) => {
            for (i, item) in src.iter().enumerate() {
                dest.insert(i.to_string(), item.clone());
            }
        }
        (dest, src) => {
            tracing::debug!("extend: nothing to copy from {} into {}", kind(src), kind(dest));
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
