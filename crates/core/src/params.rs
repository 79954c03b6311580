//! Helpers for pulling typed values out of a loose `serde_json::Value` params object.
//!
//! Missing keys and values of the wrong JSON type fall back to the supplied
//! default. Range checking is left to the caller (see `FieldConfig::validate`).

use serde_json::Value;

/// Reads `params[name]` as `f64`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads `params[name]` as a non-negative integer.
///
/// Negative numbers and floats fall back to `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}
