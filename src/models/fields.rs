//! Field shaping shared by every content type.

use serde_json::{Number, Value};

/// Overwrite `slot` when the request carried a value for it.
pub fn merge_field<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Zero for amount fields.
pub fn zero() -> Number {
    Number::from(0)
}

/// Coerce a submitted amount to a non-negative number.
///
/// Numbers pass through, numeric strings are parsed; anything else (and any
/// negative or non-finite value) becomes zero.
pub fn coerce_amount(value: &Value) -> Number {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() && n > 0.0 => {
            if n.fract() == 0.0 && n <= i64::MAX as f64 {
                Number::from(n as i64)
            } else {
                Number::from_f64(n).unwrap_or_else(zero)
            }
        }
        _ => zero(),
    }
}

/// Normalize a submitted image list: non-arrays become empty, blank or
/// non-string entries are dropped.
pub fn normalize_images(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Image list for a new record: the given list, else the single legacy image, else empty.
pub fn initial_images(images: Option<&Value>, image: Option<&str>) -> Vec<String> {
    match (images, image) {
        (Some(list @ Value::Array(_)), _) => normalize_images(list),
        (_, Some(single)) if !single.is_empty() => vec![single.to_string()],
        _ => Vec::new(),
    }
}

/// Image list after an update.
///
/// A submitted list replaces the stored one entirely. Without one the stored
/// list is kept, falling back to the legacy single image.
pub fn merged_images(
    existing: Option<Vec<String>>,
    legacy: Option<&str>,
    submitted: Option<&Value>,
) -> Vec<String> {
    match submitted {
        Some(value) => normalize_images(value),
        None => existing.unwrap_or_else(|| {
            legacy
                .filter(|s| !s.is_empty())
                .map(|s| vec![s.to_string()])
                .unwrap_or_default()
        }),
    }
}
