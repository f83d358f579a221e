//! Decoding of the `values` form field into a [`ValueMap`].

use serde_json::Value;

use crate::errors::AppError;
use crate::template::ValueMap;

/// Parses the JSON-encoded value mapping sent with a form.
///
/// An absent or blank field, or JSON `null`, is an empty mapping. Anything
/// other than a JSON object is rejected.
pub fn parse_values(raw: Option<&str>) -> Result<ValueMap, AppError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(ValueMap::new()),
        Some(raw) => raw,
    };

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid values JSON: {e}")))?;

    match parsed {
        Value::Null => Ok(ValueMap::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, coerce(&value)))
            .collect()),
        _ => Err(AppError::Validation(
            "Invalid values JSON: expected an object of variable names to values".to_string(),
        )),
    }
}

/// String form of a submitted value. Falsy values (`null`, `false`, `0`,
/// `""`) become the empty string and get padded like a missing value.
fn coerce(value: &Value) -> String {
    if is_falsy(value) {
        return String::new();
    }
    display(value)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Script-style stringification: integral numbers print without a fraction,
/// arrays join their items with `,` (null items empty), objects are opaque.
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{:.0}", f + 0.0)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
