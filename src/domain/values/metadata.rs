use serde_json::{Map, Value};

/// Free-form document metadata. Values must be scalars (string, number, bool).
pub type Metadata = Map<String, Value>;

pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Rejects nested or null values, which the engine cannot index.
pub fn validate(metadata: &Metadata) -> Result<(), String> {
    match metadata.iter().find(|(_, v)| !is_scalar(v)) {
        Some((key, value)) => Err(format!(
            "metadata field '{key}' must be a string, number or bool, got {value}"
        )),
        None => Ok(()),
    }
}
