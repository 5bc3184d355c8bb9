//! Metadata `where` evaluation for the in-process engine.

use crate::domain::values::metadata::Metadata;
use serde_json::Value;
use std::cmp::Ordering;

/// Whether `metadata` satisfies `filter`. Unknown operators are errors.
pub fn matches(filter: &Value, metadata: &Metadata) -> Result<bool, String> {
    let Value::Object(clauses) = filter else {
        return Err(format!("where filter must be an object, got {filter}"));
    };
    for (key, condition) in clauses {
        let ok = match key.as_str() {
            "$and" => all_of(condition, metadata)?,
            "$or" => any_of(condition, metadata)?,
            field => field_matches(metadata.get(field), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters(condition: &Value) -> Result<&Vec<Value>, String> {
    condition
        .as_array()
        .ok_or_else(|| format!("$and/$or expects a list, got {condition}"))
}

fn all_of(condition: &Value, metadata: &Metadata) -> Result<bool, String> {
    for f in sub_filters(condition)? {
        if !matches(f, metadata)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_of(condition: &Value, metadata: &Metadata) -> Result<bool, String> {
    for f in sub_filters(condition)? {
        if matches(f, metadata)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> Result<bool, String> {
    let Value::Object(ops) = condition else {
        return Ok(actual == Some(condition));
    };
    for (op, expected) in ops {
        let ok = match op.as_str() {
            "$eq" => actual == Some(expected),
            "$ne" => actual != Some(expected),
            "$gt" => compare(actual, expected) == Some(Ordering::Greater),
            "$gte" => matches!(compare(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
            "$lt" => compare(actual, expected) == Some(Ordering::Less),
            "$lte" => matches!(compare(actual, expected), Some(Ordering::Less | Ordering::Equal)),
            "$in" => list(op, expected)?.iter().any(|v| actual == Some(v)),
            "$nin" => !list(op, expected)?.iter().any(|v| actual == Some(v)),
            other => return Err(format!("unsupported where operator {other}")),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn list<'a>(op: &str, expected: &'a Value) -> Result<&'a Vec<Value>, String> {
    expected
        .as_array()
        .ok_or_else(|| format!("{op} expects a list, got {expected}"))
}

/// Range operators only order numbers.
fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    actual?.as_f64()?.partial_cmp(&expected.as_f64()?)
}
