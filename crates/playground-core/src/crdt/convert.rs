//! Conversion between JSON records and Loro values.
//!
//! Scalars are stored as plain map values so concurrent edits merge field by
//! field. Arrays and nested objects become child containers.

use loro::{LoroList, LoroMap, LoroResult, LoroValue};
use serde_json::{Map, Number, Value};

/// Convert a JSON scalar to a Loro value. Arrays and objects map to `Null`;
/// use [`write_field`] for those.
pub fn scalar_to_loro(value: &Value) -> LoroValue {
    match value {
        Value::Bool(b) => LoroValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => LoroValue::I64(i),
            None => LoroValue::Double(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => LoroValue::from(s.as_str()),
        Value::Null | Value::Array(_) | Value::Object(_) => LoroValue::Null,
    }
}

/// Convert a (deep) Loro value back to JSON.
pub fn loro_to_json(value: &LoroValue) -> Value {
    match value {
        LoroValue::Null => Value::Null,
        LoroValue::Bool(b) => Value::Bool(*b),
        LoroValue::I64(i) => Value::Number((*i).into()),
        LoroValue::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
        LoroValue::String(s) => Value::String(s.to_string()),
        LoroValue::List(list) => Value::Array(list.iter().map(loro_to_json).collect()),
        LoroValue::Map(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.to_string(), loro_to_json(value)))
                .collect(),
        ),
        // Binary payloads and unresolved container ids have no JSON form.
        _ => Value::Null,
    }
}

/// Convert a deep Loro map value to a JSON object.
pub fn loro_to_object(value: &LoroValue) -> Option<Map<String, Value>> {
    match loro_to_json(value) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Write one field into a Loro map, replacing what was there.
pub fn write_field(map: &LoroMap, key: &str, value: &Value) -> LoroResult<()> {
    match value {
        Value::Array(items) => {
            let list = map.insert_container(key, LoroList::new())?;
            for item in items {
                push_item(&list, item)?;
            }
        }
        Value::Object(fields) => {
            let child = map.insert_container(key, LoroMap::new())?;
            for (k, v) in fields {
                write_field(&child, k, v)?;
            }
        }
        scalar => map.insert(key, scalar_to_loro(scalar))?,
    }
    Ok(())
}

/// Append one item to a Loro list.
pub fn push_item(list: &LoroList, value: &Value) -> LoroResult<()> {
    match value {
        Value::Array(items) => {
            let child = list.insert_container(list.len(), LoroList::new())?;
            for item in items {
                push_item(&child, item)?;
            }
        }
        Value::Object(fields) => {
            let child = list.insert_container(list.len(), LoroMap::new())?;
            for (k, v) in fields {
                write_field(&child, k, v)?;
            }
        }
        scalar => list.push(scalar_to_loro(scalar))?,
    }
    Ok(())
}
