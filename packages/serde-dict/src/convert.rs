//! Conversions between Value and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use datadict_core::{DataDict, Error, Source, Value};

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let json = value_to_json(value)?;
    serde_json::from_value(json).map_err(|e| Error::other(format!("decode: {}", e)))
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::other(format!("encode: {}", e)))?;
    Ok(json_to_value(json))
}

/// The serialized fields of `data`, ready to seed a container.
///
/// `data` must serialize to a map (a struct or a map type).
pub fn fields_of<T: Serialize + ?Sized>(data: &T) -> Result<Source<'static>, Error> {
    match to_value(data)? {
        Value::Map(fields) => Ok(Source::Fields(fields)),
        other => Err(Error::Type {
            expected: "dict",
            found: other.type_name(),
        }),
    }
}

/// Resolved view of a container as JSON: every key, read through `get`.
pub fn snapshot(dict: &DataDict) -> Result<serde_json::Value, Error> {
    let mut map = serde_json::Map::new();
    for item in dict.items() {
        let (key, value) = item?;
        map.insert(key, value_to_json(value)?);
    }
    Ok(serde_json::Value::Object(map))
}

/// Convert our Value to serde_json::Value.
///
/// Objects have no data form and are rejected; non-finite floats become null.
pub fn value_to_json(value: Value) -> Result<serde_json::Value, Error> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(
            arr.into_iter()
                .map(value_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| Ok((k, value_to_json(v)?)))
                .collect::<Result<_, Error>>()?,
        ),
        Value::Object(o) => {
            return Err(Error::Type {
                expected: "plain data",
                found: o.type_name(),
            })
        }
    })
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}
