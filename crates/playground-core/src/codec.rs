//! Conversion between canvas shapes and shared-document records.
//!
//! A record is the shape's own serialization with two extra fields stamped
//! on: `objectId` (the map key) and `type`. Decoding validates required
//! geometry before rebuilding the shape so partially written or legacy
//! records are rejected instead of producing a broken object.

use crate::shapes::{ObjectId, Shape, ShapeKind};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field carrying the stable identifier.
pub const OBJECT_ID_FIELD: &str = "objectId";
/// Field carrying the type discriminator.
pub const TYPE_FIELD: &str = "type";

/// Errors produced while decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("record is not an object")]
    NotAnObject,
    #[error("record has no type")]
    MissingType,
    #[error("unknown shape type: {0}")]
    UnknownType(String),
    #[error("invalid object id: {0}")]
    InvalidId(String),
    #[error("object id {found} does not match key {key}")]
    IdMismatch { key: String, found: String },
    #[error("{kind} record is missing field `{field}`")]
    MissingField { kind: ShapeKind, field: &'static str },
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A stored shape record, keyed by its object id.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSnapshot {
    pub object_id: ObjectId,
    pub kind: ShapeKind,
    /// Serialized shape fields, including `type`.
    pub fields: Map<String, Value>,
}

impl ShapeSnapshot {
    /// The record as written to the shared document.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = self.fields.clone();
        record.insert(OBJECT_ID_FIELD.to_string(), Value::String(self.object_id.to_string()));
        record.insert(TYPE_FIELD.to_string(), Value::String(self.kind.type_name().to_string()));
        record
    }

    /// Parse a stored record found under `key`.
    pub fn from_record(key: &str, value: &Value) -> Result<Self, CodecError> {
        let Value::Object(fields) = value else {
            return Err(CodecError::NotAnObject);
        };
        // Keys must be canonical so lookups by `id.to_string()` find them.
        let object_id = key
            .parse::<ObjectId>()
            .ok()
            .filter(|id| id.to_string() == key)
            .ok_or_else(|| CodecError::InvalidId(key.to_string()))?;
        if let Some(found) = fields.get(OBJECT_ID_FIELD) {
            let matches = found
                .as_str()
                .and_then(|s| s.parse::<ObjectId>().ok())
                .is_some_and(|id| id == object_id);
            if !matches {
                return Err(CodecError::IdMismatch {
                    key: key.to_string(),
                    found: found.to_string(),
                });
            }
        }
        let type_name = fields
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingType)?;
        let kind =
            ShapeKind::from_type_name(type_name).ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;

        let mut fields = fields.clone();
        fields.remove(OBJECT_ID_FIELD);
        Ok(Self {
            object_id,
            kind,
            fields,
        })
    }
}

/// Serialize a shape under `id`.
pub fn encode(id: ObjectId, shape: &Shape) -> Result<ShapeSnapshot, CodecError> {
    let Value::Object(fields) = serde_json::to_value(shape)? else {
        return Err(CodecError::NotAnObject);
    };
    Ok(ShapeSnapshot {
        object_id: id,
        kind: shape.kind(),
        fields,
    })
}

/// Rebuild a shape from a snapshot, returning it with its id.
pub fn decode(snapshot: &ShapeSnapshot) -> Result<(ObjectId, Shape), CodecError> {
    for &field in snapshot.kind.required_fields() {
        let present = match snapshot.fields.get(field) {
            Some(Value::Number(_)) => true,
            Some(Value::String(_)) => matches!(field, "text" | "src"),
            Some(Value::Array(_)) => field == "points",
            _ => false,
        };
        if !present {
            return Err(CodecError::MissingField {
                kind: snapshot.kind,
                field,
            });
        }
    }
    let shape: Shape = serde_json::from_value(Value::Object(snapshot.to_record()))?;
    Ok((snapshot.object_id, shape))
}

/// Decode a stored record directly.
pub fn decode_record(key: &str, value: &Value) -> Result<(ObjectId, Shape), CodecError> {
    decode(&ShapeSnapshot::from_record(key, value)?)
}
