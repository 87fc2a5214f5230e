//! # Structured Serializer
//!
//! Opaque types (composites stored in a single column, value wrappers,
//! enumeration labels) are encoded by a pluggable `StructuredSerializer`.
//! The converters treat it as a black box: text in, typed value out.
//!
//! ## JsonSerializer
//!
//! The default implementation writes JSON through `serde_json`:
//!
//! | FieldValue | JSON text |
//! |------------|-----------|
//! | Text | `"abc"` |
//! | Int / UInt / Float / Bool | `42`, `3.5`, `true` |
//! | Bytes | `[1,2,3]` |
//! | Enum (named) | `"Red"` |
//! | Enum (flags or unnamed) | `5` |
//! | Structured | the value itself |
//! | Record | object keyed by member name |
//!
//! Deserialization is directed by the target `FieldType`, so `"Red"` comes
//! back as an enum value for an enum target and as text for a text target.
//!
//! Named enum labels are serialized quoted; the enum converter strips the
//! quotes before applying SQL quoting, and flags (plain integers) are used
//! verbatim.

use eyre::{bail, Result};
use serde_json::{Map, Number, Value as Json};

use crate::converters::primitive;
use crate::error::ConvertError;
use crate::types::{EnumValue, FieldType, FieldValue, PrimitiveKind, Record};

/// Text encoding for opaque values.
pub trait StructuredSerializer: Send + Sync {
    fn serialize_to_text(&self, value: &FieldValue) -> Result<String>;

    fn deserialize_from_text(&self, text: &str, target: &FieldType) -> Result<FieldValue>;
}

/// `serde_json` backed serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl StructuredSerializer for JsonSerializer {
    fn serialize_to_text(&self, value: &FieldValue) -> Result<String> {
        Ok(field_to_json(value)?.to_string())
    }

    fn deserialize_from_text(&self, text: &str, target: &FieldType) -> Result<FieldValue> {
        let json: Json = serde_json::from_str(text).map_err(|e| ConvertError::Serializer {
            target: target.name(),
            reason: format!("invalid JSON '{}': {}", text, e),
        })?;
        json_to_field(json, target)
    }
}

pub(crate) fn field_to_json(value: &FieldValue) -> Result<Json> {
    let json = match value {
        FieldValue::Null => Json::Null,
        FieldValue::Bool(b) => Json::Bool(*b),
        FieldValue::Int(i) => Json::Number((*i).into()),
        FieldValue::UInt(u) => Json::Number((*u).into()),
        FieldValue::Float(f) => match Number::from_f64(*f) {
            Some(n) => Json::Number(n),
            None => bail!(ConvertError::Serializer {
                target: "f64".to_string(),
                reason: format!("{} has no JSON representation", f),
            }),
        },
        FieldValue::Text(s) => Json::String(s.clone()),
        FieldValue::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
        FieldValue::Enum(e) => enum_to_json(e),
        FieldValue::Structured(v) => v.clone(),
        FieldValue::Record(r) => {
            let mut map = Map::with_capacity(r.len());
            for (name, member) in r.iter() {
                map.insert(name.to_string(), field_to_json(member)?);
            }
            Json::Object(map)
        }
    };
    Ok(json)
}

fn enum_to_json(value: &EnumValue) -> Json {
    if value.ty.is_flags() {
        return Json::Number(value.raw.into());
    }
    match value.ty.name_of(value.raw) {
        Some(name) => Json::String(name.to_string()),
        None => Json::Number(value.raw.into()),
    }
}

fn mismatch(json: &Json, target: &FieldType) -> eyre::Report {
    ConvertError::type_mismatch(
        json_kind(json),
        target.name(),
        format!("JSON {} does not fit {}", json, target),
    )
    .into()
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

pub(crate) fn json_to_field(json: Json, target: &FieldType) -> Result<FieldValue> {
    if json.is_null() {
        return Ok(FieldValue::Null);
    }
    match target {
        FieldType::Primitive(kind) => json_to_primitive(json, *kind, target),
        FieldType::Enum(ty) => {
            let raw = match &json {
                Json::String(s) => ty.parse_label(s),
                Json::Number(n) => n.as_i64(),
                _ => return Err(mismatch(&json, target)),
            };
            match raw {
                Some(raw) if ty.accepts(raw) => Ok(FieldValue::Enum(EnumValue::new(ty.clone(), raw))),
                _ => bail!(ConvertError::invalid_enum(ty.name(), &json)),
            }
        }
        FieldType::RowVersion(_) => match json.as_u64() {
            Some(u) => Ok(FieldValue::UInt(u)),
            None => Err(mismatch(&json, target)),
        },
        FieldType::Opaque(_) => Ok(FieldValue::Structured(json)),
        FieldType::Composite(descriptor) => {
            let Json::Object(map) = json else {
                return Err(mismatch(&json, target));
            };
            let mut record: Record = descriptor.default_record();
            for (key, value) in map {
                if let Some(member) = descriptor.find_member(&key) {
                    let converted = json_to_field(value, member.field_type())?;
                    record.set(member.name().to_string(), converted);
                }
            }
            Ok(FieldValue::Record(record))
        }
    }
}

fn json_to_primitive(json: Json, kind: PrimitiveKind, target: &FieldType) -> Result<FieldValue> {
    let converted = match (kind, &json) {
        (PrimitiveKind::Bool, Json::Bool(b)) => Some(FieldValue::Bool(*b)),
        (PrimitiveKind::Int(width), Json::Number(n)) => {
            if let Some(i) = n.as_i64() {
                width.contains(i as i128).then_some(FieldValue::Int(i))
            } else {
                n.as_u64()
                    .filter(|u| width.contains(*u as i128))
                    .map(FieldValue::UInt)
            }
        }
        (PrimitiveKind::Float32 | PrimitiveKind::Float64, Json::Number(n)) => {
            n.as_f64().and_then(|f| primitive::float_value(f, kind))
        }
        (PrimitiveKind::Text, Json::String(s)) => Some(FieldValue::Text(s.clone())),
        (PrimitiveKind::Binary, Json::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(FieldValue::Bytes),
        _ => None,
    };
    converted.ok_or_else(|| mismatch(&json, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumType, IntWidth, OpaqueType, TypeDescriptor};
    use std::sync::Arc;

    #[test]
    fn named_enum_serializes_quoted_and_flags_as_number() {
        let s = JsonSerializer::new();
        let color = Arc::new(EnumType::new("Color", IntWidth::I32).member("Red", 1));
        let perms = Arc::new(
            EnumType::new("Perms", IntWidth::I32)
                .member("Read", 1)
                .member("Write", 2)
                .flags(),
        );
        let red = FieldValue::Enum(EnumValue::new(color, 1));
        let rw = FieldValue::Enum(EnumValue::new(perms, 3));
        assert_eq!(s.serialize_to_text(&red).unwrap(), "\"Red\"");
        assert_eq!(s.serialize_to_text(&rw).unwrap(), "3");
    }

    #[test]
    fn deserialize_is_directed_by_target() {
        let s = JsonSerializer::new();
        let opaque = OpaqueType::reference("Tags").into_field_type();
        assert_eq!(
            s.deserialize_from_text("[\"a\",\"b\"]", &opaque).unwrap(),
            FieldValue::Structured(serde_json::json!(["a", "b"]))
        );
        assert_eq!(
            s.deserialize_from_text("\"a\"", &FieldType::TEXT).unwrap(),
            FieldValue::from("a")
        );
    }

    #[test]
    fn composite_fills_unlisted_members_with_defaults() {
        let s = JsonSerializer::new();
        let address = FieldType::composite(
            TypeDescriptor::new("Address")
                .member("City", FieldType::TEXT)
                .member("Zip", FieldType::I32),
        );
        let FieldValue::Record(r) = s.deserialize_from_text("{\"city\":\"Oslo\"}", &address).unwrap()
        else {
            panic!("expected record");
        };
        assert_eq!(r.get("City"), Some(&FieldValue::from("Oslo")));
        assert_eq!(r.get("Zip"), Some(&FieldValue::Int(0)));
    }

    #[test]
    fn invalid_json_is_a_serializer_error() {
        let s = JsonSerializer::new();
        let err = s.deserialize_from_text("{oops", &FieldType::TEXT).unwrap_err();
        assert!(matches!(
            crate::error::convert_error(&err),
            Some(ConvertError::Serializer { .. })
        ));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        assert!(JsonSerializer::new()
            .serialize_to_text(&FieldValue::Float(f64::INFINITY))
            .is_err());
    }
}
