//! # Value-Type Converter
//!
//! Value wrappers (money amounts, identifiers, small structs with value
//! semantics) are stored as serializer text unless the type declares a native
//! column kind. One rule decides the encoding in every direction:
//!
//! | Value shape        | Bound as          | Read back from                     |
//! |--------------------|-------------------|------------------------------------|
//! | matches `native()` | that column kind  | the same kind, passed through      |
//! | bytes              | `Blob`            | any `Blob`, passed through         |
//! | anything else      | serializer `Text` | serializer text, scalars unwrapped |
//!
//! Serializer output that is a JSON scalar comes back as the matching scalar
//! `FieldValue` (a number as `Int`/`UInt`/`Float`, a string as `Text`), so a
//! value read back equals the value bound. Arrays and objects stay
//! `Structured`.

use eyre::Result;
use serde_json::Value as Json;

use super::{Category, Converter, ConverterContext};
use crate::types::{ColumnKind, ColumnValue, FieldType, FieldValue};

/// Converter for serializer-encoded value types.
pub struct ValueTypeConverter {
    ctx: ConverterContext,
}

fn native_of(target: &FieldType) -> Option<ColumnKind> {
    match target {
        FieldType::Opaque(opaque) => opaque.native(),
        _ => None,
    }
}

/// The column value `value` binds as without serialization, if any.
fn native_shape(value: &FieldValue) -> Option<ColumnValue> {
    match value {
        FieldValue::Int(i) => Some(ColumnValue::Int(*i)),
        FieldValue::UInt(u) => i64::try_from(*u).ok().map(ColumnValue::Int),
        FieldValue::Float(f) => Some(ColumnValue::Float(*f)),
        FieldValue::Bool(b) => Some(ColumnValue::Bool(*b)),
        FieldValue::Text(s) => Some(ColumnValue::Text(s.clone())),
        _ => None,
    }
}

fn pass_through(value: ColumnValue) -> FieldValue {
    match value {
        ColumnValue::Null => FieldValue::Null,
        ColumnValue::Int(i) => FieldValue::Int(i),
        ColumnValue::Float(f) => FieldValue::Float(f),
        ColumnValue::Text(s) => FieldValue::Text(s),
        ColumnValue::Bool(b) => FieldValue::Bool(b),
        ColumnValue::Blob(b) => FieldValue::Bytes(b),
    }
}

fn unwrap_scalar(value: FieldValue) -> FieldValue {
    let FieldValue::Structured(json) = value else {
        return value;
    };
    match json {
        Json::Bool(b) => FieldValue::Bool(b),
        Json::String(s) => FieldValue::Text(s),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                FieldValue::UInt(u)
            } else {
                match n.as_f64() {
                    Some(f) => FieldValue::Float(f),
                    None => FieldValue::Structured(Json::Number(n)),
                }
            }
        }
        other => FieldValue::Structured(other),
    }
}

impl ValueTypeConverter {
    pub fn new(ctx: ConverterContext) -> Self {
        Self { ctx }
    }
}

impl Converter for ValueTypeConverter {
    fn category(&self) -> Category {
        Category::Value
    }

    fn column_definition(&self, length: Option<u32>) -> String {
        self.ctx.text_definition(length)
    }

    fn to_literal(&self, target: &FieldType, value: &FieldValue) -> Result<String> {
        let bound = self.to_storage_value(target, value.clone())?;
        Ok(self.ctx.dialect.column_literal(&bound))
    }

    fn to_storage_value(&self, target: &FieldType, value: FieldValue) -> Result<ColumnValue> {
        match value {
            FieldValue::Null => return Ok(ColumnValue::Null),
            FieldValue::Bytes(b) => return Ok(ColumnValue::Blob(b)),
            _ => {}
        }
        if let Some(native) = native_of(target) {
            if let Some(bound) = native_shape(&value).filter(|v| v.kind() == native) {
                return Ok(bound);
            }
        }
        Ok(ColumnValue::Text(self.ctx.serializer.serialize_to_text(&value)?))
    }

    fn from_storage_value(&self, target: &FieldType, value: ColumnValue) -> Result<FieldValue> {
        if value.is_null() || matches!(value, ColumnValue::Blob(_)) {
            return Ok(pass_through(value));
        }
        if native_of(target) == Some(value.kind()) {
            return Ok(pass_through(value));
        }
        match value.to_text() {
            Some(text) => self
                .ctx
                .serializer
                .deserialize_from_text(&text, target)
                .map(unwrap_scalar),
            None => Ok(pass_through(value)),
        }
    }
}
