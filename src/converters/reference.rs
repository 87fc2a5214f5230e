//! # Reference-Type Converter
//!
//! Composite and other object-valued members are stored as serializer text
//! in a text column. Byte sequences are the exception: they are handed to
//! the data-access layer as native binary parameters, moved through without
//! a copy.

use eyre::Result;

use super::{Category, Converter, ConverterContext};
use crate::types::{ColumnValue, FieldType, FieldValue};

/// Converter for serializer-encoded reference types.
pub struct ReferenceTypeConverter {
    ctx: ConverterContext,
}

impl ReferenceTypeConverter {
    pub fn new(ctx: ConverterContext) -> Self {
        Self { ctx }
    }
}

impl Converter for ReferenceTypeConverter {
    fn category(&self) -> Category {
        Category::Reference
    }

    fn column_definition(&self, length: Option<u32>) -> String {
        self.ctx.text_definition(length)
    }

    fn to_literal(&self, _target: &FieldType, value: &FieldValue) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        let text = self.ctx.serializer.serialize_to_text(value)?;
        Ok(self.ctx.dialect.quote_literal(&text))
    }

    fn to_storage_value(&self, _target: &FieldType, value: FieldValue) -> Result<ColumnValue> {
        match value {
            FieldValue::Null => Ok(ColumnValue::Null),
            FieldValue::Bytes(bytes) => Ok(ColumnValue::Blob(bytes)),
            other => Ok(ColumnValue::Text(
                self.ctx.serializer.serialize_to_text(&other)?,
            )),
        }
    }

    fn from_storage_value(&self, target: &FieldType, value: ColumnValue) -> Result<FieldValue> {
        match value {
            ColumnValue::Null => Ok(FieldValue::Null),
            ColumnValue::Blob(bytes) => match String::from_utf8(bytes) {
                Ok(text) => self.ctx.serializer.deserialize_from_text(&text, target),
                Err(not_text) => Ok(FieldValue::Bytes(not_text.into_bytes())),
            },
            other => match other.to_text() {
                Some(text) => self.ctx.serializer.deserialize_from_text(&text, target),
                None => Ok(FieldValue::Null),
            },
        }
    }
}
