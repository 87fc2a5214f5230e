//! # Value Converters
//!
//! This module provides the bidirectional converters between typed
//! application values and raw column values, one per value category, and
//! the registry that picks the right one for a target type.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  to_literal / to_storage_value   ┌─────────────┐
//! │ FieldValue │ ───────────────────────────────► │ SQL literal │
//! │            │                                   │ ColumnValue │
//! │            │ ◄─────────────────────────────── │             │
//! └────────────┘       from_storage_value          └─────────────┘
//!        ▲
//!        │ ConverterRegistry::resolve(FieldType)
//!        │
//!   ┌────┴─────┬──────────────┬────────────────┬───────────────┐
//!   │  Enum    │  RowVersion  │ ReferenceType  │  ValueType    │
//!   └──────────┴──────────────┴────────────────┴───────────────┘
//! ```
//!
//! Primitive scalars bypass the registry's converters and use the simpler
//! coercions in [`primitive`].
//!
//! ## Contract
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `column_definition(length)` | Storage declaration, widest when no length |
//! | `to_literal(target, value)` | SQL literal for direct embedding |
//! | `to_storage_value(target, value)` | Value to bind as a parameter |
//! | `from_storage_value(target, raw)` | Typed value from a column |
//!
//! Converters are stateless apart from the shared dialect and serializer
//! handles, so one instance serves every cursor and thread.

mod enums;
pub mod primitive;
mod reference;
mod registry;
mod row_version;
mod value_type;

use std::sync::Arc;

use eyre::Result;

use crate::dialect::{AnsiDialect, Dialect};
use crate::serializer::{JsonSerializer, StructuredSerializer};
use crate::types::{ColumnValue, FieldType, FieldValue};

pub use enums::EnumConverter;
pub use reference::ReferenceTypeConverter;
pub use registry::{Category, ConverterRegistry};
pub use row_version::RowVersionConverter;
pub use value_type::ValueTypeConverter;

/// Bidirectional encoding for one value category.
pub trait Converter: Send + Sync {
    fn category(&self) -> Category;

    fn column_definition(&self, length: Option<u32>) -> String;

    fn to_literal(&self, target: &FieldType, value: &FieldValue) -> Result<String>;

    fn to_storage_value(&self, target: &FieldType, value: FieldValue) -> Result<ColumnValue>;

    fn from_storage_value(&self, target: &FieldType, value: ColumnValue) -> Result<FieldValue>;
}

/// Collaborators shared by every converter.
#[derive(Clone)]
pub struct ConverterContext {
    pub dialect: Arc<dyn Dialect>,
    pub serializer: Arc<dyn StructuredSerializer>,
}

impl Default for ConverterContext {
    fn default() -> Self {
        Self::new(Arc::new(AnsiDialect::new()), Arc::new(JsonSerializer::new()))
    }
}

impl ConverterContext {
    pub fn new(dialect: Arc<dyn Dialect>, serializer: Arc<dyn StructuredSerializer>) -> Self {
        Self {
            dialect,
            serializer,
        }
    }

    /// Serializer text, falling back to the display form when the
    /// serializer has nothing better than `null` to say.
    fn serialize_or_display(&self, value: &FieldValue) -> Result<String> {
        let text = self.serializer.serialize_to_text(value)?;
        if text == "null" {
            return Ok(value.to_string());
        }
        Ok(text)
    }

    /// Column definition shared by the text-encoded opaque converters.
    fn text_definition(&self, length: Option<u32>) -> String {
        match length {
            Some(length) => self.dialect.text_column_definition(length),
            None => self.dialect.max_text_column_definition(),
        }
    }
}
