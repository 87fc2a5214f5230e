//! # Enumeration Converter
//!
//! Encodes enumerations either as their member label or as their underlying
//! integer. The encoding is chosen from the target type alone:
//!
//! 1. **Store-as-int** enumerations always use the underlying integer.
//! 2. **Flags** enumerations, and plain integer targets routed here for
//!    integer-flag compatibility, use the serializer text verbatim. A flag
//!    combination serializes to a bare integer, so it is never SQL-quoted.
//! 3. Everything else is a **named** enumeration: integer-like inputs are
//!    first turned into the member they denote, the serializer text has its
//!    surrounding `"` stripped, and the label is quoted as a string literal.
//!
//! Decoding accepts member labels in any case (comma lists for flags),
//! numeric text, and integers, and rejects anything that is not a member
//! (or, for flags, a combination of declared bits) with `InvalidEnumValue`.

use std::sync::Arc;

use eyre::{bail, Result};

use super::{Category, Converter, ConverterContext};
use crate::config::DEFAULT_ENUM_COLUMN_LENGTH;
use crate::error::ConvertError;
use crate::types::{ColumnValue, EnumType, EnumValue, FieldType, FieldValue, IntWidth, PrimitiveKind};

enum Target<'a> {
    Enum(&'a Arc<EnumType>),
    Integer(IntWidth),
}

impl<'a> Target<'a> {
    fn of(field_type: &'a FieldType) -> Result<Self> {
        match field_type {
            FieldType::Enum(ty) => Ok(Target::Enum(ty)),
            FieldType::Primitive(PrimitiveKind::Int(width)) => Ok(Target::Integer(*width)),
            other => bail!(ConvertError::type_mismatch(
                other.name(),
                "enum",
                "enum converter needs an enumeration or integer target",
            )),
        }
    }

    fn is_flags(&self) -> bool {
        match self {
            Target::Enum(ty) => ty.is_flags(),
            Target::Integer(_) => true,
        }
    }

    fn is_int_encoded(&self) -> bool {
        match self {
            Target::Enum(ty) => ty.is_flags() || ty.is_store_as_int(),
            Target::Integer(_) => true,
        }
    }

    fn name(&self) -> &str {
        match self {
            Target::Enum(ty) => ty.name(),
            Target::Integer(width) => width.name(),
        }
    }

    /// Checks `raw` against the target and wraps it as an application value.
    fn admit(&self, raw: i64) -> Result<FieldValue> {
        match self {
            Target::Enum(ty) if ty.accepts(raw) => {
                Ok(FieldValue::Enum(EnumValue::new((*ty).clone(), raw)))
            }
            Target::Integer(width) if width.contains(raw as i128) => Ok(FieldValue::Int(raw)),
            _ => bail!(ConvertError::invalid_enum(self.name(), raw)),
        }
    }

    fn admit_label(&self, label: &str) -> Result<FieldValue> {
        let raw = match self {
            Target::Enum(ty) => ty.parse_label(label),
            Target::Integer(_) => label.trim().parse::<i64>().ok(),
        };
        match raw {
            Some(raw) => self.admit(raw),
            None => bail!(ConvertError::invalid_enum(self.name(), label)),
        }
    }
}

/// Converter for enumerated types.
pub struct EnumConverter {
    ctx: ConverterContext,
    length: u32,
}

impl EnumConverter {
    pub fn new(ctx: ConverterContext) -> Self {
        Self {
            ctx,
            length: DEFAULT_ENUM_COLUMN_LENGTH,
        }
    }

    fn underlying_raw(&self, target: &Target<'_>, value: &FieldValue) -> Result<i64> {
        let raw = match value {
            FieldValue::Enum(e) => e.raw,
            FieldValue::Text(s) => return self.underlying_raw(target, &target.admit_label(s)?),
            other => match other.as_integer_like() {
                Some(raw) => raw,
                None => bail!(ConvertError::type_mismatch(
                    other.kind_name(),
                    target.name(),
                    format!("{} has no underlying integer", other),
                )),
            },
        };
        target.admit(raw)?;
        Ok(raw)
    }
}

impl Converter for EnumConverter {
    fn category(&self) -> Category {
        Category::Enum
    }

    fn column_definition(&self, length: Option<u32>) -> String {
        self.ctx
            .dialect
            .text_column_definition(length.unwrap_or(self.length))
    }

    fn to_literal(&self, field_type: &FieldType, value: &FieldValue) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        let target = Target::of(field_type)?;

        if let Target::Enum(ty) = &target {
            if ty.is_store_as_int() {
                return Ok(self.underlying_raw(&target, value)?.to_string());
            }
        }

        if target.is_flags() {
            let value = target.admit(self.underlying_raw(&target, value)?)?;
            return self.ctx.serialize_or_display(&value);
        }

        let value = match value {
            FieldValue::Enum(_) => value.clone(),
            FieldValue::Text(s) => target.admit_label(s)?,
            other => match other.as_integer_like() {
                Some(raw) => target.admit(raw)?,
                None => other.clone(),
            },
        };
        let text = self.ctx.serialize_or_display(&value)?;
        Ok(self.ctx.dialect.quote_literal(text.trim_matches('"')))
    }

    fn to_storage_value(&self, field_type: &FieldType, value: FieldValue) -> Result<ColumnValue> {
        if value.is_null() {
            return Ok(ColumnValue::Null);
        }
        let target = Target::of(field_type)?;

        if target.is_int_encoded() {
            return Ok(ColumnValue::Int(self.underlying_raw(&target, &value)?));
        }

        let value = match value {
            FieldValue::Enum(_) => value,
            FieldValue::Text(s) => target.admit_label(&s)?,
            other => match other.as_integer_like() {
                Some(raw) => target.admit(raw)?,
                None => other,
            },
        };
        let text = self.ctx.serialize_or_display(&value)?;
        Ok(ColumnValue::Text(text.trim_matches('"').to_string()))
    }

    fn from_storage_value(&self, field_type: &FieldType, value: ColumnValue) -> Result<FieldValue> {
        let target = Target::of(field_type)?;
        match value {
            ColumnValue::Null => Ok(FieldValue::Null),
            ColumnValue::Text(s) => target.admit_label(&s),
            ColumnValue::Int(raw) => target.admit(raw),
            ColumnValue::Bool(b) => target.admit(b as i64),
            other => bail!(ConvertError::type_mismatch(
                other.kind().name(),
                target.name(),
                "enumerations are stored as text or integers",
            )),
        }
    }
}
