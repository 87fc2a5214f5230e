//! # Application Values
//!
//! `FieldValue` is the typed, application-side counterpart of `ColumnValue`.
//! Converters produce it on the way in and consume it on the way out; the
//! `Model` implementations turn it into concrete Rust types.
//!
//! ## Variants
//!
//! | Variant | Produced by |
//! |---------|-------------|
//! | Null | any converter for a NULL column |
//! | Bool, Int, UInt, Float, Text, Bytes | primitive path, row-version and value-type pass-through |
//! | Enum | enumeration converter |
//! | Structured | structured serializer (opaque types) |
//! | Record | row materializer (composite types) |
//!
//! `Record` keeps members in declaration order; name lookup is
//! case-insensitive like column matching.

use std::fmt;
use std::sync::Arc;

use eyre::{bail, Result};

use super::column::Model;
use super::data_type::EnumType;
use crate::error::ConvertError;

/// A value of a declared enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub ty: Arc<EnumType>,
    pub raw: i64,
}

impl EnumValue {
    pub fn new(ty: Arc<EnumType>, raw: i64) -> Self {
        Self { ty, raw }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ty.label(self.raw))
    }
}

/// Typed application value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    Structured(serde_json::Value),
    Record(Record),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::UInt(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Enum(_) => "enum",
            FieldValue::Structured(_) => "structured",
            FieldValue::Record(_) => "record",
        }
    }

    /// Integer reading of the value if it has one without loss: integers,
    /// enum raws, and text that parses as `i64`.
    pub fn as_integer_like(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::UInt(u) => i64::try_from(*u).ok(),
            FieldValue::Enum(e) => Some(e.raw),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bytes(b) => write!(f, "<bytes:{}>", b.len()),
            FieldValue::Enum(e) => write!(f, "{}", e),
            FieldValue::Structured(v) => write!(f, "{}", v),
            FieldValue::Record(r) => write!(f, "{}", r),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<EnumValue> for FieldValue {
    fn from(v: EnumValue) -> Self {
        FieldValue::Enum(v)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Structured(v)
    }
}

/// Materialized composite: member values in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_capacity(type_name: impl Into<String>, capacity: usize) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(n, _)| n == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .position(|(n, _)| n.eq_ignore_ascii_case(name))
            })
    }

    /// Sets a member, replacing an existing one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Overwrites the member at `index`, in declaration order.
    pub(crate) fn set_at(&mut self, index: usize, value: FieldValue) {
        if let Some(slot) = self.fields.get_mut(index) {
            slot.1 = value;
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|idx| &self.fields[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Moves a member out and converts it into `T`.
    pub fn take<T: Model>(&mut self, name: &str) -> Result<T> {
        let Some(idx) = self.position(name) else {
            bail!(ConvertError::MissingColumn {
                column: name.to_string(),
                target: self.type_name.clone(),
            });
        };
        let value = std::mem::take(&mut self.fields[idx].1);
        T::from_value(value)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}: {}", name, value)?;
        }
        f.write_str(" }")
    }
}
