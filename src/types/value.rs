//! # Raw Column Values
//!
//! This module provides `ColumnValue`, the owned representation of a single
//! column as delivered by a result cursor. It is deliberately a closed set of
//! weakly-typed scalars: everything richer (enumerations, row versions, opaque
//! structured values, nested records) is reconstructed from these shapes by
//! the converters.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Description |
//! |---------|-----------|-------------|
//! | Null | - | SQL NULL |
//! | Int | i64 | 64-bit signed integer |
//! | Float | f64 | 64-bit floating point |
//! | Text | String | UTF-8 string |
//! | Bool | bool | Boolean |
//! | Blob | Vec<u8> | Binary data |
//!
//! ## Comparison Helpers
//!
//! `ColumnValue` implements `PartialEq` against the plain Rust scalars so that
//! dynamic rows read naturally in assertions:
//!
//! ```ignore
//! assert!(row["Type"] == 1);
//! assert!(row["Name"] == "abc");
//! ```
//!
//! Integer and float comparisons are exact: `Int(1) == 1.0` is false, the
//! same way the raw cursor would report two distinct column shapes.

use std::fmt;

/// Shape of a raw column value, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Null,
    Int,
    Float,
    Text,
    Bool,
    Blob,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Null => "NULL",
            ColumnKind::Int => "INTEGER",
            ColumnKind::Float => "REAL",
            ColumnKind::Text => "TEXT",
            ColumnKind::Bool => "BOOLEAN",
            ColumnKind::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw value of one column in the current row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnValue {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValue::Null => ColumnKind::Null,
            ColumnValue::Int(_) => ColumnKind::Int,
            ColumnValue::Float(_) => ColumnKind::Float,
            ColumnValue::Text(_) => ColumnKind::Text,
            ColumnValue::Bool(_) => ColumnKind::Bool,
            ColumnValue::Blob(_) => ColumnKind::Blob,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ColumnValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ColumnValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Textual form used when a structured serializer has to read a
    /// non-text column. Blobs only have one if they are valid UTF-8.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::Int(i) => Some(i.to_string()),
            ColumnValue::Float(f) => Some(f.to_string()),
            ColumnValue::Text(s) => Some(s.clone()),
            ColumnValue::Bool(b) => Some(b.to_string()),
            ColumnValue::Blob(b) => std::str::from_utf8(b).ok().map(str::to_string),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => f.write_str("NULL"),
            ColumnValue::Int(i) => write!(f, "{}", i),
            ColumnValue::Float(v) => write!(f, "{}", v),
            ColumnValue::Text(s) => write!(f, "'{}'", s),
            ColumnValue::Bool(b) => write!(f, "{}", b),
            ColumnValue::Blob(b) => write!(f, "<blob:{} bytes>", b.len()),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int(v)
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int(v as i64)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Text(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Text(v)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(v: Vec<u8>) -> Self {
        ColumnValue::Blob(v)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

impl PartialEq<i64> for ColumnValue {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, ColumnValue::Int(i) if i == other)
    }
}

impl PartialEq<i32> for ColumnValue {
    fn eq(&self, other: &i32) -> bool {
        matches!(self, ColumnValue::Int(i) if *i == *other as i64)
    }
}

impl PartialEq<f64> for ColumnValue {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, ColumnValue::Float(f) if f == other)
    }
}

impl PartialEq<bool> for ColumnValue {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, ColumnValue::Bool(b) if b == other)
    }
}

impl PartialEq<&str> for ColumnValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, ColumnValue::Text(s) if s == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_reports_shape_without_payload() {
        assert_eq!(ColumnValue::Null.kind(), ColumnKind::Null);
        assert_eq!(ColumnValue::Int(7).kind(), ColumnKind::Int);
        assert_eq!(ColumnValue::Blob(vec![1]).kind(), ColumnKind::Blob);
    }

    #[test]
    fn scalar_comparisons_are_shape_exact() {
        assert!(ColumnValue::Int(1) == 1i64);
        assert!(ColumnValue::Int(1) == 1);
        assert!(ColumnValue::Float(1.0) != 1i64);
        assert!(ColumnValue::Text("abc".into()) == "abc");
        assert!(ColumnValue::Bool(true) == true);
    }

    #[test]
    fn to_text_skips_non_utf8_blobs() {
        assert_eq!(ColumnValue::Blob(b"{}".to_vec()).to_text().as_deref(), Some("{}"));
        assert_eq!(ColumnValue::Blob(vec![0xff, 0xfe]).to_text(), None);
        assert_eq!(ColumnValue::Null.to_text(), None);
    }

    #[test]
    fn option_converts_none_to_null() {
        let v: ColumnValue = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: ColumnValue = Some("x").into();
        assert_eq!(v, ColumnValue::Text("x".into()));
    }
}
