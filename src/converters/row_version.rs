//! # Row-Version Converter
//!
//! Optimistic-concurrency stamps arrive either as an 8-byte binary sequence
//! or as an already-numeric column. A row-version member must be declared as
//! raw bytes or as `u64`; the bytes are read big-endian.
//!
//! | Raw column | Target `Binary` | Target `u64` | Other target |
//! |------------|-----------------|--------------|--------------|
//! | Blob | bytes unchanged | big-endian u64 | TypeMismatch |
//! | Int / Float / Text | 8 big-endian bytes | u64 | u64 |
//! | Null | null | null | null |

use eyre::{bail, Result};

use super::{Category, Converter};
use crate::config::{ROW_VERSION_COLUMN_DEFINITION, ROW_VERSION_WIDTH};
use crate::error::ConvertError;
use crate::types::{ColumnValue, FieldType, FieldValue, IntWidth, PrimitiveKind};

/// Converter for binary/64-bit row-version stamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowVersionConverter;

fn declared_shape(target: &FieldType) -> Option<PrimitiveKind> {
    match target {
        FieldType::RowVersion(kind) | FieldType::Primitive(kind) => Some(*kind),
        _ => None,
    }
}

fn stamp_from_bytes(bytes: &[u8]) -> Result<u64> {
    let Ok(array) = <[u8; ROW_VERSION_WIDTH]>::try_from(bytes) else {
        bail!(ConvertError::type_mismatch(
            format!("{} byte blob", bytes.len()),
            "u64",
            format!("row version stamps are {} bytes", ROW_VERSION_WIDTH),
        ));
    };
    Ok(u64::from_be_bytes(array))
}

fn stamp_from_number(value: &ColumnValue) -> Result<u64> {
    let stamp = match value {
        ColumnValue::Int(i) => u64::try_from(*i).ok(),
        ColumnValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64 => {
            Some(*f as u64)
        }
        ColumnValue::Text(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match stamp {
        Some(stamp) => Ok(stamp),
        None => bail!(ConvertError::type_mismatch(
            value.kind().name(),
            "u64",
            format!("{} is not a row version", value),
        )),
    }
}

impl RowVersionConverter {
    pub fn new() -> Self {
        Self
    }

    fn stamp_of(&self, value: &FieldValue) -> Result<u64> {
        match value {
            FieldValue::UInt(u) => Ok(*u),
            FieldValue::Int(i) if *i >= 0 => Ok(*i as u64),
            FieldValue::Bytes(b) => stamp_from_bytes(b),
            other => bail!(ConvertError::type_mismatch(
                other.kind_name(),
                "u64",
                format!("{} is not a row version", other),
            )),
        }
    }
}

impl Converter for RowVersionConverter {
    fn category(&self) -> Category {
        Category::RowVersion
    }

    fn column_definition(&self, _length: Option<u32>) -> String {
        ROW_VERSION_COLUMN_DEFINITION.to_string()
    }

    fn to_literal(&self, _target: &FieldType, value: &FieldValue) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        Ok(self.stamp_of(value)?.to_string())
    }

    fn to_storage_value(&self, _target: &FieldType, value: FieldValue) -> Result<ColumnValue> {
        match value {
            FieldValue::Null => Ok(ColumnValue::Null),
            FieldValue::Bytes(b) => Ok(ColumnValue::Blob(b)),
            other => {
                let stamp = self.stamp_of(&other)?;
                match i64::try_from(stamp) {
                    Ok(i) => Ok(ColumnValue::Int(i)),
                    Err(_) => bail!(ConvertError::type_mismatch(
                        "u64",
                        ROW_VERSION_COLUMN_DEFINITION,
                        format!("{} does not fit a signed 64-bit column", stamp),
                    )),
                }
            }
        }
    }

    fn from_storage_value(&self, target: &FieldType, value: ColumnValue) -> Result<FieldValue> {
        let shape = declared_shape(target);
        match value {
            ColumnValue::Null => Ok(FieldValue::Null),
            ColumnValue::Blob(bytes) => match shape {
                Some(PrimitiveKind::Binary) => Ok(FieldValue::Bytes(bytes)),
                Some(PrimitiveKind::Int(IntWidth::U64)) => {
                    Ok(FieldValue::UInt(stamp_from_bytes(&bytes)?))
                }
                _ => bail!(ConvertError::type_mismatch(
                    "BLOB",
                    target.name(),
                    "row version members must be declared as bytes or u64",
                )),
            },
            other => {
                let stamp = stamp_from_number(&other)?;
                match shape {
                    Some(PrimitiveKind::Binary) => Ok(FieldValue::Bytes(stamp.to_be_bytes().to_vec())),
                    _ => Ok(FieldValue::UInt(stamp)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::convert_error;

    fn converter() -> RowVersionConverter {
        RowVersionConverter::new()
    }

    const STAMP: [u8; 8] = [0, 0, 0, 0, 0, 0, 0x07, 0xd1];

    #[test]
    fn declares_bigint() {
        assert_eq!(converter().column_definition(None), "BIGINT");
        assert_eq!(converter().column_definition(Some(16)), "BIGINT");
    }

    #[test]
    fn binary_stamp_reads_identically_for_both_shapes() {
        let c = converter();
        let as_bytes = c
            .from_storage_value(&FieldType::RowVersion(PrimitiveKind::Binary), ColumnValue::Blob(STAMP.to_vec()))
            .unwrap();
        let as_u64 = c
            .from_storage_value(
                &FieldType::RowVersion(PrimitiveKind::Int(IntWidth::U64)),
                ColumnValue::Blob(STAMP.to_vec()),
            )
            .unwrap();
        assert_eq!(as_bytes, FieldValue::Bytes(STAMP.to_vec()));
        assert_eq!(as_u64, FieldValue::UInt(2001));
    }

    #[test]
    fn binary_stamp_for_other_shape_is_type_mismatch() {
        let err = converter()
            .from_storage_value(&FieldType::RowVersion(PrimitiveKind::Text), ColumnValue::Blob(STAMP.to_vec()))
            .unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn short_blob_is_rejected_for_u64() {
        assert!(converter()
            .from_storage_value(&FieldType::U64, ColumnValue::Blob(vec![1, 2, 3]))
            .is_err());
    }

    #[test]
    fn numeric_stamp_widens_to_u64() {
        let c = converter();
        let target = FieldType::RowVersion(PrimitiveKind::Int(IntWidth::U64));
        assert_eq!(c.from_storage_value(&target, ColumnValue::Int(42)).unwrap(), FieldValue::UInt(42));
        assert_eq!(c.from_storage_value(&target, ColumnValue::Float(7.0)).unwrap(), FieldValue::UInt(7));
        assert!(c.from_storage_value(&target, ColumnValue::Int(-1)).is_err());
        assert!(c.from_storage_value(&target, ColumnValue::Float(1.5)).is_err());
    }

    #[test]
    fn null_stamp_is_null_not_error() {
        assert_eq!(
            converter().from_storage_value(&FieldType::U64, ColumnValue::Null).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn outbound_binds_bytes_and_integers() {
        let c = converter();
        let target = FieldType::RowVersion(PrimitiveKind::Binary);
        assert_eq!(
            c.to_storage_value(&target, FieldValue::Bytes(STAMP.to_vec())).unwrap(),
            ColumnValue::Blob(STAMP.to_vec())
        );
        assert_eq!(c.to_storage_value(&target, FieldValue::UInt(5)).unwrap(), ColumnValue::Int(5));
        assert!(c.to_storage_value(&target, FieldValue::UInt(u64::MAX)).is_err());
        assert_eq!(c.to_literal(&target, &FieldValue::Bytes(STAMP.to_vec())).unwrap(), "2001");
    }
}
