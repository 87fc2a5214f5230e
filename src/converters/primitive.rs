//! # Primitive Conversions
//!
//! Scalars do not go through a registered converter. Their coercions are
//! simple enough to be plain functions, and keeping them out of the registry
//! keeps the per-column hot path free of dynamic dispatch.
//!
//! ## Inbound Coercion
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────────────┐
//! │ Target       │ Accepted raw shapes                                    │
//! ├──────────────┼────────────────────────────────────────────────────────┤
//! │ Int(width)   │ Int in range, integral Float in range, numeric Text,   │
//! │              │ Bool as 0/1                                            │
//! │ Float32/64   │ Float in range, exactly representable Int, numeric Text│
//! │ Bool         │ Bool, Int 0/1, Text "true"/"false"/"1"/"0"             │
//! │ Text         │ Text, UTF-8 Blob, numbers and booleans (display form)  │
//! │ Binary       │ Blob, Text (its UTF-8 bytes)                           │
//! └──────────────┴────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything else, including any narrowing that would lose information, is
//! a `TypeMismatch`. NULL always coerces to NULL; whether that is acceptable
//! is decided by the target `Model` (`Option<T>` accepts it, `T` does not).

use eyre::{bail, Result};

use crate::dialect::Dialect;
use crate::error::ConvertError;
use crate::types::{ColumnValue, FieldValue, IntWidth, PrimitiveKind};

fn mismatch<T>(value: &ColumnValue, kind: PrimitiveKind) -> Result<T> {
    bail!(ConvertError::type_mismatch(
        value.kind().name(),
        kind.name(),
        format!("{} cannot be represented as {}", value, kind.name()),
    ))
}

fn integer_value(raw: i128, width: IntWidth) -> Option<FieldValue> {
    if !width.contains(raw) {
        return None;
    }
    match i64::try_from(raw) {
        Ok(i) => Some(FieldValue::Int(i)),
        Err(_) => u64::try_from(raw).ok().map(FieldValue::UInt),
    }
}

fn parse_integer(text: &str) -> Option<i128> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i128>() {
        return Some(i);
    }
    let f = text.parse::<f64>().ok()?;
    integral_float(f)
}

fn integral_float(f: f64) -> Option<i128> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 2f64.powi(64) {
        Some(f as i128)
    } else {
        None
    }
}

/// The integer as a float, when the conversion is exact.
pub(crate) fn exact_float(i: i64) -> Option<f64> {
    let f = i as f64;
    (f as i128 == i as i128).then_some(f)
}

/// Checks that a float fits the target width. Finite doubles beyond the
/// `f32` range are rejected rather than becoming infinite.
pub(crate) fn float_value(f: f64, kind: PrimitiveKind) -> Option<FieldValue> {
    match kind {
        PrimitiveKind::Float32 if f.is_finite() && f.abs() > f32::MAX as f64 => None,
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => Some(FieldValue::Float(f)),
        _ => None,
    }
}

fn integer_to_float(i: i64, kind: PrimitiveKind) -> Option<FieldValue> {
    let exact = match kind {
        PrimitiveKind::Float32 => (i as f32) as i128 == i as i128,
        _ => exact_float(i).is_some(),
    };
    exact.then(|| FieldValue::Float(i as f64))
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Coerces a raw column value into the given primitive kind.
pub fn coerce(kind: PrimitiveKind, value: ColumnValue) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }
    let converted = match (kind, &value) {
        (PrimitiveKind::Int(width), ColumnValue::Int(i)) => integer_value(*i as i128, width),
        (PrimitiveKind::Int(width), ColumnValue::Float(f)) => {
            integral_float(*f).and_then(|i| integer_value(i, width))
        }
        (PrimitiveKind::Int(width), ColumnValue::Text(s)) => {
            parse_integer(s).and_then(|i| integer_value(i, width))
        }
        (PrimitiveKind::Int(width), ColumnValue::Bool(b)) => integer_value(*b as i128, width),

        (PrimitiveKind::Float32 | PrimitiveKind::Float64, ColumnValue::Float(f)) => {
            float_value(*f, kind)
        }
        (PrimitiveKind::Float32 | PrimitiveKind::Float64, ColumnValue::Int(i)) => {
            integer_to_float(*i, kind)
        }
        (PrimitiveKind::Float32 | PrimitiveKind::Float64, ColumnValue::Text(s)) => {
            s.trim().parse::<f64>().ok().and_then(|f| float_value(f, kind))
        }

        (PrimitiveKind::Bool, ColumnValue::Bool(b)) => Some(FieldValue::Bool(*b)),
        (PrimitiveKind::Bool, ColumnValue::Int(0)) => Some(FieldValue::Bool(false)),
        (PrimitiveKind::Bool, ColumnValue::Int(1)) => Some(FieldValue::Bool(true)),
        (PrimitiveKind::Bool, ColumnValue::Text(s)) => parse_bool(s).map(FieldValue::Bool),

        (PrimitiveKind::Text, ColumnValue::Blob(_))
        | (PrimitiveKind::Text, ColumnValue::Int(_))
        | (PrimitiveKind::Text, ColumnValue::Float(_))
        | (PrimitiveKind::Text, ColumnValue::Bool(_)) => value.to_text().map(FieldValue::Text),

        _ => None,
    };

    if let Some(converted) = converted {
        return Ok(converted);
    }
    match (kind, value) {
        (PrimitiveKind::Text, ColumnValue::Text(s)) => Ok(FieldValue::Text(s)),
        (PrimitiveKind::Binary, ColumnValue::Blob(b)) => Ok(FieldValue::Bytes(b)),
        (PrimitiveKind::Binary, ColumnValue::Text(s)) => Ok(FieldValue::Bytes(s.into_bytes())),
        (kind, value) => mismatch(&value, kind),
    }
}

fn outbound_mismatch<T>(value: &FieldValue, kind: PrimitiveKind) -> Result<T> {
    bail!(ConvertError::type_mismatch(
        value.kind_name(),
        kind.name(),
        format!("{} cannot be bound as {}", value, kind.name()),
    ))
}

/// Binds an application scalar as a raw column value.
///
/// The value must have the target's shape and fit its range, as in
/// [`coerce`].
pub fn to_storage_value(kind: PrimitiveKind, value: FieldValue) -> Result<ColumnValue> {
    let bound = match (kind, value) {
        (_, FieldValue::Null) => ColumnValue::Null,
        (PrimitiveKind::Int(width), FieldValue::Int(i)) => bind_integer(width, i as i128)?,
        (PrimitiveKind::Int(width), FieldValue::UInt(u)) => bind_integer(width, u as i128)?,
        (PrimitiveKind::Int(width), FieldValue::Enum(e)) => bind_integer(width, e.raw as i128)?,
        (PrimitiveKind::Float32 | PrimitiveKind::Float64, FieldValue::Float(f))
            if float_value(f, kind).is_some() =>
        {
            ColumnValue::Float(f)
        }
        (PrimitiveKind::Float32 | PrimitiveKind::Float64, FieldValue::Int(i))
            if integer_to_float(i, kind).is_some() =>
        {
            ColumnValue::Float(i as f64)
        }
        (PrimitiveKind::Bool, FieldValue::Bool(b)) => ColumnValue::Bool(b),
        (PrimitiveKind::Text, FieldValue::Text(s)) => ColumnValue::Text(s),
        (PrimitiveKind::Binary, FieldValue::Bytes(b)) => ColumnValue::Blob(b),
        (kind, other) => return outbound_mismatch(&other, kind),
    };
    Ok(bound)
}

fn bind_integer(width: IntWidth, raw: i128) -> Result<ColumnValue> {
    let kind = PrimitiveKind::Int(width);
    if !width.contains(raw) {
        bail!(ConvertError::type_mismatch(
            "int",
            kind.name(),
            format!("{} is out of range for {}", raw, kind.name()),
        ));
    }
    match i64::try_from(raw) {
        Ok(i) => Ok(ColumnValue::Int(i)),
        Err(_) => bail!(ConvertError::type_mismatch(
            "uint",
            kind.name(),
            format!("{} does not fit a signed 64-bit column", raw),
        )),
    }
}

/// Renders an application scalar as a SQL literal.
pub fn to_literal(dialect: &dyn Dialect, kind: PrimitiveKind, value: &FieldValue) -> Result<String> {
    let raw = to_storage_value(kind, value.clone())?;
    Ok(dialect.column_literal(&raw))
}

/// Column declaration for a primitive kind.
pub fn column_definition(dialect: &dyn Dialect, kind: PrimitiveKind, length: Option<u32>) -> String {
    match kind {
        PrimitiveKind::Bool => "BOOLEAN".to_string(),
        PrimitiveKind::Int(IntWidth::I8 | IntWidth::U8 | IntWidth::I16) => "SMALLINT".to_string(),
        PrimitiveKind::Int(IntWidth::U16 | IntWidth::I32) => "INTEGER".to_string(),
        PrimitiveKind::Int(_) => "BIGINT".to_string(),
        PrimitiveKind::Float32 => "REAL".to_string(),
        PrimitiveKind::Float64 => "DOUBLE PRECISION".to_string(),
        PrimitiveKind::Text => match length {
            Some(length) => dialect.text_column_definition(length),
            None => dialect.max_text_column_definition(),
        },
        PrimitiveKind::Binary => "BLOB".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::error::convert_error;

    const I32: PrimitiveKind = PrimitiveKind::Int(IntWidth::I32);
    const U8: PrimitiveKind = PrimitiveKind::Int(IntWidth::U8);

    #[test]
    fn integers_narrow_with_range_checks() {
        assert_eq!(coerce(I32, ColumnValue::Int(42)).unwrap(), FieldValue::Int(42));
        assert_eq!(coerce(U8, ColumnValue::Int(255)).unwrap(), FieldValue::Int(255));
        let err = coerce(U8, ColumnValue::Int(256)).unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn integral_floats_and_numeric_text_become_integers() {
        assert_eq!(coerce(I32, ColumnValue::Float(3.0)).unwrap(), FieldValue::Int(3));
        assert!(coerce(I32, ColumnValue::Float(3.5)).is_err());
        assert_eq!(coerce(I32, ColumnValue::Text(" 17 ".into())).unwrap(), FieldValue::Int(17));
        assert!(coerce(I32, ColumnValue::Text("abc".into())).is_err());
    }

    #[test]
    fn u64_above_i64_is_unsigned() {
        let max = u64::MAX.to_string();
        assert_eq!(
            coerce(PrimitiveKind::Int(IntWidth::U64), ColumnValue::Text(max)).unwrap(),
            FieldValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn booleans_from_ints_and_text() {
        assert_eq!(coerce(PrimitiveKind::Bool, ColumnValue::Int(1)).unwrap(), FieldValue::Bool(true));
        assert_eq!(
            coerce(PrimitiveKind::Bool, ColumnValue::Text("FALSE".into())).unwrap(),
            FieldValue::Bool(false)
        );
        assert!(coerce(PrimitiveKind::Bool, ColumnValue::Int(2)).is_err());
    }

    #[test]
    fn text_accepts_utf8_blobs_only() {
        assert_eq!(
            coerce(PrimitiveKind::Text, ColumnValue::Blob(b"abc".to_vec())).unwrap(),
            FieldValue::from("abc")
        );
        assert!(coerce(PrimitiveKind::Text, ColumnValue::Blob(vec![0xff, 0xfe])).is_err());
    }

    #[test]
    fn floats_widen_from_integers() {
        assert_eq!(
            coerce(PrimitiveKind::Float64, ColumnValue::Int(2)).unwrap(),
            FieldValue::Float(2.0)
        );
        assert!(coerce(PrimitiveKind::Float64, ColumnValue::Blob(vec![1])).is_err());
    }

    #[test]
    fn null_is_always_null() {
        assert_eq!(coerce(I32, ColumnValue::Null).unwrap(), FieldValue::Null);
        assert_eq!(coerce(PrimitiveKind::Binary, ColumnValue::Null).unwrap(), FieldValue::Null);
    }

    #[test]
    fn literals_go_through_the_dialect() {
        let d = AnsiDialect::new();
        assert_eq!(to_literal(&d, PrimitiveKind::Text, &FieldValue::from("o'k")).unwrap(), "'o''k'");
        assert_eq!(to_literal(&d, PrimitiveKind::Bool, &FieldValue::Bool(true)).unwrap(), "TRUE");
        assert_eq!(
            to_literal(&d, PrimitiveKind::Binary, &FieldValue::Bytes(vec![0xab])).unwrap(),
            "X'ab'"
        );
        assert!(to_storage_value(PrimitiveKind::Int(IntWidth::U64), FieldValue::UInt(u64::MAX)).is_err());
    }

    #[test]
    fn f32_targets_reject_out_of_range_doubles() {
        let err = coerce(PrimitiveKind::Float32, ColumnValue::Float(1e300)).unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::TypeMismatch { .. })
        ));
        assert!(coerce(PrimitiveKind::Float32, ColumnValue::Text("1e39".into())).is_err());
        assert_eq!(
            coerce(PrimitiveKind::Float32, ColumnValue::Float(1.5)).unwrap(),
            FieldValue::Float(1.5)
        );
        assert_eq!(
            coerce(PrimitiveKind::Float64, ColumnValue::Float(1e300)).unwrap(),
            FieldValue::Float(1e300)
        );
    }

    #[test]
    fn integers_widen_to_floats_only_when_exact() {
        let above = (1i64 << 53) + 1;
        assert!(coerce(PrimitiveKind::Float64, ColumnValue::Int(above)).is_err());
        assert!(coerce(PrimitiveKind::Float64, ColumnValue::Int(i64::MAX)).is_err());
        assert_eq!(
            coerce(PrimitiveKind::Float64, ColumnValue::Int(1 << 53)).unwrap(),
            FieldValue::Float(9007199254740992.0)
        );
        assert!(coerce(PrimitiveKind::Float32, ColumnValue::Int((1 << 24) + 1)).is_err());
        assert_eq!(exact_float(-7), Some(-7.0));
    }

    #[test]
    fn outbound_values_are_checked_against_the_kind() {
        assert_eq!(to_storage_value(U8, FieldValue::Int(200)).unwrap(), ColumnValue::Int(200));
        assert!(to_storage_value(U8, FieldValue::Int(1000)).is_err());
        assert!(to_storage_value(PrimitiveKind::Text, FieldValue::Int(1)).is_err());
        assert!(to_storage_value(I32, FieldValue::from("1")).is_err());
        assert!(to_storage_value(PrimitiveKind::Float32, FieldValue::Float(1e300)).is_err());
        assert_eq!(
            to_storage_value(PrimitiveKind::Float64, FieldValue::Int(3)).unwrap(),
            ColumnValue::Float(3.0)
        );
        assert_eq!(
            to_storage_value(PrimitiveKind::Text, FieldValue::Null).unwrap(),
            ColumnValue::Null
        );
        let err = to_literal(&AnsiDialect::new(), U8, &FieldValue::Int(-1)).unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn column_definitions_for_primitives() {
        let d = AnsiDialect::new();
        assert_eq!(column_definition(&d, I32, None), "INTEGER");
        assert_eq!(column_definition(&d, PrimitiveKind::Text, None), "VARCHAR(8000)");
        assert_eq!(column_definition(&d, PrimitiveKind::Text, Some(20)), "VARCHAR(20)");
    }
}
