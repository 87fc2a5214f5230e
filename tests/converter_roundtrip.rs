//! # Converter Round-Trip Test Suite
//!
//! Drives the category converters through `ConverterRegistry`, the same entry
//! point row parsers use.
//!
//! ## Test Categories
//!
//! 1. **Enumerations**: named, flags and store-as-int encodings
//! 2. **Row Versions**: binary and 64-bit stamp shapes
//! 3. **Opaque Types**: serde-backed members through the structured serializer
//! 4. **Column Definitions**: declarations per category and dialect
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test converter_roundtrip
//! ```

use serde::{Deserialize, Serialize};

use rowcast::{
    convert_error, AnsiDialect, Category, ColumnValue, ConvertError, ConverterRegistry, EnumType,
    EnumValue, FieldType, FieldValue, IntWidth, Json, Materializer, MemoryCursor, Model,
    ParserOptions, PrimitiveKind, ResultCursor,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn color() -> FieldType {
    EnumType::new("Color", IntWidth::I32)
        .member("Red", 1)
        .member("Green", 2)
        .member("Blue", 3)
        .into_field_type()
}

fn perms() -> FieldType {
    EnumType::new("Perms", IntWidth::U8)
        .member("Read", 1)
        .member("Write", 2)
        .member("Execute", 4)
        .flags()
        .into_field_type()
}

fn enum_value(field_type: &FieldType, raw: i64) -> FieldValue {
    match field_type {
        FieldType::Enum(ty) => FieldValue::Enum(EnumValue::new(ty.clone(), raw)),
        other => panic!("{} is not an enumeration", other),
    }
}

fn stamp_as_u64() -> FieldType {
    FieldType::RowVersion(PrimitiveKind::Int(IntWidth::U64))
}

fn stamp_as_bytes() -> FieldType {
    FieldType::RowVersion(PrimitiveKind::Binary)
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

mod enum_tests {
    use super::*;

    #[test]
    fn named_enum_is_stored_as_its_label() {
        let registry = ConverterRegistry::default();
        let green = enum_value(&color(), 2);
        assert_eq!(registry.to_literal(&color(), &green).unwrap(), "'Green'");
        assert_eq!(
            registry.to_storage_value(&color(), green.clone()).unwrap(),
            ColumnValue::from("Green")
        );
        assert_eq!(
            registry
                .from_storage_value(&color(), ColumnValue::from("green"))
                .unwrap(),
            green
        );
    }

    #[test]
    fn named_enum_accepts_integer_input() {
        let registry = ConverterRegistry::default();
        assert_eq!(
            registry.to_literal(&color(), &FieldValue::Int(3)).unwrap(),
            "'Blue'"
        );
        assert_eq!(
            registry
                .from_storage_value(&color(), ColumnValue::Int(1))
                .unwrap(),
            enum_value(&color(), 1)
        );
    }

    #[test]
    fn flag_combination_is_never_quoted() {
        let registry = ConverterRegistry::default();
        let read_write = enum_value(&perms(), 3);
        assert_eq!(registry.to_literal(&perms(), &read_write).unwrap(), "3");
        assert_eq!(
            registry.to_storage_value(&perms(), read_write.clone()).unwrap(),
            ColumnValue::Int(3)
        );
        assert_eq!(
            registry
                .from_storage_value(&perms(), ColumnValue::from("read, write"))
                .unwrap(),
            read_write
        );
    }

    #[test]
    fn undeclared_member_is_invalid() {
        let registry = ConverterRegistry::default();
        let err = registry
            .from_storage_value(&color(), ColumnValue::from("Purple"))
            .unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::InvalidEnumValue { .. })
        ));
        let err = registry
            .from_storage_value(&perms(), ColumnValue::Int(8))
            .unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn store_as_int_enum_binds_its_integer() {
        let registry = ConverterRegistry::default();
        let level = EnumType::new("Level", IntWidth::I16)
            .member("Low", 10)
            .member("High", 20)
            .store_as_int()
            .into_field_type();
        assert_eq!(
            registry
                .to_storage_value(&level, FieldValue::from("high"))
                .unwrap(),
            ColumnValue::Int(20)
        );
        assert_eq!(registry.to_literal(&level, &enum_value(&level, 10)).unwrap(), "10");
    }
}

// ============================================================================
// ROW VERSIONS
// ============================================================================

mod row_version_tests {
    use super::*;

    #[test]
    fn eight_byte_stamp_reads_as_big_endian_number() {
        let registry = ConverterRegistry::default();
        let raw = ColumnValue::Blob(vec![0, 0, 0, 0, 0, 0, 0x07, 0xD1]);
        assert_eq!(
            registry
                .from_storage_value(&stamp_as_u64(), raw.clone())
                .unwrap(),
            FieldValue::UInt(2001)
        );
        assert_eq!(
            registry.from_storage_value(&stamp_as_bytes(), raw).unwrap(),
            FieldValue::Bytes(vec![0, 0, 0, 0, 0, 0, 0x07, 0xD1])
        );
    }

    #[test]
    fn numeric_stamp_fills_a_byte_member() {
        let registry = ConverterRegistry::default();
        assert_eq!(
            registry
                .from_storage_value(&stamp_as_bytes(), ColumnValue::Int(2001))
                .unwrap(),
            FieldValue::Bytes(2001u64.to_be_bytes().to_vec())
        );
    }

    #[test]
    fn row_version_is_declared_as_bigint() {
        let registry = ConverterRegistry::default();
        assert_eq!(registry.classify(&stamp_as_u64()), Category::RowVersion);
        assert_eq!(registry.column_definition(&stamp_as_u64(), None), "BIGINT");
    }
}

// ============================================================================
// OPAQUE TYPES
// ============================================================================

mod opaque_tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
        columns: Vec<u32>,
    }

    fn settings() -> Settings {
        Settings {
            theme: "dark".into(),
            columns: vec![1, 2, 3],
        }
    }

    #[test]
    fn opaque_member_round_trips_through_text() {
        let registry = ConverterRegistry::default();
        let target = Json::<Settings>::field_type();
        let value = Json(settings()).to_field_value().unwrap();

        let stored = registry.to_storage_value(&target, value).unwrap();
        let text = stored.as_text().unwrap().to_string();
        assert!(text.contains("\"theme\":\"dark\""));

        let back = registry
            .from_storage_value(&target, ColumnValue::from(text))
            .and_then(Json::<Settings>::from_value)
            .unwrap();
        assert_eq!(back, Json(settings()));
    }

    #[test]
    fn opaque_column_materializes_as_scalar_row() {
        let stored = serde_json::to_string(&settings()).unwrap();
        let mut cursor =
            MemoryCursor::from_rows(["settings"], vec![vec![ColumnValue::from(stored)]]).unwrap();
        let m = Materializer::new();
        let parser = m
            .row_parser::<Json<Settings>, _>(&cursor, ParserOptions::new())
            .unwrap();
        cursor.advance().unwrap();
        assert_eq!(parser.parse(&cursor).unwrap(), Some(Json(settings())));
    }

    #[test]
    fn malformed_text_reports_the_serializer() {
        let registry = ConverterRegistry::default();
        let err = registry
            .from_storage_value(&Json::<Settings>::field_type(), ColumnValue::from("{oops"))
            .unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::Serializer { .. })
        ));
    }
}

// ============================================================================
// COLUMN DEFINITIONS
// ============================================================================

mod definition_tests {
    use super::*;

    #[test]
    fn definitions_follow_the_dialect() {
        let m = Materializer::builder()
            .dialect(AnsiDialect::with_max_text_length(2000))
            .build();
        let registry = m.registry();
        assert_eq!(registry.column_definition(&color(), None), "VARCHAR(255)");
        assert_eq!(registry.column_definition(&color(), Some(12)), "VARCHAR(12)");
        assert_eq!(
            registry.column_definition(&Json::<Vec<u8>>::field_type(), None),
            "VARCHAR(2000)"
        );
        assert_eq!(registry.column_definition(&FieldType::I64, None), "BIGINT");
    }
}
