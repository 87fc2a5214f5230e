//! # rowcast - Value Conversion and Row Materialization
//!
//! rowcast translates between raw database column values and typed Rust
//! values. It sits between a data-access layer that delivers rows through a
//! forward-only cursor and application code that wants typed instances:
//!
//! - **Converters** encode and decode one value category each: enumerations,
//!   row-version stamps, opaque reference types, and opaque value types
//! - **Row parsers** read a window of columns and construct a target type,
//!   compiled once per type and layout and cached
//!
//! ## Quick Start
//!
//! ```ignore
//! use rowcast::{Materializer, MemoryCursor, ParserOptions};
//!
//! let materializer = Materializer::new();
//! let mut cursor = MemoryCursor::from_rows(["Name", "Value"], rows)?;
//!
//! for item in materializer.parse::<Item, _>(&mut cursor) {
//!     let item = item?;
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Materializer (row parsers, dispatch)   │
//! ├──────────────────────┬──────────────────┤
//! │     ParserCache      │  Layout / Plan   │
//! ├──────────────────────┴──────────────────┤
//! │   ConverterRegistry (classification)     │
//! ├──────────┬────────────┬─────────────────┤
//! │  Enum    │ RowVersion │ Reference/Value │  primitive path
//! ├──────────┴────────────┴─────────────────┤
//! │     Dialect        │  StructuredSerializer│
//! └─────────────────────────────────────────┘
//!          ▲
//!          │ ResultCursor (advance / value_at / name_at)
//! ```
//!
//! ## Non-goals
//!
//! The crate never decides what SQL runs or when. It does not own
//! connections, transactions, schema generation, or command execution; it
//! only maps a single scalar or a single row to and from a typed value.
//!
//! ## Module Overview
//!
//! - [`types`]: `ColumnValue`, `FieldType`, `FieldValue`, and the `Model` trait
//! - [`converters`]: category converters, the primitive path, the registry
//! - [`materializer`]: row parsers, parser cache, dynamic rows, dispatch
//! - [`cursor`]: the `ResultCursor` contract and `MemoryCursor`
//! - [`dialect`]: literal quoting and column declarations
//! - [`serializer`]: structured text encoding of opaque values
//! - [`error`]: the typed `ConvertError` carried inside `eyre` reports
//! - [`config`]: defaults and sizing constants

pub mod config;
pub mod converters;
pub mod cursor;
pub mod dialect;
pub mod error;
pub mod materializer;
pub mod serializer;
pub mod types;

pub use converters::{Category, Converter, ConverterContext, ConverterRegistry};
pub use cursor::{MemoryCursor, ResultCursor};
pub use dialect::{AnsiDialect, Dialect};
pub use error::{convert_error, ConvertError};
pub use materializer::{
    Discriminated, DynamicParser, DynamicRow, Layout, Materializer, MaterializerBuilder,
    ParserCache, ParserOptions, RowParser, Rows,
};
pub use serializer::{JsonSerializer, StructuredSerializer};
pub use types::{
    ColumnKind, ColumnValue, EnumType, EnumValue, FieldType, FieldValue, IntWidth, Json, Model,
    OpaqueType, PrimitiveKind, Record, TypeDescriptor,
};
