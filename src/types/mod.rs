//! # Type System
//!
//! This module provides the value and type vocabulary shared by the
//! converters and the row materializer.
//!
//! ## Module Structure
//!
//! - `value`: Raw `ColumnValue` as delivered by a cursor
//! - `data_type`: `FieldType` classification of a target shape
//! - `owned_value`: Typed application-side `FieldValue`, `EnumValue`, `Record`
//! - `column`: `TypeDescriptor`, `Member` and the `Model` metadata trait
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `ColumnValue` | Raw scalar read from or bound to a column |
//! | `FieldType` | Static target shape (primitive/enum/row version/opaque/composite) |
//! | `FieldValue` | Typed application value |
//! | `TypeDescriptor` | Members of a composite type |
//! | `Model` | Type metadata provider and constructor |

mod column;
mod data_type;
mod owned_value;
mod value;

pub use column::{Json, Member, Model, TypeDescriptor};
pub use data_type::{EnumType, FieldType, IntWidth, OpaqueKind, OpaqueType, PrimitiveKind, TypeKey};
pub use owned_value::{EnumValue, FieldValue, Record};
pub use value::{ColumnKind, ColumnValue};
