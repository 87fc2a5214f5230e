//! # Type Metadata
//!
//! Rust has no runtime reflection, so target types describe themselves through
//! the `Model` trait. `Model::field_type` is the static metadata the registry
//! and the materializer classify once; `Model::from_value` builds the instance
//! from the converted value.
//!
//! ## Composite Types
//!
//! A composite declares its settable members in a `TypeDescriptor`. Member
//! order is declaration order and is the order columns are bound in.
//!
//! ```ignore
//! struct Foo { name: String, value: f64 }
//!
//! impl Model for Foo {
//!     fn field_type() -> FieldType {
//!         FieldType::composite(
//!             TypeDescriptor::new("Foo")
//!                 .member("Name", FieldType::TEXT)
//!                 .member("Value", FieldType::F64),
//!         )
//!     }
//!
//!     fn from_value(value: FieldValue) -> Result<Self> {
//!         let mut record = value.into_record::<Self>()?;
//!         Ok(Foo { name: record.take("Name")?, value: record.take("Value")? })
//!     }
//! }
//! ```
//!
//! Members that no column matches, or whose column is NULL, keep their
//! default: zero for numbers, `false`, empty text/bytes, raw `0` for
//! enumerations, NULL otherwise. Members declared with `optional` default to
//! NULL so they can back `Option<T>` fields.

use eyre::{bail, Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data_type::{FieldType, IntWidth, PrimitiveKind};
use super::owned_value::{EnumValue, FieldValue, Record};
use crate::error::ConvertError;

/// One settable member of a composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    field_type: FieldType,
    default: FieldValue,
}

impl Member {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let default = default_value(&field_type);
        Self {
            name: name.into(),
            field_type,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn default_value(&self) -> &FieldValue {
        &self.default
    }
}

/// Static description of a composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    members: Vec<Member>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.members.push(Member::new(name, field_type));
        self
    }

    /// Declares a member that stays NULL unless a column sets it, for
    /// `Option<T>` fields.
    pub fn optional(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.member_with_default(name, field_type, FieldValue::Null)
    }

    pub fn member_with_default(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        default: FieldValue,
    ) -> Self {
        let mut member = Member::new(name, field_type);
        member.default = default;
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// A record holding every member at its default value.
    pub fn default_record(&self) -> Record {
        let mut record = Record::with_capacity(self.name.clone(), self.members.len());
        for m in &self.members {
            record.set(m.name.clone(), m.default.clone());
        }
        record
    }
}

fn default_value(field_type: &FieldType) -> FieldValue {
    match field_type {
        FieldType::Primitive(PrimitiveKind::Bool) => FieldValue::Bool(false),
        FieldType::Primitive(PrimitiveKind::Int(_)) => FieldValue::Int(0),
        FieldType::Primitive(PrimitiveKind::Float32 | PrimitiveKind::Float64) => {
            FieldValue::Float(0.0)
        }
        FieldType::Primitive(PrimitiveKind::Text) => FieldValue::Text(String::new()),
        FieldType::Primitive(PrimitiveKind::Binary) => FieldValue::Bytes(Vec::new()),
        FieldType::Enum(e) => FieldValue::Enum(EnumValue::new(e.clone(), 0)),
        FieldType::RowVersion(_) | FieldType::Opaque(_) | FieldType::Composite(_) => {
            FieldValue::Null
        }
    }
}

/// Type metadata provider and constructor for a materializable type.
pub trait Model: Sized + 'static {
    fn field_type() -> FieldType;

    fn from_value(value: FieldValue) -> Result<Self>;
}

fn mismatch<T>(value: &FieldValue, target: &str) -> Result<T> {
    bail!(ConvertError::TypeMismatch {
        found: value.kind_name().to_string(),
        target: target.to_string(),
        reason: format!("cannot convert {} into {}", value, target),
    })
}

impl FieldValue {
    /// Unwraps a materialized composite for `T::from_value`.
    pub fn into_record<T: Model>(self) -> Result<Record> {
        match self {
            FieldValue::Record(r) => Ok(r),
            other => mismatch(&other, &T::field_type().name()),
        }
    }

    /// Unwraps an enumeration value, returning its underlying integer.
    pub fn into_enum_raw(self) -> Result<i64> {
        match self {
            FieldValue::Enum(e) => Ok(e.raw),
            FieldValue::Int(i) => Ok(i),
            other => mismatch(&other, "enum"),
        }
    }
}

macro_rules! int_model {
    ($($t:ty => $w:ident),* $(,)?) => {
        $(
            impl Model for $t {
                fn field_type() -> FieldType {
                    FieldType::Primitive(PrimitiveKind::Int(IntWidth::$w))
                }

                fn from_value(value: FieldValue) -> Result<Self> {
                    let converted = match &value {
                        FieldValue::Int(i) => <$t>::try_from(*i).ok(),
                        FieldValue::UInt(u) => <$t>::try_from(*u).ok(),
                        FieldValue::Enum(e) => <$t>::try_from(e.raw).ok(),
                        _ => None,
                    };
                    match converted {
                        Some(v) => Ok(v),
                        None => mismatch(&value, stringify!($t)),
                    }
                }
            }
        )*
    };
}

int_model! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl Model for f64 {
    fn field_type() -> FieldType {
        FieldType::F64
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Float(f) => Ok(f),
            other => mismatch(&other, "f64"),
        }
    }
}

impl Model for f32 {
    fn field_type() -> FieldType {
        FieldType::Primitive(PrimitiveKind::Float32)
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Float(f) if !f.is_finite() || f.abs() <= f32::MAX as f64 => Ok(f as f32),
            other => mismatch(&other, "f32"),
        }
    }
}

impl Model for bool {
    fn field_type() -> FieldType {
        FieldType::BOOL
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bool(b) => Ok(b),
            other => mismatch(&other, "bool"),
        }
    }
}

impl Model for String {
    fn field_type() -> FieldType {
        FieldType::TEXT
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Text(s) => Ok(s),
            other => mismatch(&other, "text"),
        }
    }
}

impl Model for Vec<u8> {
    fn field_type() -> FieldType {
        FieldType::BINARY
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bytes(b) => Ok(b),
            other => mismatch(&other, "bytes"),
        }
    }
}

impl<T: Model> Model for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Serde-backed opaque member, stored through the structured serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

fn json_name<T>() -> String {
    format!("json<{}>", std::any::type_name::<T>())
}

impl<T> Model for Json<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn field_type() -> FieldType {
        super::OpaqueType::reference(json_name::<T>()).into_field_type()
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Structured(v) => serde_json::from_value(v)
                .map(Json)
                .wrap_err_with(|| format!("failed to build {}", json_name::<T>())),
            other => mismatch(&other, &json_name::<T>()),
        }
    }
}

impl<T: Serialize> Json<T> {
    pub fn to_field_value(&self) -> Result<FieldValue> {
        let v = serde_json::to_value(&self.0).wrap_err("failed to serialize json member")?;
        Ok(FieldValue::Structured(v))
    }
}
