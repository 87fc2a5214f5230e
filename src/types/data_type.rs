//! # Target Type Classification
//!
//! This module provides `FieldType`, the static description of the shape a
//! single column or member is converted into. Classification is computed once
//! from type metadata and never from the values flowing through it.
//!
//! ## Categories
//!
//! | Variant | Meaning | Converter |
//! |---------|---------|-----------|
//! | Primitive | integers, floats, bool, text, bytes | primitive path |
//! | Enum | named or flags enumeration over an integer width | enum converter |
//! | RowVersion | binary/64-bit concurrency stamp | row-version converter |
//! | Opaque (Reference) | serializer-encoded composite | reference converter |
//! | Opaque (Value) | serializer-encoded value wrapper | value-type converter |
//! | Composite | nested record materialized from columns | reference converter / recursion |
//!
//! ## Enumerations
//!
//! `EnumType` carries the declared members, the underlying integer width,
//! whether values combine as bitflags, and whether the field is tagged to be
//! stored as its underlying integer instead of its name.
//!
//! ```ignore
//! let color = EnumType::new("Color", IntWidth::I32)
//!     .member("Red", 1)
//!     .member("Green", 2)
//!     .into_field_type();
//! ```

use std::fmt;
use std::sync::Arc;

use super::column::TypeDescriptor;
use super::value::ColumnKind;

/// Integer storage width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub fn min(&self) -> i128 {
        match self {
            IntWidth::I8 => i8::MIN as i128,
            IntWidth::I16 => i16::MIN as i128,
            IntWidth::I32 => i32::MIN as i128,
            IntWidth::I64 => i64::MIN as i128,
            IntWidth::U8 | IntWidth::U16 | IntWidth::U32 | IntWidth::U64 => 0,
        }
    }

    pub fn max(&self) -> i128 {
        match self {
            IntWidth::I8 => i8::MAX as i128,
            IntWidth::I16 => i16::MAX as i128,
            IntWidth::I32 => i32::MAX as i128,
            IntWidth::I64 => i64::MAX as i128,
            IntWidth::U8 => u8::MAX as i128,
            IntWidth::U16 => u16::MAX as i128,
            IntWidth::U32 => u32::MAX as i128,
            IntWidth::U64 => u64::MAX as i128,
        }
    }

    pub fn contains(&self, v: i128) -> bool {
        v >= self.min() && v <= self.max()
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            IntWidth::U8 | IntWidth::U16 | IntWidth::U32 | IntWidth::U64
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
            IntWidth::U64 => "u64",
        }
    }
}

/// Scalar kinds handled by the primitive conversion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int(IntWidth),
    Float32,
    Float64,
    Text,
    Binary,
}

impl PrimitiveKind {
    pub fn is_integer(&self) -> bool {
        matches!(self, PrimitiveKind::Int(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int(w) => w.name(),
            PrimitiveKind::Float32 => "f32",
            PrimitiveKind::Float64 => "f64",
            PrimitiveKind::Text => "text",
            PrimitiveKind::Binary => "bytes",
        }
    }
}

/// Declared enumeration: members, underlying width, and encoding policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    underlying: IntWidth,
    flags: bool,
    store_as_int: bool,
    members: Vec<(String, i64)>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, underlying: IntWidth) -> Self {
        Self {
            name: name.into(),
            underlying,
            flags: false,
            store_as_int: false,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, raw: i64) -> Self {
        self.members.push((name.into(), raw));
        self
    }

    /// Marks the enumeration as a bitmask whose members combine with OR.
    pub fn flags(mut self) -> Self {
        self.flags = true;
        self
    }

    /// Tags the enumeration to be stored as its underlying integer.
    pub fn store_as_int(mut self) -> Self {
        self.store_as_int = true;
        self
    }

    pub fn into_field_type(self) -> FieldType {
        FieldType::Enum(Arc::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn underlying(&self) -> IntWidth {
        self.underlying
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    pub fn is_store_as_int(&self) -> bool {
        self.store_as_int
    }

    pub fn members(&self) -> &[(String, i64)] {
        &self.members
    }

    pub fn lookup_ignore_case(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(name))
            .map(|(_, raw)| *raw)
    }

    pub fn name_of(&self, raw: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == raw)
            .map(|(m, _)| m.as_str())
    }

    pub fn declared_bits(&self) -> i64 {
        self.members.iter().fold(0, |acc, (_, v)| acc | *v)
    }

    /// Whether `raw` denotes a value of this enumeration: a declared member,
    /// or for flags any combination of declared bits (including zero).
    pub fn accepts(&self, raw: i64) -> bool {
        if !self.underlying.contains(raw as i128) {
            return false;
        }
        if self.flags {
            raw & !self.declared_bits() == 0
        } else {
            self.name_of(raw).is_some()
        }
    }

    /// Parses a stored label back to its raw value: a member name (any case),
    /// a comma-separated list of names for flags, or a bare integer. The raw
    /// value is not checked against the members here.
    pub fn parse_label(&self, text: &str) -> Option<i64> {
        let text = text.trim();
        if let Ok(raw) = text.parse::<i64>() {
            return Some(raw);
        }
        if self.flags && text.contains(',') {
            return text
                .split(',')
                .map(|part| self.lookup_ignore_case(part.trim()))
                .try_fold(0i64, |acc, raw| raw.map(|r| acc | r));
        }
        self.lookup_ignore_case(text)
    }

    /// Renders `raw` the way a label is shown: member name, `", "` joined
    /// flag names, or the bare integer when nothing matches.
    pub fn label(&self, raw: i64) -> String {
        if let Some(name) = self.name_of(raw) {
            return name.to_string();
        }
        if self.flags && raw != 0 && self.accepts(raw) {
            let names: Vec<&str> = self
                .members
                .iter()
                .filter(|(_, v)| *v != 0 && raw & *v == *v)
                .map(|(m, _)| m.as_str())
                .collect();
            if !names.is_empty() {
                return names.join(", ");
            }
        }
        raw.to_string()
    }
}

/// Whether an opaque type behaves like a shared reference or a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueKind {
    Reference,
    Value,
}

/// A type whose encoding is delegated to the structured serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueType {
    name: String,
    kind: OpaqueKind,
    native: Option<ColumnKind>,
}

impl OpaqueType {
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OpaqueKind::Reference,
            native: None,
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OpaqueKind::Value,
            native: None,
        }
    }

    /// Raw column shape that already satisfies this type and is passed
    /// through without deserialization.
    pub fn with_native(mut self, kind: ColumnKind) -> Self {
        self.native = Some(kind);
        self
    }

    pub fn into_field_type(self) -> FieldType {
        FieldType::Opaque(Arc::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OpaqueKind {
        self.kind
    }

    pub fn native(&self) -> Option<ColumnKind> {
        self.native
    }
}

/// Target shape for a single column or member.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Enum(Arc<EnumType>),
    /// Row-version stamp declared with the given storage shape; only
    /// `Binary` and `Int(U64)` can receive binary stamps.
    RowVersion(PrimitiveKind),
    Opaque(Arc<OpaqueType>),
    Composite(Arc<TypeDescriptor>),
}

/// Identity of a target type, used to memoise per-type work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Primitive(PrimitiveKind),
    Enum(String),
    RowVersion(PrimitiveKind),
    Opaque(OpaqueKind, String),
    Composite(String),
}

impl FieldType {
    pub const BOOL: FieldType = FieldType::Primitive(PrimitiveKind::Bool);
    pub const TEXT: FieldType = FieldType::Primitive(PrimitiveKind::Text);
    pub const BINARY: FieldType = FieldType::Primitive(PrimitiveKind::Binary);
    pub const F64: FieldType = FieldType::Primitive(PrimitiveKind::Float64);
    pub const I32: FieldType = FieldType::Primitive(PrimitiveKind::Int(IntWidth::I32));
    pub const I64: FieldType = FieldType::Primitive(PrimitiveKind::Int(IntWidth::I64));
    pub const U64: FieldType = FieldType::Primitive(PrimitiveKind::Int(IntWidth::U64));

    pub fn composite(descriptor: TypeDescriptor) -> Self {
        FieldType::Composite(Arc::new(descriptor))
    }

    pub fn key(&self) -> TypeKey {
        match self {
            FieldType::Primitive(p) => TypeKey::Primitive(*p),
            FieldType::Enum(e) => TypeKey::Enum(e.name().to_string()),
            FieldType::RowVersion(p) => TypeKey::RowVersion(*p),
            FieldType::Opaque(o) => TypeKey::Opaque(o.kind(), o.name().to_string()),
            FieldType::Composite(d) => TypeKey::Composite(d.name().to_string()),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Primitive(_))
    }

    pub fn name(&self) -> String {
        match self {
            FieldType::Primitive(p) => p.name().to_string(),
            FieldType::Enum(e) => e.name().to_string(),
            FieldType::RowVersion(p) => format!("rowversion<{}>", p.name()),
            FieldType::Opaque(o) => o.name().to_string(),
            FieldType::Composite(d) => d.name().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissions() -> EnumType {
        EnumType::new("Permissions", IntWidth::I32)
            .member("None", 0)
            .member("Read", 1)
            .member("Write", 2)
            .member("Execute", 4)
            .flags()
    }

    #[test]
    fn int_width_bounds_match_rust_types() {
        assert!(IntWidth::U8.contains(255));
        assert!(!IntWidth::U8.contains(256));
        assert!(!IntWidth::U64.contains(-1));
        assert!(IntWidth::I64.contains(i64::MIN as i128));
    }

    #[test]
    fn enum_lookup_ignores_case() {
        let e = EnumType::new("Color", IntWidth::I32).member("Red", 1);
        assert_eq!(e.lookup_ignore_case("rED"), Some(1));
        assert_eq!(e.lookup_ignore_case("blue"), None);
    }

    #[test]
    fn flags_accept_any_combination_of_declared_bits() {
        let e = permissions();
        assert!(e.accepts(0));
        assert!(e.accepts(7));
        assert!(!e.accepts(8));
        assert_eq!(e.label(3), "Read, Write");
    }

    #[test]
    fn parse_label_combines_flag_lists() {
        let e = permissions();
        assert_eq!(e.parse_label("read, EXECUTE"), Some(5));
        assert_eq!(e.parse_label("6"), Some(6));
        assert_eq!(e.parse_label("Read, Bogus"), None);
    }

    #[test]
    fn single_valued_enum_rejects_undeclared_raw() {
        let e = EnumType::new("Color", IntWidth::U8).member("Red", 1).member("Blue", 3);
        assert!(e.accepts(3));
        assert!(!e.accepts(2));
        assert!(!e.accepts(-1));
        assert_eq!(e.label(2), "2");
    }

    #[test]
    fn type_key_distinguishes_opaque_kinds() {
        let r = OpaqueType::reference("Money").into_field_type();
        let v = OpaqueType::value("Money").into_field_type();
        assert_ne!(r.key(), v.key());
    }
}
