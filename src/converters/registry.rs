//! # Converter Registry
//!
//! Maps a target `FieldType` to the converter responsible for it. The
//! category of a type is a pure function of its metadata, so it is computed
//! once per type identity and memoised.
//!
//! ## Resolution Order
//!
//! 1. Primitive scalars: no converter, the caller uses [`super::primitive`]
//! 2. Enumerations: `EnumConverter`
//! 3. Row-version stamps: `RowVersionConverter`
//! 4. Opaque value wrappers: `ValueTypeConverter`
//! 5. Opaque references and composites stored in one column:
//!    `ReferenceTypeConverter`
//!
//! ## Concurrency
//!
//! The registry is shared behind an `Arc` by every materializer. Lookups
//! take a read lock on the memo table; only the first classification of a
//! new type takes the write lock.

use std::sync::Arc;

use eyre::Result;
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::primitive;
use super::{
    Converter, ConverterContext, EnumConverter, ReferenceTypeConverter, RowVersionConverter,
    ValueTypeConverter,
};
use crate::dialect::Dialect;
use crate::types::{ColumnValue, FieldType, FieldValue, OpaqueKind, PrimitiveKind, TypeKey};

/// Value category a target type falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Primitive,
    Enum,
    RowVersion,
    Reference,
    Value,
}

fn category_of(field_type: &FieldType) -> Category {
    match field_type {
        FieldType::Primitive(_) => Category::Primitive,
        FieldType::Enum(_) => Category::Enum,
        FieldType::RowVersion(_) => Category::RowVersion,
        FieldType::Opaque(opaque) => match opaque.kind() {
            OpaqueKind::Reference => Category::Reference,
            OpaqueKind::Value => Category::Value,
        },
        FieldType::Composite(_) => Category::Reference,
    }
}

/// Registry of the category converters.
pub struct ConverterRegistry {
    dialect: Arc<dyn Dialect>,
    enums: EnumConverter,
    row_version: RowVersionConverter,
    reference: ReferenceTypeConverter,
    value: ValueTypeConverter,
    categories: RwLock<HashMap<TypeKey, Category>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new(ConverterContext::default())
    }
}

impl ConverterRegistry {
    pub fn new(ctx: ConverterContext) -> Self {
        Self {
            dialect: ctx.dialect.clone(),
            enums: EnumConverter::new(ctx.clone()),
            row_version: RowVersionConverter::new(),
            reference: ReferenceTypeConverter::new(ctx.clone()),
            value: ValueTypeConverter::new(ctx),
            categories: RwLock::new(HashMap::new()),
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Category of `field_type`, memoised per type identity.
    pub fn classify(&self, field_type: &FieldType) -> Category {
        let key = field_type.key();
        if let Some(category) = self.categories.read().get(&key) {
            return *category;
        }
        let category = category_of(field_type);
        self.categories.write().insert(key, category);
        category
    }

    /// Number of distinct target types classified so far.
    pub fn classifications(&self) -> usize {
        self.categories.read().len()
    }

    /// Converter for `field_type`, or `None` for primitive scalars.
    pub fn resolve(&self, field_type: &FieldType) -> Option<&dyn Converter> {
        match self.classify(field_type) {
            Category::Primitive => None,
            Category::Enum => Some(&self.enums),
            Category::RowVersion => Some(&self.row_version),
            Category::Reference => Some(&self.reference),
            Category::Value => Some(&self.value),
        }
    }

    pub fn reference_converter(&self) -> &dyn Converter {
        &self.reference
    }

    fn route(&self, field_type: &FieldType) -> Route<'_> {
        match (field_type, self.resolve(field_type)) {
            (FieldType::Primitive(kind), _) => Route::Primitive(*kind),
            (_, Some(converter)) => Route::Converter(converter),
            (_, None) => Route::Converter(&self.reference),
        }
    }

    pub fn column_definition(&self, field_type: &FieldType, length: Option<u32>) -> String {
        match self.route(field_type) {
            Route::Primitive(kind) => primitive::column_definition(self.dialect(), kind, length),
            Route::Converter(converter) => converter.column_definition(length),
        }
    }

    pub fn to_literal(&self, field_type: &FieldType, value: &FieldValue) -> Result<String> {
        match self.route(field_type) {
            Route::Primitive(kind) => primitive::to_literal(self.dialect(), kind, value),
            Route::Converter(converter) => converter.to_literal(field_type, value),
        }
    }

    pub fn to_storage_value(&self, field_type: &FieldType, value: FieldValue) -> Result<ColumnValue> {
        match self.route(field_type) {
            Route::Primitive(kind) => primitive::to_storage_value(kind, value),
            Route::Converter(converter) => converter.to_storage_value(field_type, value),
        }
    }

    pub fn from_storage_value(&self, field_type: &FieldType, value: ColumnValue) -> Result<FieldValue> {
        match self.route(field_type) {
            Route::Primitive(kind) => primitive::coerce(kind, value),
            Route::Converter(converter) => converter.from_storage_value(field_type, value),
        }
    }
}

enum Route<'a> {
    Primitive(PrimitiveKind),
    Converter(&'a dyn Converter),
}
