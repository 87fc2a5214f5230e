//! # Per-Row Polymorphic Dispatch
//!
//! One result set can hold rows of several concrete types that share a base
//! type. A discriminator column says which type each row is. Each arm owns an
//! independently cached parser for its concrete type and maps the result
//! into the base type.
//!
//! ```ignore
//! let shapes = materializer
//!     .discriminated::<i64, Shape, _>(&cursor, "Type", ParserOptions::new())?
//!     .arm(1, Shape::Foo)?
//!     .arm(2, Shape::Bar)?;
//! while cursor.advance()? {
//!     let shape = shapes.parse(&cursor)?;
//! }
//! ```
//!
//! Reading the discriminator and running an arm only reads the current row;
//! the cursor is never advanced.

use eyre::{bail, Result, WrapErr};

use super::{Layout, Materializer, ParserOptions, RowParser};
use crate::cursor::ResultCursor;
use crate::error::ConvertError;
use crate::types::{FieldType, Model};

trait Arm<B>: Send + Sync {
    fn parse(&self, cursor: &dyn ResultCursor) -> Result<Option<B>>;
}

struct MappedArm<T, F> {
    parser: RowParser<T>,
    map: F,
}

impl<T, B, F> Arm<B> for MappedArm<T, F>
where
    T: Model,
    F: Fn(T) -> B + Send + Sync,
{
    fn parse(&self, cursor: &dyn ResultCursor) -> Result<Option<B>> {
        Ok(self.parser.parse(cursor)?.map(&self.map))
    }
}

/// Dispatches each row to the parser selected by a discriminator column.
pub struct Discriminated<K, B> {
    materializer: Materializer,
    layout: Layout,
    options: ParserOptions,
    column: usize,
    column_name: String,
    key_type: FieldType,
    strict: bool,
    arms: Vec<(K, Box<dyn Arm<B>>)>,
}

impl<K, B> Discriminated<K, B>
where
    K: Model + PartialEq,
{
    pub(crate) fn new(
        materializer: Materializer,
        layout: Layout,
        column: &str,
        options: ParserOptions,
    ) -> Result<Self> {
        let key_type = K::field_type();
        let Some(index) = layout.find(column) else {
            bail!(ConvertError::MissingColumn {
                column: column.to_string(),
                target: key_type.name(),
            });
        };
        Ok(Self {
            materializer,
            layout,
            options,
            column: index,
            column_name: column.to_string(),
            key_type,
            strict: false,
            arms: Vec::new(),
        })
    }

    /// Registers the parser used when the discriminator equals `key`.
    pub fn arm<T, F>(mut self, key: K, map: F) -> Result<Self>
    where
        T: Model,
        F: Fn(T) -> B + Send + Sync + 'static,
        B: 'static,
    {
        let parser = self
            .materializer
            .row_parser_for_layout::<T>(&self.layout, self.options)?;
        self.arms.push((key, Box::new(MappedArm { parser, map })));
        Ok(self)
    }

    /// Fails on discriminator values no arm handles instead of skipping them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn discriminator<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<K> {
        let raw = cursor.value_at(self.column)?.clone();
        let value = self
            .materializer
            .registry()
            .from_storage_value(&self.key_type, raw)
            .and_then(K::from_value)
            .wrap_err_with(|| {
                format!(
                    "failed to read discriminator column {} ('{}')",
                    self.column, self.column_name
                )
            })?;
        Ok(value)
    }

    /// Materializes the current row with the arm its discriminator selects.
    ///
    /// Returns `Ok(None)` for an unhandled discriminator value unless the
    /// dispatcher is strict, and when the selected arm's null-first policy
    /// reports no object.
    pub fn parse<C: ResultCursor>(&self, cursor: &C) -> Result<Option<B>> {
        let key = self.discriminator(cursor)?;
        match self.arms.iter().find(|(k, _)| *k == key) {
            Some((_, arm)) => arm.parse(cursor),
            None if self.strict => bail!(ConvertError::invalid_enum(
                self.key_type.name(),
                cursor.value_at(self.column)?
            )),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::MemoryCursor;
    use crate::error::convert_error;
    use crate::types::{ColumnValue, FieldValue, TypeDescriptor};

    #[derive(Debug, PartialEq)]
    enum Animal {
        Dog(String),
        Cat(String),
    }

    struct Dog(String);
    struct Cat(String);

    fn named(type_name: &str) -> FieldType {
        FieldType::composite(TypeDescriptor::new(type_name).member("Name", FieldType::TEXT))
    }

    impl Model for Dog {
        fn field_type() -> FieldType {
            named("Dog")
        }

        fn from_value(value: FieldValue) -> Result<Self> {
            Ok(Dog(value.into_record::<Self>()?.take("Name")?))
        }
    }

    impl Model for Cat {
        fn field_type() -> FieldType {
            named("Cat")
        }

        fn from_value(value: FieldValue) -> Result<Self> {
            Ok(Cat(value.into_record::<Self>()?.take("Name")?))
        }
    }

    fn cursor() -> MemoryCursor {
        MemoryCursor::from_rows(
            ["Kind", "Name"],
            vec![
                vec![ColumnValue::Int(1), ColumnValue::from("rex")],
                vec![ColumnValue::Int(2), ColumnValue::from("tom")],
                vec![ColumnValue::Int(9), ColumnValue::from("???")],
            ],
        )
        .unwrap()
    }

    fn dispatcher(m: &Materializer, c: &MemoryCursor) -> Discriminated<i64, Animal> {
        m.discriminated::<i64, Animal, _>(c, "kind", ParserOptions::new())
            .unwrap()
            .arm(1, |dog: Dog| Animal::Dog(dog.0))
            .unwrap()
            .arm(2, |cat: Cat| Animal::Cat(cat.0))
            .unwrap()
    }

    #[test]
    fn each_row_uses_the_selected_arm() {
        let m = Materializer::new();
        let mut c = cursor();
        let animals = dispatcher(&m, &c);
        c.advance().unwrap();
        assert_eq!(animals.parse(&c).unwrap(), Some(Animal::Dog("rex".into())));
        c.advance().unwrap();
        assert_eq!(animals.parse(&c).unwrap(), Some(Animal::Cat("tom".into())));
        c.advance().unwrap();
        assert_eq!(animals.parse(&c).unwrap(), None);
        assert_eq!(m.cache().compilations(), 2);
    }

    #[test]
    fn strict_dispatch_rejects_unknown_values() {
        let m = Materializer::new();
        let mut c = cursor();
        let animals = dispatcher(&m, &c).strict();
        for _ in 0..3 {
            c.advance().unwrap();
        }
        let err = animals.parse(&c).unwrap_err();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn missing_discriminator_column_is_reported() {
        let m = Materializer::new();
        let err = m
            .discriminated::<i64, Animal, _>(&cursor(), "Type", ParserOptions::new())
            .err()
            .unwrap();
        assert!(matches!(
            convert_error(&err),
            Some(ConvertError::MissingColumn { .. })
        ));
    }
}
