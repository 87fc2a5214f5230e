//! Lazy, forward-only row sequences over a borrowed cursor.

use eyre::Result;

use super::{DynamicParser, Materializer, ParserOptions, RowParser};
use crate::cursor::ResultCursor;
use crate::types::Model;

/// A parser that `Rows` can build on the first row and apply to each row.
pub trait RowReader: Sized {
    type Item;

    fn prepare<C: ResultCursor + ?Sized>(
        materializer: &Materializer,
        cursor: &C,
        options: ParserOptions,
    ) -> Result<Self>;

    fn read<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<Option<Self::Item>>;
}

impl<T: Model> RowReader for RowParser<T> {
    type Item = T;

    fn prepare<C: ResultCursor + ?Sized>(
        materializer: &Materializer,
        cursor: &C,
        options: ParserOptions,
    ) -> Result<Self> {
        materializer.row_parser(cursor, options)
    }

    fn read<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<Option<T>> {
        self.parse(cursor)
    }
}

impl RowReader for DynamicParser {
    type Item = super::DynamicRow;

    fn prepare<C: ResultCursor + ?Sized>(
        materializer: &Materializer,
        cursor: &C,
        options: ParserOptions,
    ) -> Result<Self> {
        materializer.dynamic_parser(cursor, options)
    }

    fn read<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<Option<Self::Item>> {
        self.parse(cursor)
    }
}

/// Iterator that advances the cursor once per item.
///
/// The cursor stays owned by the caller: dropping the iterator early leaves
/// it positioned on the last row read. After the first error the iterator is
/// fused and yields nothing more.
pub struct Rows<'a, C: ?Sized, R> {
    materializer: &'a Materializer,
    cursor: &'a mut C,
    options: ParserOptions,
    reader: Option<R>,
    done: bool,
}

impl<'a, C, R> Rows<'a, C, R>
where
    C: ResultCursor + ?Sized,
    R: RowReader,
{
    pub(crate) fn new(materializer: &'a Materializer, cursor: &'a mut C, options: ParserOptions) -> Self {
        Self {
            materializer,
            cursor,
            options,
            reader: None,
            done: false,
        }
    }

    fn next_row(&mut self) -> Result<Option<R::Item>> {
        loop {
            if !self.cursor.advance()? {
                return Ok(None);
            }
            let reader = match self.reader.take() {
                Some(reader) => reader,
                None => R::prepare(self.materializer, &*self.cursor, self.options)?,
            };
            let item = reader.read(&*self.cursor);
            self.reader = Some(reader);
            if let Some(item) = item? {
                return Ok(Some(item));
            }
        }
    }
}

impl<'a, C, R> Iterator for Rows<'a, C, R>
where
    C: ResultCursor + ?Sized,
    R: RowReader,
{
    type Item = Result<R::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a, C, R> std::iter::FusedIterator for Rows<'a, C, R>
where
    C: ResultCursor + ?Sized,
    R: RowReader,
{
}
