//! # Result Cursors
//!
//! The materializer reads rows through `ResultCursor`, a forward-only view
//! with a single active position. Cursors are owned and advanced by the
//! caller; the materializer only reads the current row.
//!
//! ```text
//!   new ──► [not positioned] ──advance()=true──► [row 0] ──► ... ──► [row n-1]
//!                                                                      │
//!                                                     advance()=false ◄┘
//! ```
//!
//! Reading before the first `advance()` or after exhaustion is an error,
//! never a panic.
//!
//! `MemoryCursor` holds already-fetched rows. It is what tests use, and what
//! callers use when a driver hands back a fully buffered result set.

use eyre::{bail, ensure, Result};

use crate::types::ColumnValue;

/// Forward-only result cursor.
pub trait ResultCursor {
    /// Moves to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    fn column_count(&self) -> usize;

    fn name_at(&self, index: usize) -> Result<&str>;

    fn value_at(&self, index: usize) -> Result<&ColumnValue>;
}

impl<C: ResultCursor + ?Sized> ResultCursor for &mut C {
    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn name_at(&self, index: usize) -> Result<&str> {
        (**self).name_at(index)
    }

    fn value_at(&self, index: usize) -> Result<&ColumnValue> {
        (**self).value_at(index)
    }
}

/// In-memory cursor over buffered rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    names: Vec<String>,
    rows: Vec<Vec<ColumnValue>>,
    position: Option<usize>,
}

impl MemoryCursor {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            position: None,
        }
    }

    /// Builds a cursor from column names and rows, checking every row's width.
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<ColumnValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cursor = Self::new(names);
        for row in rows {
            cursor.push_row(row)?;
        }
        Ok(cursor)
    }

    pub fn push_row(&mut self, row: Vec<ColumnValue>) -> Result<()> {
        ensure!(
            row.len() == self.names.len(),
            "row has {} values but the cursor has {} columns",
            row.len(),
            self.names.len()
        );
        self.rows.push(row);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rewinds to the unpositioned state.
    pub fn reset(&mut self) {
        self.position = None;
    }

    fn current(&self) -> Result<&[ColumnValue]> {
        match self.position.and_then(|p| self.rows.get(p)) {
            Some(row) => Ok(row),
            None => bail!("cursor is not positioned on a row"),
        }
    }
}

impl ResultCursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn name_at(&self, index: usize) -> Result<&str> {
        match self.names.get(index) {
            Some(name) => Ok(name),
            None => bail!(
                "column {} out of bounds ({} columns)",
                index,
                self.names.len()
            ),
        }
    }

    fn value_at(&self, index: usize) -> Result<&ColumnValue> {
        let row = self.current()?;
        match row.get(index) {
            Some(value) => Ok(value),
            None => bail!("column {} out of bounds ({} columns)", index, row.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> MemoryCursor {
        MemoryCursor::from_rows(
            ["Id", "Name"],
            vec![
                vec![ColumnValue::Int(1), ColumnValue::from("a")],
                vec![ColumnValue::Int(2), ColumnValue::from("b")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn reads_fail_before_first_advance() {
        let c = cursor();
        assert!(c.value_at(0).is_err());
        assert_eq!(c.name_at(1).unwrap(), "Name");
    }

    #[test]
    fn advances_through_rows_then_stops() {
        let mut c = cursor();
        assert!(c.advance().unwrap());
        assert_eq!(*c.value_at(0).unwrap(), 1);
        assert!(c.advance().unwrap());
        assert_eq!(*c.value_at(1).unwrap(), "b");
        assert!(!c.advance().unwrap());
        assert!(!c.advance().unwrap());
        assert!(c.value_at(0).is_err());
    }

    #[test]
    fn rejects_rows_of_the_wrong_width() {
        let mut c = MemoryCursor::new(["a", "b"]);
        assert!(c.push_row(vec![ColumnValue::Null]).is_err());
        assert_eq!(c.row_count(), 0);
    }

    #[test]
    fn out_of_bounds_column_is_an_error() {
        let mut c = cursor();
        c.advance().unwrap();
        assert!(c.value_at(5).is_err());
        assert!(c.name_at(5).is_err());
    }
}
