//! # Dynamic Rows
//!
//! Untyped materialization: a row is kept as its raw column values, addressed
//! by position or by name, in column order. No enum or opaque decoding is
//! attempted.
//!
//! ```ignore
//! let mut rows = materializer.parse_dynamic(&mut cursor);
//! let row = rows.next().unwrap()?;
//! assert!(row["Type"] == 1);
//! assert_eq!(row.get_text("Name")?, "abc");
//! ```

use std::ops::{Index, Range};
use std::sync::Arc;

use eyre::{bail, Result};

use crate::converters::primitive::exact_float;
use crate::cursor::ResultCursor;
use crate::error::ConvertError;
use crate::types::ColumnValue;

/// One materialized row without a target type.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRow {
    names: Arc<[String]>,
    values: Vec<ColumnValue>,
}

impl DynamicRow {
    pub fn new(names: Arc<[String]>, values: Vec<ColumnValue>) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ColumnValue> {
        self.values
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .or_else(|| self.names.iter().position(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Value of the column named `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.position(name).and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    fn require(&self, name: &str) -> Result<&ColumnValue> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => bail!(ConvertError::MissingColumn {
                column: name.to_string(),
                target: "dynamic row".to_string(),
            }),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            ColumnValue::Int(i) => Ok(*i),
            other => bail!(ConvertError::type_mismatch(
                other.kind().name(),
                "i64",
                format!("column '{}' holds {}", name, other),
            )),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f64> {
        match self.require(name)? {
            ColumnValue::Float(f) => Ok(*f),
            ColumnValue::Int(i) => match exact_float(*i) {
                Some(f) => Ok(f),
                None => bail!(ConvertError::type_mismatch(
                    "int",
                    "f64",
                    format!("column '{}' holds {}, which f64 cannot represent exactly", name, i),
                )),
            },
            other => bail!(ConvertError::type_mismatch(
                other.kind().name(),
                "f64",
                format!("column '{}' holds {}", name, other),
            )),
        }
    }

    pub fn get_text(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            ColumnValue::Text(s) => Ok(s),
            other => bail!(ConvertError::type_mismatch(
                other.kind().name(),
                "text",
                format!("column '{}' holds {}", name, other),
            )),
        }
    }

    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.get(name), Some(ColumnValue::Null))
    }
}

impl Index<usize> for DynamicRow {
    type Output = ColumnValue;

    fn index(&self, index: usize) -> &ColumnValue {
        &self.values[index]
    }
}

/// Panics when no column has that name, like `HashMap` indexing.
impl Index<&str> for DynamicRow {
    type Output = ColumnValue;

    fn index(&self, name: &str) -> &ColumnValue {
        match self.position(name) {
            Some(i) => &self.values[i],
            None => panic!("no column named '{}'", name),
        }
    }
}

/// Untyped parser over a fixed column window.
#[derive(Debug, Clone)]
pub struct DynamicParser {
    names: Arc<[String]>,
    window: Range<usize>,
    null_if_first_missing: bool,
}

impl DynamicParser {
    pub(crate) fn new(names: Arc<[String]>, window: Range<usize>, null_if_first_missing: bool) -> Self {
        Self {
            names,
            window,
            null_if_first_missing,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Copies the window of the current row. Returns `None` only when the
    /// parser was built to treat a NULL first column as "no row".
    pub fn parse<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<Option<DynamicRow>> {
        if self.null_if_first_missing && cursor.value_at(self.window.start)?.is_null() {
            return Ok(None);
        }
        let values = self
            .window
            .clone()
            .map(|i| cursor.value_at(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(DynamicRow::new(Arc::clone(&self.names), values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::MemoryCursor;

    fn row() -> DynamicRow {
        DynamicRow::new(
            vec!["Name".to_string(), "Type".to_string(), "Value".to_string()].into(),
            vec![ColumnValue::from("abc"), ColumnValue::Int(1), ColumnValue::Float(3.0)],
        )
    }

    #[test]
    fn columns_are_addressable_by_name_and_position() {
        let r = row();
        assert!(r["Type"] == 1);
        assert!(r["type"] == 1);
        assert!(r[2] == 3.0);
        assert_eq!(r.get_text("name").unwrap(), "abc");
        assert_eq!(r.get_float("Value").unwrap(), 3.0);
        assert!(r.get("Missing").is_none());
    }

    #[test]
    fn typed_getters_report_mismatches() {
        let r = row();
        assert!(r.get_int("Name").is_err());
        let err = r.get_int("Missing").unwrap_err();
        assert!(matches!(
            crate::error::convert_error(&err),
            Some(ConvertError::MissingColumn { .. })
        ));
    }

    #[test]
    fn float_getter_refuses_lossy_integers() {
        let r = DynamicRow::new(
            vec!["big".to_string(), "small".to_string()].into(),
            vec![ColumnValue::Int((1 << 53) + 1), ColumnValue::Int(42)],
        );
        assert!(r.get_float("big").is_err());
        assert_eq!(r.get_float("small").unwrap(), 42.0);
    }

    #[test]
    fn iteration_preserves_column_order() {
        let r = row();
        let names: Vec<&str> = r.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Name", "Type", "Value"]);
    }

    #[test]
    fn parser_copies_only_its_window() {
        let mut cursor = MemoryCursor::from_rows(
            ["Id", "Name"],
            vec![vec![ColumnValue::Int(5), ColumnValue::from("x")]],
        )
        .unwrap();
        cursor.advance().unwrap();
        let parser = DynamicParser::new(vec!["Name".to_string()].into(), 1..2, false);
        let r = parser.parse(&cursor).unwrap().unwrap();
        assert_eq!(r.len(), 1);
        assert!(r["Name"] == "x");
    }
}
