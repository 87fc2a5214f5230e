//! Column layout snapshot taken from a cursor when a parser is built.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use eyre::{bail, Result};

use super::ParserOptions;
use crate::cursor::ResultCursor;
use crate::error::ConvertError;

/// Ordered column names of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    names: Arc<[String]>,
}

impl Layout {
    pub fn of<C: ResultCursor + ?Sized>(cursor: &C) -> Result<Self> {
        let names = (0..cursor.column_count())
            .map(|i| cursor.name_at(i).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            names: names.into(),
        })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            names: names.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the first column named `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .or_else(|| self.names.iter().position(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Resolves the options' column window against this layout.
    pub(crate) fn window(&self, options: &ParserOptions, target: &str) -> Result<Range<usize>> {
        resolve_window(self.len(), options, target)
    }

    /// Columns inside `window`, with their absolute indexes.
    pub(crate) fn columns(&self, window: Range<usize>) -> Vec<(usize, &str)> {
        window.map(|i| (i, self.names[i].as_str())).collect()
    }

    pub(crate) fn window_names(&self, window: Range<usize>) -> Arc<[String]> {
        self.names[window].iter().cloned().collect()
    }

    /// Hash of the column names inside `window`.
    pub(crate) fn fingerprint(&self, window: Range<usize>) -> u64 {
        let mut hasher = window_hasher(window.start);
        for name in &self.names[window] {
            name.as_str().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Resolves the options' column window against a row of `column_count`
/// columns.
pub(crate) fn resolve_window(
    column_count: usize,
    options: &ParserOptions,
    target: &str,
) -> Result<Range<usize>> {
    let start = options.start();
    let end = match options.length() {
        Some(length) => start.saturating_add(length),
        None => column_count,
    };
    if start > column_count || end > column_count {
        bail!(ConvertError::MissingColumn {
            column: format!("#{}", start.max(column_count)),
            target: target.to_string(),
        });
    }
    Ok(start..end)
}

fn window_hasher(start: usize) -> DefaultHasher {
    let mut hasher = DefaultHasher::new();
    start.hash(&mut hasher);
    hasher
}

/// Same hash as [`Layout::fingerprint`], read straight from the cursor
/// without copying names.
pub(crate) fn cursor_fingerprint<C: ResultCursor + ?Sized>(
    cursor: &C,
    window: Range<usize>,
) -> Result<u64> {
    let mut hasher = window_hasher(window.start);
    for index in window {
        cursor.name_at(index)?.hash(&mut hasher);
    }
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_prefers_exact_then_ignores_case() {
        let layout = Layout::from_names(["name", "Name", "VALUE"]);
        assert_eq!(layout.find("Name"), Some(1));
        assert_eq!(layout.find("NAME"), Some(0));
        assert_eq!(layout.find("value"), Some(2));
        assert_eq!(layout.find("missing"), None);
    }

    #[test]
    fn window_defaults_to_remaining_columns() {
        let layout = Layout::from_names(["a", "b", "c"]);
        assert_eq!(layout.window(&ParserOptions::new().starting_at(1), "T").unwrap(), 1..3);
        assert_eq!(
            layout.window(&ParserOptions::new().starting_at(1).taking(1), "T").unwrap(),
            1..2
        );
    }

    #[test]
    fn window_past_the_end_is_missing_column() {
        let layout = Layout::from_names(["a", "b"]);
        let err = layout
            .window(&ParserOptions::new().starting_at(1).taking(2), "T")
            .unwrap_err();
        assert!(matches!(
            crate::error::convert_error(&err),
            Some(ConvertError::MissingColumn { .. })
        ));
        assert!(layout.window(&ParserOptions::new().starting_at(3), "T").is_err());
    }

    #[test]
    fn cursor_and_snapshot_fingerprints_agree() {
        let cursor = crate::cursor::MemoryCursor::new(["x", "Name", "Value"]);
        let layout = Layout::of(&cursor).unwrap();
        assert_eq!(
            cursor_fingerprint(&cursor, 1..3).unwrap(),
            layout.fingerprint(1..3)
        );
        assert_ne!(
            cursor_fingerprint(&cursor, 0..3).unwrap(),
            layout.fingerprint(1..3)
        );
    }

    #[test]
    fn fingerprint_tracks_names_in_window() {
        let a = Layout::from_names(["x", "Name", "Value"]);
        let b = Layout::from_names(["y", "Name", "Value"]);
        let c = Layout::from_names(["x", "Name", "Other"]);
        assert_eq!(a.fingerprint(1..3), b.fingerprint(1..3));
        assert_ne!(a.fingerprint(1..3), c.fingerprint(1..3));
    }
}
