//! # Dialect Quoting
//!
//! Converters never hard-code SQL syntax. They go through a `Dialect` for the
//! two things that differ between databases: how a string literal is quoted
//! and what the widest text column is called.
//!
//! ## Literal Rendering
//!
//! | Column value | ANSI literal |
//! |--------------|--------------|
//! | NULL | `NULL` |
//! | Int / Float | `42`, `3.5` (`'NaN'`, `'Infinity'` quoted) |
//! | Bool | `TRUE` / `FALSE` |
//! | Text | `'it''s'` |
//! | Blob | `X'deadbeef'` |
//!
//! Literals are for direct embedding only; bound parameters go through
//! `Converter::to_storage_value` instead.

use crate::config::DEFAULT_MAX_TEXT_LENGTH;
use crate::types::ColumnValue;

/// Dialect-specific quoting and column declarations.
pub trait Dialect: Send + Sync {
    fn quote_literal(&self, text: &str) -> String;

    fn max_text_column_definition(&self) -> String;

    fn text_column_definition(&self, length: u32) -> String {
        format!("VARCHAR({})", length)
    }

    fn blob_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{:02x}", byte)).collect();
        format!("X'{}'", hex)
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "TRUE" } else { "FALSE" }.to_string()
    }

    fn column_literal(&self, value: &ColumnValue) -> String {
        match value {
            ColumnValue::Null => "NULL".to_string(),
            ColumnValue::Bool(b) => self.bool_literal(*b),
            ColumnValue::Int(i) => i.to_string(),
            ColumnValue::Float(f) => {
                if f.is_nan() {
                    self.quote_literal("NaN")
                } else if f.is_infinite() {
                    if f.is_sign_positive() {
                        self.quote_literal("Infinity")
                    } else {
                        self.quote_literal("-Infinity")
                    }
                } else {
                    f.to_string()
                }
            }
            ColumnValue::Text(s) => self.quote_literal(s),
            ColumnValue::Blob(b) => self.blob_literal(b),
        }
    }
}

/// Standard SQL quoting with a configurable maximum text width.
#[derive(Debug, Clone)]
pub struct AnsiDialect {
    max_text_length: u32,
}

impl Default for AnsiDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsiDialect {
    pub fn new() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }

    pub fn with_max_text_length(max_text_length: u32) -> Self {
        Self { max_text_length }
    }
}

impl Dialect for AnsiDialect {
    fn quote_literal(&self, text: &str) -> String {
        let escaped = text.replace('\'', "''");
        format!("'{}'", escaped)
    }

    fn max_text_column_definition(&self) -> String {
        self.text_column_definition(self.max_text_length)
    }
}
