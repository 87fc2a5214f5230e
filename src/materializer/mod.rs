//! # Row Materializer
//!
//! Builds reusable row parsers: functions that read a window of columns from
//! a positioned cursor and construct one instance of a target type.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  row_parser::<T>(cursor, options)  ┌───────────────┐
//! │ Materializer  │ ─────────────────────────────────► │  ParserCache  │
//! │               │      key: (T, start, length,       │  (sharded)    │
//! │  registry ────┼──┐        null policy, layout)     └───────┬───────┘
//! └───────────────┘  │                                         │ miss
//!                    │                                         ▼
//!                    │                                  Plan::compile
//!                    ▼                                  (type walk, once)
//!             ConverterRegistry ◄──── RowParser<T>::parse(&cursor)
//!             (per leaf column)         reads bound columns only
//! ```
//!
//! ## Column Window
//!
//! A parser reads columns `[start, start + length)`, or every column from
//! `start` to the end of the row when no length is given. A window that does
//! not fit the cursor is rejected when the parser is built.
//!
//! ## Null-First Policy
//!
//! With `null_if_first_missing`, a NULL in the first column of the window
//! means "no object here" and `parse` returns `Ok(None)` without reading any
//! other column. This is how an optional joined entity is read from an outer
//! join.
//!
//! ## Sequencing
//!
//! Parsers never advance the cursor. Callers drive iteration, or use
//! `parse`/`parse_dynamic` for a lazy forward-only iterator that advances the
//! cursor it borrows and builds its parser on the first row.
//!
//! ## Usage
//!
//! ```ignore
//! let materializer = Materializer::new();
//! let parser = materializer.row_parser::<Foo, _>(&cursor, ParserOptions::new())?;
//! while cursor.advance()? {
//!     let foo = parser.parse(&cursor)?;
//! }
//!
//! for foo in materializer.parse::<Foo, _>(&mut cursor) {
//!     let foo = foo?;
//! }
//! ```

mod builder;
mod cache;
mod dispatch;
mod dynamic;
mod layout;
mod plan;
mod rows;

use std::any::{type_name, TypeId};
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

use eyre::{Result, WrapErr};
use tracing::{debug, trace};

use crate::converters::ConverterRegistry;
use crate::cursor::ResultCursor;
use crate::types::Model;

pub use builder::MaterializerBuilder;
pub use cache::ParserCache;
pub use dispatch::Discriminated;
pub use dynamic::{DynamicParser, DynamicRow};
pub use layout::Layout;
pub use rows::{RowReader, Rows};

use cache::ParserKey;
use layout::{cursor_fingerprint, resolve_window};
use plan::Plan;

/// Column window and null policy of a row parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParserOptions {
    start: usize,
    length: Option<usize>,
    null_if_first_missing: bool,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// First column of the window.
    pub fn starting_at(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Number of columns in the window; all remaining columns when unset.
    pub fn taking(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Treat a NULL first column as "no object".
    pub fn null_if_first_missing(mut self) -> Self {
        self.null_if_first_missing = true;
        self
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn is_null_if_first_missing(&self) -> bool {
        self.null_if_first_missing
    }
}

/// Entry point for building row parsers.
#[derive(Clone)]
pub struct Materializer {
    registry: Arc<ConverterRegistry>,
    cache: Arc<ParserCache>,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Materializer {
    /// Materializer with the ANSI dialect, the JSON serializer, and a
    /// private cache.
    pub fn new() -> Self {
        MaterializerBuilder::new().build()
    }

    pub fn builder() -> MaterializerBuilder {
        MaterializerBuilder::new()
    }

    pub(crate) fn from_parts(registry: Arc<ConverterRegistry>, cache: Arc<ParserCache>) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<ParserCache> {
        &self.cache
    }

    /// Typed parser for the cursor's current layout.
    ///
    /// The cache key is hashed straight from the cursor's names, so a hit
    /// neither copies the layout nor rebuilds `T`'s type description.
    pub fn row_parser<T, C>(&self, cursor: &C, options: ParserOptions) -> Result<RowParser<T>>
    where
        T: Model,
        C: ResultCursor + ?Sized,
    {
        let target = type_name::<T>();
        let window = resolve_window(cursor.column_count(), &options, target)?;
        let fingerprint = cursor_fingerprint(cursor, window.clone())?;
        self.typed_parser(window, fingerprint, options, || Layout::of(cursor))
    }

    /// Typed parser for a layout snapshot.
    pub fn row_parser_for_layout<T: Model>(
        &self,
        layout: &Layout,
        options: ParserOptions,
    ) -> Result<RowParser<T>> {
        let window = layout.window(&options, type_name::<T>())?;
        let fingerprint = layout.fingerprint(window.clone());
        self.typed_parser(window, fingerprint, options, || Ok(layout.clone()))
    }

    fn typed_parser<T, F>(
        &self,
        window: Range<usize>,
        fingerprint: u64,
        options: ParserOptions,
        layout: F,
    ) -> Result<RowParser<T>>
    where
        T: Model,
        F: FnOnce() -> Result<Layout>,
    {
        let target = type_name::<T>();
        let key = ParserKey {
            type_id: TypeId::of::<T>(),
            start: options.start(),
            length: options.length(),
            null_if_first_missing: options.is_null_if_first_missing(),
            layout: fingerprint,
        };

        let mut compiled = false;
        let plan = self
            .cache
            .get_or_compile(key, || {
                compiled = true;
                let layout = layout()?;
                let plan = Plan::compile(&T::field_type(), &layout.columns(window.clone()))?;
                debug!(
                    target_type = target,
                    start = window.start,
                    end = window.end,
                    bound = plan.bound_columns(),
                    "compiled row parser"
                );
                Ok(plan)
            })
            .wrap_err_with(|| format!("failed to build a row parser for {}", target))?;
        if !compiled {
            trace!(target_type = target, start = window.start, "row parser cache hit");
        }

        Ok(RowParser {
            plan,
            registry: Arc::clone(&self.registry),
            start: window.start,
            null_if_first_missing: options.is_null_if_first_missing(),
            target,
            _marker: PhantomData,
        })
    }

    /// Untyped parser for the cursor's current layout.
    pub fn dynamic_parser<C>(&self, cursor: &C, options: ParserOptions) -> Result<DynamicParser>
    where
        C: ResultCursor + ?Sized,
    {
        let layout = Layout::of(cursor)?;
        let window = layout.window(&options, "dynamic row")?;
        Ok(DynamicParser::new(
            layout.window_names(window.clone()),
            window,
            options.is_null_if_first_missing(),
        ))
    }

    /// Lazy typed rows over every remaining row of `cursor`.
    pub fn parse<'a, T, C>(&'a self, cursor: &'a mut C) -> Rows<'a, C, RowParser<T>>
    where
        T: Model,
        C: ResultCursor + ?Sized,
    {
        Rows::new(self, cursor, ParserOptions::new())
    }

    /// Lazy typed rows with explicit options. Rows the null-first policy
    /// reports as absent are skipped.
    pub fn parse_with<'a, T, C>(
        &'a self,
        cursor: &'a mut C,
        options: ParserOptions,
    ) -> Rows<'a, C, RowParser<T>>
    where
        T: Model,
        C: ResultCursor + ?Sized,
    {
        Rows::new(self, cursor, options)
    }

    /// Lazy untyped rows over every remaining row of `cursor`.
    pub fn parse_dynamic<'a, C>(&'a self, cursor: &'a mut C) -> Rows<'a, C, DynamicParser>
    where
        C: ResultCursor + ?Sized,
    {
        Rows::new(self, cursor, ParserOptions::new())
    }

    /// Per-row dispatch on the value of the `column` discriminator.
    pub fn discriminated<K, B, C>(
        &self,
        cursor: &C,
        column: &str,
        options: ParserOptions,
    ) -> Result<Discriminated<K, B>>
    where
        K: Model + PartialEq,
        C: ResultCursor + ?Sized,
    {
        Discriminated::new(self.clone(), Layout::of(cursor)?, column, options)
    }
}

/// Compiled parser producing `T` from the current row.
pub struct RowParser<T> {
    plan: Arc<Plan>,
    registry: Arc<ConverterRegistry>,
    start: usize,
    null_if_first_missing: bool,
    target: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RowParser<T> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            registry: Arc::clone(&self.registry),
            start: self.start,
            null_if_first_missing: self.null_if_first_missing,
            target: self.target,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for RowParser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowParser")
            .field("target", &self.target)
            .field("start", &self.start)
            .field("null_if_first_missing", &self.null_if_first_missing)
            .field("plan", &self.plan)
            .finish()
    }
}

impl<T: Model> RowParser<T> {
    /// Materializes the current row. Returns `None` only under the
    /// null-first policy.
    pub fn parse<C: ResultCursor + ?Sized>(&self, cursor: &C) -> Result<Option<T>> {
        if self.null_if_first_missing && cursor.value_at(self.start)?.is_null() {
            return Ok(None);
        }
        let value = self.plan.execute(&self.registry, cursor)?;
        let instance =
            T::from_value(value).wrap_err_with(|| format!("failed to construct {}", self.target))?;
        Ok(Some(instance))
    }

    /// Whether both parsers share one compiled plan.
    pub fn shares_plan_with(&self, other: &RowParser<T>) -> bool {
        Arc::ptr_eq(&self.plan, &other.plan)
    }
}
