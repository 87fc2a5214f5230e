//! # Materializer Builder
//!
//! Fluent configuration for a `Materializer`.
//!
//! ## Configuration Options
//!
//! | Option     | Default          | Description                                  |
//! |------------|------------------|----------------------------------------------|
//! | dialect    | `AnsiDialect`    | Literal quoting and text column declarations |
//! | serializer | `JsonSerializer` | Encoding of opaque and composite columns     |
//! | cache      | private cache    | Shared `ParserCache` for compiled parsers    |
//!
//! ## Usage
//!
//! ```ignore
//! let cache = Arc::new(ParserCache::new());
//! let materializer = Materializer::builder()
//!     .dialect(AnsiDialect::with_max_text_length(4000))
//!     .cache(Arc::clone(&cache))
//!     .build();
//! ```
//!
//! Materializers built with the same cache share compiled parsers; they
//! should then also share a dialect and serializer, because a cached plan
//! does not record which converters it was built with.

use std::sync::Arc;

use super::{Materializer, ParserCache};
use crate::converters::{ConverterContext, ConverterRegistry};
use crate::dialect::{AnsiDialect, Dialect};
use crate::serializer::{JsonSerializer, StructuredSerializer};

/// Builder for a `Materializer`.
pub struct MaterializerBuilder {
    dialect: Option<Arc<dyn Dialect>>,
    serializer: Option<Arc<dyn StructuredSerializer>>,
    cache: Option<Arc<ParserCache>>,
}

impl Default for MaterializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterializerBuilder {
    pub fn new() -> Self {
        Self {
            dialect: None,
            serializer: None,
            cache: None,
        }
    }

    pub fn dialect<D: Dialect + 'static>(mut self, dialect: D) -> Self {
        self.dialect = Some(Arc::new(dialect));
        self
    }

    pub fn serializer<S: StructuredSerializer + 'static>(mut self, serializer: S) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Shares a parser cache with other materializers.
    pub fn cache(mut self, cache: Arc<ParserCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Materializer {
        let dialect = self
            .dialect
            .unwrap_or_else(|| Arc::new(AnsiDialect::new()));
        let serializer = self
            .serializer
            .unwrap_or_else(|| Arc::new(JsonSerializer::new()));
        let registry = ConverterRegistry::new(ConverterContext::new(dialect, serializer));
        let cache = self.cache.unwrap_or_default();
        Materializer::from_parts(Arc::new(registry), cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn defaults_use_ansi_dialect() {
        let m = MaterializerBuilder::new().build();
        assert_eq!(
            m.registry().column_definition(&FieldType::TEXT, None),
            "VARCHAR(8000)"
        );
    }

    #[test]
    fn dialect_is_applied_to_converters() {
        let m = Materializer::builder()
            .dialect(AnsiDialect::with_max_text_length(1000))
            .build();
        assert_eq!(
            m.registry().column_definition(&FieldType::TEXT, None),
            "VARCHAR(1000)"
        );
    }

    #[test]
    fn shared_cache_is_used_by_every_materializer() {
        let cache = Arc::new(ParserCache::new());
        let a = Materializer::builder().cache(Arc::clone(&cache)).build();
        let b = Materializer::builder().cache(Arc::clone(&cache)).build();
        assert!(Arc::ptr_eq(a.cache(), b.cache()));
    }
}
