//! # Conversion Configuration Constants
//!
//! This module centralizes the defaults used by the converters, the dialect,
//! and the row parser cache. Constants that depend on each other are
//! co-located and checked at compile time.
//!
//! ## Dependency Graph
//!
//! ```text
//! DEFAULT_ENUM_COLUMN_LENGTH (255)
//!       │
//!       └─> must be <= DEFAULT_MAX_TEXT_LENGTH
//!             An enum label column can never be wider than the widest
//!             text column the dialect declares.
//!
//! ROW_VERSION_WIDTH (8 bytes)
//!       │
//!       └─> ROW_VERSION_COLUMN_DEFINITION (BIGINT)
//!             A binary stamp reinterpreted as u64 needs exactly 8 bytes.
//!
//! PARSER_CACHE_SHARD_COUNT (16)
//!       │
//!       └─> power of two, shard = hash & (count - 1)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{DEFAULT_ENUM_COLUMN_LENGTH, ROW_VERSION_WIDTH};
//! ```

// ============================================================================
// COLUMN DEFINITIONS
// ============================================================================

/// Width of the text column an enumeration label is stored in when no
/// explicit length is declared.
pub const DEFAULT_ENUM_COLUMN_LENGTH: u32 = 255;

/// Length used by `AnsiDialect` for its maximum-width text declaration.
pub const DEFAULT_MAX_TEXT_LENGTH: u32 = 8000;

/// Column declaration for row-version stamps.
pub const ROW_VERSION_COLUMN_DEFINITION: &str = "BIGINT";

/// Byte width of a binary row-version stamp.
pub const ROW_VERSION_WIDTH: usize = 8;

const _: () = assert!(
    DEFAULT_ENUM_COLUMN_LENGTH <= DEFAULT_MAX_TEXT_LENGTH,
    "enum label columns must fit in the widest text column"
);

const _: () = assert!(
    ROW_VERSION_WIDTH == std::mem::size_of::<u64>(),
    "row-version stamps are reinterpreted as u64"
);

// ============================================================================
// ROW PARSER CACHE
// ============================================================================

/// Number of independently locked shards in the row parser cache.
pub const PARSER_CACHE_SHARD_COUNT: usize = 16;

const _: () = assert!(
    PARSER_CACHE_SHARD_COUNT.is_power_of_two(),
    "PARSER_CACHE_SHARD_COUNT must be a power of two"
);

/// Inline capacity for the column bindings of one compiled plan.
pub const INLINE_BINDINGS: usize = 16;
