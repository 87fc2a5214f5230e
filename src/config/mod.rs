//! # Configuration Module
//!
//! This module centralizes all configuration constants. Constants are grouped
//! by their functional area and interdependencies are enforced through
//! compile-time assertions.
//!
//! ## Module Organization
//!
//! - [`constants`]: Column definition defaults and parser cache sizing

pub mod constants;
pub use constants::*;
