//! Core types, errors, and utilities for swatch.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Error types for configuration validation
//! - Configuration structures for the watcher and the delivery server
//! - The recognized stylesheet extension set
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extensions;
pub mod hash;

pub use config::{Config, ServerConfig, WatchConfig, FAST_POLL_INTERVAL_MS};
pub use error::ConfigError;
pub use extensions::StylesheetExtensions;
pub use hash::{fx_hash_map, fx_hash_set, FxHashMap, FxHashSet};
