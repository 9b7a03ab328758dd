//! Change-detection engine for swatch.
//!
//! This crate is the core of the system: it discovers stylesheet files under
//! a set of watched roots, polls each one for metadata changes on an adaptive
//! two-tier cadence, and reports every detected change through a
//! [`ChangeNotifier`] so connected clients can be told to reload.
//!
//! Detection is purely stat-based. No filesystem event API is used: every
//! watched file gets its own polling task that compares successive metadata
//! snapshots (modification time and link count).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ WatchEngine                                                  │
//! │                                                              │
//! │  rescan timer ──► walk_tree ───► WatchRegistry               │
//! │  (20s default)    (async DFS)    (path -> WatchEntry)        │
//! │                                       │ register_if_absent   │
//! │                                       ▼                      │
//! │                              per-file detector task          │
//! │                              (2000ms normal / 100ms fast)    │
//! │                                       │ modified             │
//! │                                       ▼                      │
//! │                              ChangeNotifier::notify_changed  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sw_core::{StylesheetExtensions, WatchConfig};
//! use sw_watcher::{NullNotifier, WatchEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = WatchConfig {
//!         roots: vec!["./public".into()],
//!         ..WatchConfig::default()
//!     };
//!     let engine = WatchEngine::new(
//!         config,
//!         StylesheetExtensions::default(),
//!         Arc::new(NullNotifier),
//!     );
//!
//!     engine.run(CancellationToken::new()).await;
//! }
//! ```
//!
//! # Concurrency
//!
//! The [`WatchRegistry`] is the only shared mutable structure; all of its
//! operations are applied atomically under an internal lock. Each watched
//! file polls independently, so a slow stat on one path never delays
//! detection on another. Unregistering a path cancels its polling task via
//! an explicit [`CancellationToken`](tokio_util::sync::CancellationToken).

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod detector;
pub mod engine;
pub mod error;
pub mod notify;
pub mod registry;
pub mod tier;
pub mod walker;

pub use detector::Classification;
pub use engine::{RescanSummary, WatchEngine};
pub use error::WalkFailure;
pub use notify::{ChangeNotifier, CountingNotifier, NullNotifier};
pub use registry::{FileSnapshot, WatchRegistry};
pub use tier::{PollTier, FAST_POLL_INTERVAL};
pub use walker::{walk_tree, WalkOutcome};
