//! Core types and reconciliation engine for calfeed.
//!
//! This crate turns iCalendar feed text into normalized [`EventRecord`]s,
//! derives a stable [`Signature`] for each of them, and reconciles feed state
//! against whatever an [`EventStore`] currently holds for a category:
//! - `feed` parses raw feed text
//! - `signature` computes identity keys
//! - `reconcile` diffs feed signatures against stored signatures
//! - `sync` drives one fetch/parse/reconcile/apply pass per category

pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod reconcile;
pub mod record;
pub mod signature;
pub mod store;
pub mod sync;

// Re-exports for convenience
pub use self::config::{Cadence, CalfeedConfig, FeedConfig};
pub use error::{CalFeedError, CalFeedResult};
pub use fetch::{FeedFetcher, HttpFetcher};
pub use reconcile::{ReconcilePlan, UpdatePolicy};
pub use record::*;
pub use signature::{Signature, signature};
pub use store::{EventStore, FileStore, MemoryStore};
pub use sync::{FeedSync, PurgeResult, PurgeScope, SyncOptions, SyncResult, purge};
