//! # DashCache Core
//!
//! In-memory record cache for the analytics dashboard.
//!
//! This crate provides:
//! - Three independent record collections (`rewriter`, `adoption`,
//!   `feedback`) with identity-keyed merge semantics
//! - A monotonic sync cursor shared across the collections
//! - A bounded log of recent sync errors
//! - Best-effort snapshot persistence of the sync metadata
//!
//! ## Key Invariants
//!
//! - No two records in a collection share an identity key
//! - Merging is idempotent: the later value wins, nothing duplicates
//! - The cursor only ever advances
//! - Persistence failures never escape; a missing or corrupt snapshot is
//!   a cold start
//!
//! Record payloads are deliberately not persisted. A restart restores the
//! cursor and error log only, and every collection starts empty.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod collection;
mod error;
mod record;
mod snapshot;

pub use cache::{unix_now, RecordCache, ERROR_LOG_CAPACITY};
pub use error::{CacheError, CacheResult};
pub use record::{CollectionKind, Record};
pub use snapshot::{RecordCounts, Snapshot};
