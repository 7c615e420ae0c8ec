//! # DashCache Sync Engine
//!
//! Sync orchestration for the DashCache record cache.
//!
//! This crate provides:
//! - Full sync (replace-all, fetch since 0) and incremental sync (fetch
//!   past the cursor) against a pluggable [`RecordSource`]
//! - A single-flight guard: at most one sync executes at any instant,
//!   concurrent triggers get all-zero counts back instead of queueing
//! - Per-collection failure isolation: one collection's fetch failure is
//!   logged and never aborts the others or the cycle
//! - A cancellable periodic background loop driving incremental syncs
//!
//! ## Key Invariants
//!
//! - The cursor advances after every sync attempt, even a fully failed one
//! - The watermark is wall-clock at cycle completion, not the maximum
//!   revision observed in a batch
//! - `full_sync` and `incremental_sync` never return an error
//! - An incremental sync with no prior watermark falls back to a full sync

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod scheduler;
mod source;

pub use config::SyncConfig;
pub use engine::{SyncCounts, SyncEngine, SyncStatus};
pub use error::{SourceError, SourceResult};
pub use source::{MockSource, RecordSource};
