//! # avail-store
//!
//! Backing store adapter for the external tabular store.
//!
//! The store offers exactly three operations: whole-table read, batched
//! append, and delete-by-row-index. There is no query pushdown, so the
//! repositories in this crate read the full table and filter in memory;
//! batching round trips matters more than minimizing bytes transferred.
//!
//! ## Overview
//!
//! - `client` - the three-operation `TableStore` trait with an HTTP
//!   implementation (`HttpTableStore`) and an in-memory one for tests and
//!   local development (`MemoryTableStore`)
//! - `models` - row layouts and entity conversions
//! - `repositories` - implementations of the `avail-core` repository ports

pub mod client;
pub mod models;
pub mod repositories;

// Re-export commonly used types
pub use client::{HttpTableStore, MemoryTableStore, Row, StoreError, StoreResult, Table, TableStore};
pub use repositories::{SheetPollRepository, SheetRecordRepository};
