//! SealStore - append-only store for sealed planning records
//!
//! Every sealed record (contract, transition plan, ticket) is a JSON object
//! carrying a string `id` and a `tipo` tag. Records are appended to a single
//! JSONL log; the in-memory index is rebuilt by replaying the log on open, so
//! a later line for the same id replaces the earlier one.
//!
//! # Layout
//!
//! ```text
//! {store_dir}/
//! └── records.jsonl    # one sealed record per line
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sealstore::SealStore;
//!
//! let mut store = SealStore::open("~/.local/share/guardian")?;
//! store.put("CTR-4KQ2", &record)?;
//! let found = store.get("CTR-4KQ2");
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{SealStore, StoreStats};

/// Name of the record log inside the store directory
pub const RECORD_LOG: &str = "records.jsonl";
