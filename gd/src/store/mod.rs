//! Sealed record repository
//!
//! `RecordStore` is an actor owning the on-disk SealStore; `MemoryRepository`
//! keeps records in process. Both implement `ContractRepository`.

mod manager;
mod messages;
mod repository;

pub use manager::RecordStore;
pub use messages::{StoreCommand, StoreError, StoreResponse};
pub use repository::{ContractRepository, MemoryRepository};
