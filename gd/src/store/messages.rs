//! Record store messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{RecordKind, SealedRecord};

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from repository operations
pub type StoreResponse<T> = Result<T, StoreError>;

/// Commands sent to the RecordStore actor
#[derive(Debug)]
pub enum StoreCommand {
    Put {
        record: SealedRecord,
        reply: oneshot::Sender<StoreResponse<()>>,
    },
    Get {
        id: String,
        reply: oneshot::Sender<StoreResponse<Option<SealedRecord>>>,
    },
    List {
        kind: Option<RecordKind>,
        reply: oneshot::Sender<StoreResponse<Vec<SealedRecord>>>,
    },
    Shutdown,
}
