//! RecordStore - actor that owns the SealStore
//!
//! Processes commands via channels so every append goes through one writer.

use std::path::Path;

use async_trait::async_trait;
use sealstore::SealStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::messages::{StoreCommand, StoreError, StoreResponse};
use super::repository::ContractRepository;
use crate::domain::{RecordKind, SealedRecord};

/// Handle to send commands to the RecordStore actor
#[derive(Clone)]
pub struct RecordStore {
    tx: mpsc::Sender<StoreCommand>,
}

impl RecordStore {
    /// Open the store at `store_path` and spawn its actor
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let store = SealStore::open(store_path.as_ref())?;
        info!(records = store.len(), "Opened record store");

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(actor_loop(store, rx));

        info!("RecordStore spawned");
        Ok(Self { tx })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<StoreResponse<T>>) -> StoreCommand,
    ) -> StoreResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StoreError::ChannelError)?;
        reply_rx.await.map_err(|_| StoreError::ChannelError)?
    }

    /// Shutdown the RecordStore
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("shutdown: called");
        self.tx
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| StoreError::ChannelError)
    }
}

#[async_trait]
impl ContractRepository for RecordStore {
    async fn put(&self, record: SealedRecord) -> StoreResponse<()> {
        debug!(id = %record.id(), "put: called");
        self.request(|reply| StoreCommand::Put { record, reply }).await
    }

    async fn get(&self, id: &str) -> StoreResponse<Option<SealedRecord>> {
        debug!(%id, "get: called");
        let id = id.to_string();
        self.request(|reply| StoreCommand::Get { id, reply }).await
    }

    async fn list(&self, kind: Option<RecordKind>) -> StoreResponse<Vec<SealedRecord>> {
        debug!(?kind, "list: called");
        self.request(|reply| StoreCommand::List { kind, reply }).await
    }
}

fn put_record(store: &mut SealStore, record: &SealedRecord) -> StoreResponse<()> {
    let id = record.id();
    if store.get(id).is_some() {
        return Err(StoreError::Duplicate(id.to_string()));
    }
    store.put_as(id, record).map_err(|e| StoreError::Store(format!("{:#}", e)))
}

fn list_records(store: &SealStore, kind: Option<RecordKind>) -> StoreResponse<Vec<SealedRecord>> {
    let mut records = Vec::new();
    for value in store.list(kind.map(RecordKind::tipo)) {
        match serde_json::from_value::<SealedRecord>(value.clone()) {
            Ok(record) => records.push(record),
            // Foreign or older shapes in the log are skipped, not fatal
            Err(e) => warn!(error = %e, "list_records: skipping undecodable record"),
        }
    }
    Ok(records)
}

async fn actor_loop(mut store: SealStore, mut rx: mpsc::Receiver<StoreCommand>) {
    debug!("RecordStore actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::Put { record, reply } => {
                debug!(id = %record.id(), "actor_loop: Put command");
                let _ = reply.send(put_record(&mut store, &record));
            }

            StoreCommand::Get { id, reply } => {
                debug!(%id, "actor_loop: Get command");
                let result = store
                    .get_as::<SealedRecord>(&id)
                    .map_err(|e| StoreError::Decode(format!("{:#}", e)));
                let _ = reply.send(result);
            }

            StoreCommand::List { kind, reply } => {
                debug!(?kind, "actor_loop: List command");
                let _ = reply.send(list_records(&store, kind));
            }

            StoreCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                info!("RecordStore shutting down");
                break;
            }
        }
    }

    debug!("RecordStore actor stopped");
}
