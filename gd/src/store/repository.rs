//! Keyed repository of sealed records

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{StoreError, StoreResponse};
use crate::domain::{RecordKind, SealedRecord};

/// Where sealed records are filed and looked up by id
///
/// Records are write-once: putting an id that already exists fails with
/// `StoreError::Duplicate`.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn put(&self, record: SealedRecord) -> StoreResponse<()>;

    async fn get(&self, id: &str) -> StoreResponse<Option<SealedRecord>>;

    /// Records in filing order, optionally restricted to one kind
    async fn list(&self, kind: Option<RecordKind>) -> StoreResponse<Vec<SealedRecord>>;
}

/// In-process repository
#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: HashMap<String, SealedRecord>,
    order: Vec<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }
}

#[async_trait]
impl ContractRepository for MemoryRepository {
    async fn put(&self, record: SealedRecord) -> StoreResponse<()> {
        debug!(id = %record.id(), "MemoryRepository::put: called");
        let mut inner = self.inner.lock().await;
        let id = record.id().to_string();
        if inner.records.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        inner.order.push(id.clone());
        inner.records.insert(id, record);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResponse<Option<SealedRecord>> {
        debug!(%id, "MemoryRepository::get: called");
        Ok(self.inner.lock().await.records.get(id).cloned())
    }

    async fn list(&self, kind: Option<RecordKind>) -> StoreResponse<Vec<SealedRecord>> {
        debug!(?kind, "MemoryRepository::list: called");
        let inner = self.inner.lock().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|r| kind.is_none_or(|k| r.kind() == k))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contract, Ticket};
    use chrono::{NaiveDate, NaiveTime};

    fn contract(id: &str) -> SealedRecord {
        SealedRecord::Contract(Contract {
            id: id.to_string(),
            mission: "Study".to_string(),
            kickoff: "20:00".to_string(),
            duration: "45 min".to_string(),
            sealed_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            sealed_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        })
    }

    fn ticket(id: &str) -> SealedRecord {
        SealedRecord::Ticket(Ticket {
            id: id.to_string(),
            activity: "Games".to_string(),
            minutes: 30,
            sealed_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            sealed_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let repo = MemoryRepository::new();
        repo.put(contract("CTR-AAAA")).await.unwrap();
        assert_eq!(repo.get("CTR-AAAA").await.unwrap(), Some(contract("CTR-AAAA")));
        assert_eq!(repo.get("CTR-ZZZZ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let repo = MemoryRepository::new();
        repo.put(contract("CTR-AAAA")).await.unwrap();
        let err = repo.put(contract("CTR-AAAA")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "CTR-AAAA"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_by_kind_in_filing_order() {
        let repo = MemoryRepository::new();
        repo.put(contract("CTR-BBBB")).await.unwrap();
        repo.put(ticket("TKT-AAAA")).await.unwrap();
        repo.put(contract("CTR-AAAA")).await.unwrap();

        let all = repo.list(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["CTR-BBBB", "TKT-AAAA", "CTR-AAAA"]);

        let contracts = repo.list(Some(RecordKind::Contract)).await.unwrap();
        assert_eq!(contracts.len(), 2);
    }
}
