//! In-memory [`PlanStore`] for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::PlanRecord;
use crate::store::{PlanStore, StoreError};

/// HashMap-backed store with the same observable semantics as the Postgres
/// implementation: put is upsert, scan returns newest first.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    records: RwLock<HashMap<Uuid, PlanRecord>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn put(&self, record: &PlanRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PlanRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn scan(&self, limit: usize) -> Result<Vec<PlanRecord>, StoreError> {
        let mut records: Vec<PlanRecord> = self.records.read().await.values().cloned().collect();
        // Newest first; id as a tiebreak so the order is stable when two
        // records share a creation instant.
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records.truncate(limit);
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocValue;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn record(title: &str) -> PlanRecord {
        let details = DocValue::from_json(&json!({"plantType": "refinery"})).unwrap();
        PlanRecord::new(title, details)
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let store = MemoryPlanStore::new();
        let rec = record("Unit 2 Turnaround");
        store.put(&rec).await.unwrap();

        let loaded = store.get(rec.id).await.unwrap().expect("record present");
        assert_eq!(loaded, rec);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = MemoryPlanStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_is_upsert() {
        let store = MemoryPlanStore::new();
        let mut rec = record("before");
        store.put(&rec).await.unwrap();

        rec.title = "after".to_owned();
        store.put(&rec).await.unwrap();

        assert_eq!(store.len().await, 1);
        let loaded = store.get(rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "after");
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryPlanStore::new();
        let rec = record("doomed");
        store.put(&rec).await.unwrap();

        assert!(store.delete(rec.id).await.unwrap());
        assert!(!store.delete(rec.id).await.unwrap());
        assert!(store.get(rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scan_returns_newest_first_and_respects_limit() {
        let store = MemoryPlanStore::new();
        let base = Utc::now();
        for i in 0..5 {
            let mut rec = record(&format!("plan {i}"));
            rec.created_at = base + Duration::seconds(i);
            rec.updated_at = rec.created_at;
            store.put(&rec).await.unwrap();
        }

        let listed = store.scan(3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "plan 4");
        assert_eq!(listed[1].title, "plan 3");
        assert_eq!(listed[2].title, "plan 2");
    }
}
