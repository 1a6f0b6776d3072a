//! In-memory implementation of RecordStore for testing and development

use crate::core::{Entity, RecordStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory record store
///
/// Uses RwLock for thread-safe access. `find_by_ids` returns records in the
/// order their ids were requested.
#[derive(Clone)]
pub struct InMemoryRecordStore<T> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryRecordStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    pub fn insert(&self, record: T) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.insert(record.id(), record);
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> RecordStore<T> for InMemoryRecordStore<T> {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn save_all(&self, batch: Vec<T>) -> Result<Vec<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        for record in &batch {
            records.insert(record.id(), record.clone());
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: Uuid,
        body: String,
        at: DateTime<Utc>,
    }

    impl Entity for Note {
        fn resource_name() -> &'static str {
            "note"
        }

        fn id(&self) -> Uuid {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn updated_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            None
        }
    }

    fn note(body: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            body: body.to_string(),
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_missing_and_keeps_order() {
        let (a, b) = (note("a"), note("b"));
        let store = InMemoryRecordStore::with_records([a.clone(), b.clone()]);

        let found = store
            .find_by_ids(&[b.id, Uuid::new_v4(), a.id])
            .await
            .unwrap();
        assert_eq!(found, vec![b, a]);
    }

    #[tokio::test]
    async fn test_save_all_upserts() {
        let store = InMemoryRecordStore::new();
        let mut a = note("a");
        store.insert(a.clone()).unwrap();

        a.body = "changed".to_string();
        let fresh = note("fresh");
        let saved = store.save_all(vec![a.clone(), fresh.clone()]).await.unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a.id).unwrap().unwrap().body, "changed");
        assert!(store.get(&fresh.id).unwrap().is_some());
    }

    #[test]
    fn test_empty_store() {
        let store: InMemoryRecordStore<Note> = InMemoryRecordStore::default();
        assert!(store.is_empty());
    }
}
