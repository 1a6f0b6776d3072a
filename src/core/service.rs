//! Data-access traits

use crate::core::Entity;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Batch access to persisted records of one type
///
/// Implementations wrap whatever actually stores the records. The framework
/// only needs to load a set of records and write them back in one call.
#[async_trait]
pub trait RecordStore<T: Entity>: Send + Sync {
    /// Load the records whose id is in `ids`
    ///
    /// Ids with no matching record are skipped silently, so the result can be
    /// shorter than `ids`. Result order is up to the implementation.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>>;

    /// Persist a batch of records in one operation
    async fn save_all(&self, records: Vec<T>) -> Result<Vec<T>>;
}
