//! Batch repair of denormalized reference fields
//!
//! After a schema or data change leaves a derived reference field stale, the
//! [`ReferenceRepairer`] reloads the affected records, clears the replacement
//! field wherever its legacy field is still set, lets each record recompute
//! itself, and writes the whole batch back.
//!
//! ```rust,ignore
//! let repairer = ReferenceRepairer::new(Arc::new(store));
//! let report = repairer
//!     .repair_references(&ids, &FieldRepairMap::single("domain", "domain_key"))
//!     .await?;
//! tracing::info!("{}", report);
//! ```

pub mod field_map;

pub use field_map::FieldRepairMap;

use crate::core::error::RepairError;
use crate::core::{RecordStore, Repairable};
use anyhow::Result;
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a repair run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Distinct ids asked for
    pub requested: usize,
    /// Records actually loaded, recomputed and saved
    pub processed: usize,
}

impl RepairReport {
    /// Ids that had no matching record
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.processed)
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repaired {} of {} record(s)",
            self.processed, self.requested
        )
    }
}

/// Recomputes replacement reference fields for batches of records
///
/// Concurrent runs over overlapping ids are not coordinated: the last save
/// wins. Callers that need a deadline wrap the call in `tokio::time::timeout`.
pub struct ReferenceRepairer<T: Repairable> {
    store: Arc<dyn RecordStore<T>>,
}

impl<T: Repairable> Clone for ReferenceRepairer<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Repairable> ReferenceRepairer<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self { store }
    }

    /// Repair the records in `ids` according to `fields`
    ///
    /// Records are handled one at a time in load order. If any record fails
    /// to recompute, its error is returned as-is and nothing is saved.
    pub async fn repair_references(
        &self,
        ids: &[Uuid],
        fields: &FieldRepairMap,
    ) -> Result<RepairReport> {
        if fields.is_empty() {
            return Err(RepairError::EmptyFieldMap.into());
        }

        let ids: Vec<Uuid> = ids.iter().copied().collect::<IndexSet<_>>().into_iter().collect();
        if ids.is_empty() {
            tracing::debug!(entity = T::resource_name(), "no ids given, nothing to repair");
            return Ok(RepairReport {
                requested: 0,
                processed: 0,
            });
        }

        let mut records = self.store.find_by_ids(&ids).await?;
        let loaded = records.len();
        let mut seen = IndexSet::with_capacity(loaded);
        records.retain(|record| seen.insert(record.id()));
        if records.len() < loaded {
            tracing::debug!(
                entity = T::resource_name(),
                duplicates = loaded - records.len(),
                "store returned duplicate rows, keeping the first of each"
            );
        }
        tracing::debug!(
            entity = T::resource_name(),
            requested = ids.len(),
            loaded = records.len(),
            "loaded records for reference repair"
        );

        for record in records.iter_mut() {
            let record_id = record.id();
            for (legacy, replacement) in fields.iter() {
                let legacy_set = record
                    .field_value(legacy)
                    .is_some_and(|value| value.is_truthy());
                if legacy_set {
                    record.clear_field(replacement)?;
                    tracing::debug!(
                        record_id = %record_id,
                        legacy = legacy,
                        replacement = replacement,
                        "cleared replacement field"
                    );
                }
            }

            if let Err(e) = record.recompute().await {
                tracing::warn!(
                    record_id = %record_id,
                    error = %e,
                    "recompute failed, aborting reference repair"
                );
                return Err(e);
            }
        }

        let processed = records.len();
        if processed > 0 {
            self.store.save_all(records).await?;
        }

        let report = RepairReport {
            requested: ids.len(),
            processed,
        };
        tracing::info!(
            entity = T::resource_name(),
            requested = report.requested,
            processed = report.processed,
            "{}",
            report
        );
        Ok(report)
    }
}
