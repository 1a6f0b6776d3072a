//! Entity traits shared by every persisted record

use crate::core::field::FieldValue;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all persisted records.
///
/// All entities have:
/// - id: Unique identifier
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
/// - deleted_at: Soft deletion timestamp (optional)
pub trait Entity: Clone + Send + Sync + 'static {
    /// The singular resource name (e.g., "mail_address")
    fn resource_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Get the deletion timestamp (soft delete)
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Check if the entity has been soft-deleted
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// A record that can rebuild its derived reference fields from its own state.
///
/// Used by [`ReferenceRepairer`](crate::repair::ReferenceRepairer): a
/// replacement field is cleared wherever its legacy field is set, then
/// [`recompute`](Repairable::recompute) fills it in again.
#[async_trait]
pub trait Repairable: Entity {
    /// Read a field by name; `None` if the record has no such field
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Set a field to null
    ///
    /// Errors with [`RepairError::UnknownField`](crate::core::error::RepairError)
    /// when the field does not exist or cannot be null.
    fn clear_field(&mut self, field: &str) -> Result<()>;

    /// Recompute derived fields from the rest of the record
    async fn recompute(&mut self) -> Result<()>;
}
