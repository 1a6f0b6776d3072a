//! Mail address entity

use crate::core::error::RepairError;
use crate::core::events::MailAddressEvent;
use crate::core::{Entity, FieldValue, Repairable};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Errors raised by mail address operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MailAddressError {
    #[error("mail address '{address}' has no domain part")]
    MissingDomain { address: String },

    #[error("invalid mail address: {0}")]
    Invalid(String),
}

/// A mail address owned by the application
///
/// `domain` is the legacy free-text domain column. `domain_key` replaces it
/// and is always derived from `address` by [`Repairable::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MailAddress {
    pub id: Uuid,

    #[validate(email)]
    pub address: String,

    #[validate(length(max = 255))]
    pub display_name: Option<String>,

    pub domain: Option<String>,

    pub domain_key: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MailAddress {
    pub fn new(address: impl Into<String>, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            display_name,
            domain: None,
            domain_key: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Run field validation, flattening the errors into one message
    pub fn check(&self) -> Result<(), MailAddressError> {
        self.validate()
            .map_err(|e| MailAddressError::Invalid(e.to_string()))
    }

    /// Lowercased domain part of `address`
    pub fn domain_part(&self) -> Option<String> {
        self.address
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim().to_lowercase())
            .filter(|domain| !domain.is_empty())
    }

    pub fn created_event(&self) -> MailAddressEvent {
        MailAddressEvent::Created {
            address_id: self.id,
            address: self.address.clone(),
            data: serde_json::to_value(self).unwrap_or_default(),
        }
    }

    pub fn updated_event(&self) -> MailAddressEvent {
        MailAddressEvent::Updated {
            address_id: self.id,
            address: self.address.clone(),
            data: serde_json::to_value(self).unwrap_or_default(),
        }
    }

    pub fn deleted_event(&self) -> MailAddressEvent {
        MailAddressEvent::Deleted {
            address_id: self.id,
            address: self.address.clone(),
        }
    }
}

impl Entity for MailAddress {
    fn resource_name() -> &'static str {
        "mail_address"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

#[async_trait]
impl Repairable for MailAddress {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "address" => Some(FieldValue::String(self.address.clone())),
            "display_name" => Some(self.display_name.clone().into()),
            "domain" => Some(self.domain.clone().into()),
            "domain_key" => Some(self.domain_key.clone().into()),
            _ => None,
        }
    }

    fn clear_field(&mut self, field: &str) -> Result<()> {
        match field {
            "display_name" => self.display_name = None,
            "domain" => self.domain = None,
            "domain_key" => self.domain_key = None,
            _ => {
                return Err(RepairError::UnknownField {
                    record_id: self.id,
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    async fn recompute(&mut self) -> Result<()> {
        if self.domain_key.is_some() {
            return Ok(());
        }

        let domain = self
            .domain_part()
            .ok_or_else(|| MailAddressError::MissingDomain {
                address: self.address.clone(),
            })?;
        self.domain_key = Some(domain);
        self.updated_at = Utc::now();
        Ok(())
    }
}
