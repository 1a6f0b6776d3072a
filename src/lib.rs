//! # this-common
//!
//! Shared building blocks for services that run on either MySQL or SQLite.
//!
//! ## Features
//!
//! - **Dialect mapping**: logical column kinds resolved to backend types, plus
//!   column specs and SQL fragments (`GROUP_CONCAT`, string concatenation)
//! - **Reference repair**: batch recomputation of stale derived reference fields
//! - **Maintenance gate**: 503 responses while the service is under maintenance
//! - **Auth guard**: pluggable authentication strategies as axum middleware
//! - **Webhooks**: mail-address lifecycle events fanned out to HTTP endpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_common::prelude::*;
//!
//! let config = AppConfig::from_yaml_file("config/app.yaml")?;
//! let dialect = config.dialect()?;
//!
//! let table = TableDefinition::new("mail_addresses")
//!     .column(dialect.column("address", ColumnKind::MediumText))
//!     .column(dialect.json_column(JsonColumnOptions::new("metadata")))
//!     .with_timestamps(&dialect);
//! let ddl = table.create_table_sql(&dialect)?;
//!
//! let repairer = ReferenceRepairer::new(Arc::new(InMemoryRecordStore::<MailAddress>::new()));
//! let report = repairer
//!     .repair_references(&ids, &FieldRepairMap::single("domain", "domain_key"))
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod entities;
pub mod notify;
pub mod repair;
pub mod server;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{AuthContext, AuthGuard, AuthPolicy, AuthProvider, NoAuthProvider},
        entity::{Entity, Repairable},
        error::{CommonError, ConfigError, RepairError, RequestError},
        events::{EventBus, EventEnvelope, MailAddressEvent},
        field::{FieldFormat, FieldValue},
        service::RecordStore,
    };

    // === Dialect ===
    pub use crate::dialect::{
        Backend, BooleanColumnOptions, ColumnKind, ColumnSpec, Dialect, GroupConcat,
        JsonColumnOptions, TableDefinition, TimestampRole,
    };

    // === Repair ===
    pub use crate::repair::{FieldRepairMap, ReferenceRepairer, RepairReport};

    // === Entities ===
    pub use crate::entities::MailAddress;

    // === Storage ===
    pub use crate::storage::InMemoryRecordStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::notify::{MailAddressNotifier, WebhookSink};
    pub use crate::server::{MaintenanceGate, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        http::HeaderMap,
        routing::{delete, get, post, put},
    };
}
