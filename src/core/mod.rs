//! Core module containing fundamental traits and types

pub mod auth;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod service;

pub use auth::{
    ApiKeyProvider, AuthContext, AuthGuard, AuthPolicy, AuthProvider, HeaderUserProvider,
    NoAuthProvider,
};
pub use entity::{Entity, Repairable};
pub use error::{CommonError, CommonResult, ConfigError, RepairError, RequestError};
pub use events::{EventBus, EventEnvelope, MailAddressEvent};
pub use field::{FieldFormat, FieldValue};
pub use service::RecordStore;
