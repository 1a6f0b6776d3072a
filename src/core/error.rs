//! Typed error handling for this-common
//!
//! Every fallible operation in the crate reports one of the categories below,
//! wrapped in [`CommonError`] when it has to cross an HTTP boundary.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: configuration parsing, backend identity, dialect table gaps
//! - [`RepairError`]: reference-repair preconditions and record field access
//! - [`RequestError`]: authentication, authorization and maintenance gating
//!
//! # Example
//!
//! ```rust,ignore
//! use this_common::core::error::{CommonError, ConfigError};
//!
//! match Backend::parse("oracle") {
//!     Ok(backend) => println!("using {}", backend),
//!     Err(ConfigError::InvalidValue { value, .. }) => eprintln!("unsupported: {}", value),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for this-common
#[derive(Debug)]
pub enum CommonError {
    /// Configuration errors
    Config(ConfigError),

    /// Reference repair errors
    Repair(RepairError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonError::Config(e) => write!(f, "{}", e),
            CommonError::Repair(e) => write!(f, "{}", e),
            CommonError::Request(e) => write!(f, "{}", e),
            CommonError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CommonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommonError::Config(e) => Some(e),
            CommonError::Repair(e) => Some(e),
            CommonError::Request(e) => Some(e),
            CommonError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CommonError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommonError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CommonError::Repair(e) => e.status_code(),
            CommonError::Request(e) => e.status_code(),
            CommonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CommonError::Config(_) => "CONFIG_ERROR",
            CommonError::Repair(e) => e.error_code(),
            CommonError::Request(e) => e.error_code(),
            CommonError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CommonError::Repair(RepairError::UnknownField { record_id, field }) => {
                Some(serde_json::json!({
                    "record_id": record_id.to_string(),
                    "field": field
                }))
            }
            CommonError::Request(RequestError::ServiceUnavailable { retry_after, .. }) => {
                retry_after.map(|secs| serde_json::json!({ "retry_after": secs }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CommonError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration and schema definition
///
/// These are raised at startup or schema-construction time and are not meant
/// to be recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required entry in configuration or in a mapping table
    MissingField {
        field: String,
        context: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound {
        path: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::MissingField { field, context } => {
                write!(f, "Missing required field '{}' in {}", field, context)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CommonError {
    fn from(err: ConfigError) -> Self {
        CommonError::Config(err)
    }
}

// =============================================================================
// Repair Errors
// =============================================================================

/// Errors raised by the reference repair utility itself
///
/// A failing record recompute is not represented here: the record's own error
/// is returned to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairError {
    /// The legacy → replacement field map was empty
    EmptyFieldMap,

    /// A record was asked to clear a field it does not have
    UnknownField {
        record_id: Uuid,
        field: String,
    },
}

impl fmt::Display for RepairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairError::EmptyFieldMap => {
                write!(f, "Reference repair needs at least one legacy → replacement field pair")
            }
            RepairError::UnknownField { record_id, field } => {
                write!(f, "Record '{}' has no field '{}'", record_id, field)
            }
        }
    }
}

impl std::error::Error for RepairError {}

impl RepairError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RepairError::EmptyFieldMap => StatusCode::BAD_REQUEST,
            RepairError::UnknownField { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RepairError::EmptyFieldMap => "REPAIR_EMPTY_FIELD_MAP",
            RepairError::UnknownField { .. } => "REPAIR_UNKNOWN_FIELD",
        }
    }
}

impl From<RepairError> for CommonError {
    fn from(err: RepairError) -> Self {
        CommonError::Repair(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP request handling
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// No usable credentials
    Unauthorized {
        message: String,
    },

    /// Credentials present but not sufficient
    Forbidden {
        message: String,
    },

    /// The service is in maintenance mode
    ServiceUnavailable {
        message: String,
        retry_after: Option<u64>,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RequestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RequestError::ServiceUnavailable { message, .. } => {
                write!(f, "Service unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<RequestError> for CommonError {
    fn from(err: RequestError) -> Self {
        CommonError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

/// Convert from anyhow::Error, keeping typed errors when they are inside
impl From<anyhow::Error> for CommonError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<ConfigError>() {
            return CommonError::Config(e.clone());
        }
        if let Some(e) = err.downcast_ref::<RepairError>() {
            return CommonError::Repair(e.clone());
        }
        if let Some(e) = err.downcast_ref::<RequestError>() {
            return CommonError::Request(e.clone());
        }
        CommonError::Internal(err.to_string())
    }
}

/// A specialized Result type for this-common operations
pub type CommonResult<T> = Result<T, CommonError>;
