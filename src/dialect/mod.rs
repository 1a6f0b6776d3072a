//! Database-dialect abstraction
//!
//! Call sites describe columns by logical [`ColumnKind`] and ask a [`Dialect`]
//! for the physical type, column spec or SQL fragment. Only this module
//! branches on [`Backend`].
//!
//! # Backends
//!
//! - [`Backend::Mysql`]: the full-featured backend used in production
//! - [`Backend::Sqlite`]: the embedded backend used for tests and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use this_common::dialect::{Backend, ColumnKind, Dialect};
//!
//! let dialect = Dialect::new(Backend::Sqlite)?;
//! assert_eq!(dialect.resolve_column_type(ColumnKind::LongText), "text");
//! assert_eq!(dialect.concat(&["first_name", "' '", "last_name"]), "first_name || ' ' || last_name");
//! ```

pub mod column;
pub mod expr;
pub mod table;

pub use column::{
    BooleanColumnOptions, ColumnDefault, ColumnSpec, JsonColumnOptions, JsonStorage,
    TimestampRole,
};
pub use expr::GroupConcat;
pub use table::TableDefinition;

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which database engine the process talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Full-featured backend (MySQL / MariaDB)
    Mysql,
    /// Lightweight embedded backend (SQLite)
    Sqlite,
}

impl Backend {
    /// Every supported backend
    pub const ALL: [Backend; 2] = [Backend::Mysql, Backend::Sqlite];

    /// Parse a connection type as found in configuration
    ///
    /// Accepts the driver aliases commonly used for each engine.
    pub fn parse(connection_type: &str) -> Result<Self, ConfigError> {
        match connection_type.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Backend::Mysql),
            "sqlite" | "sqljs" | "better-sqlite3" => Ok(Backend::Sqlite),
            other => Err(ConfigError::InvalidValue {
                field: "database.connection_type".to_string(),
                value: other.to_string(),
                message: "expected one of: mysql, mariadb, sqlite, sqljs, better-sqlite3"
                    .to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Mysql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::parse(s)
    }
}

const KIND_COUNT: usize = 6;

/// Backend-independent column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnKind {
    LongText,
    MediumText,
    Timestamp,
    TinyInt,
    BooleanAsInt,
    Json,
}

impl ColumnKind {
    /// Every logical kind, in table order
    pub const ALL: [ColumnKind; KIND_COUNT] = [
        ColumnKind::LongText,
        ColumnKind::MediumText,
        ColumnKind::Timestamp,
        ColumnKind::TinyInt,
        ColumnKind::BooleanAsInt,
        ColumnKind::Json,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ColumnKind::LongText => "long-text",
            ColumnKind::MediumText => "medium-text",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::TinyInt => "tiny-int",
            ColumnKind::BooleanAsInt => "boolean-as-int",
            ColumnKind::Json => "json",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ColumnKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "column kind".to_string(),
                value: s.to_string(),
                message: "not a recognized logical column kind".to_string(),
            })
    }
}

/// Physical type for every (kind, backend) pair
pub(crate) const TYPE_MAP: &[(ColumnKind, Backend, &str)] = &[
    (ColumnKind::LongText, Backend::Mysql, "longtext"),
    (ColumnKind::LongText, Backend::Sqlite, "text"),
    (ColumnKind::MediumText, Backend::Mysql, "mediumtext"),
    (ColumnKind::MediumText, Backend::Sqlite, "text"),
    (ColumnKind::Timestamp, Backend::Mysql, "timestamp"),
    (ColumnKind::Timestamp, Backend::Sqlite, "datetime"),
    (ColumnKind::TinyInt, Backend::Mysql, "tinyint"),
    (ColumnKind::TinyInt, Backend::Sqlite, "integer"),
    (ColumnKind::BooleanAsInt, Backend::Mysql, "tinyint"),
    (ColumnKind::BooleanAsInt, Backend::Sqlite, "integer"),
    (ColumnKind::Json, Backend::Mysql, "json"),
    (ColumnKind::Json, Backend::Sqlite, "text"),
];

/// Column mapping resolved for one backend
///
/// Built once at startup from the configured backend, then passed by value
/// to whatever defines schemas or builds queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    backend: Backend,
    types: [&'static str; KIND_COUNT],
}

impl Dialect {
    /// Resolve the mapping table for `backend`
    ///
    /// Fails if any logical kind lacks an entry for this backend.
    pub fn new(backend: Backend) -> Result<Self, ConfigError> {
        Self::from_table(backend, TYPE_MAP)
    }

    pub(crate) fn from_table(
        backend: Backend,
        table: &[(ColumnKind, Backend, &'static str)],
    ) -> Result<Self, ConfigError> {
        let mut types = [""; KIND_COUNT];
        for kind in ColumnKind::ALL {
            let physical = table
                .iter()
                .find(|(k, b, _)| *k == kind && *b == backend)
                .map(|(_, _, physical)| *physical)
                .ok_or_else(|| ConfigError::MissingField {
                    field: kind.tag().to_string(),
                    context: format!("column type map for backend '{}'", backend),
                })?;
            types[kind.index()] = physical;
        }

        tracing::debug!(backend = %backend, "column type map resolved");
        Ok(Self { backend, types })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Physical type for a logical kind on this backend
    pub fn resolve_column_type(&self, kind: ColumnKind) -> &'static str {
        self.types[kind.index()]
    }

    /// Physical type for a logical kind given by its tag (e.g. `"long-text"`)
    pub fn resolve_column_type_tag(&self, tag: &str) -> Result<&'static str, ConfigError> {
        let kind: ColumnKind = tag.parse()?;
        Ok(self.resolve_column_type(kind))
    }

    fn is_mysql(&self) -> bool {
        self.backend == Backend::Mysql
    }
}
