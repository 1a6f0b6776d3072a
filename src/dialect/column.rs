//! Column specifications built through a [`Dialect`]

use super::{Backend, ColumnKind, Dialect};
use serde::{Deserialize, Serialize};

/// Default clause for a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// A literal, rendered as-is (quote strings yourself)
    Literal(String),
    /// `CURRENT_TIMESTAMP`
    CurrentTimestamp,
}

impl ColumnDefault {
    fn to_sql(&self) -> &str {
        match self {
            ColumnDefault::Literal(value) => value,
            ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }
}

/// How a JSON column stores its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonStorage {
    /// Engine-native JSON type
    Native,
    /// Serialized JSON in a text column, (de)serialized by the caller
    SerializedText,
}

/// A fully resolved column, ready to render into DDL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: String,
    pub width: Option<u32>,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    /// MySQL `ON UPDATE` clause
    pub on_update: Option<ColumnDefault>,
    /// Set on JSON columns only
    pub json_storage: Option<JsonStorage>,
    /// MySQL `COMMENT` clause
    pub comment: Option<String>,
}

impl ColumnSpec {
    /// A NOT NULL column of an explicit physical type
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            width: None,
            nullable: false,
            default: None,
            on_update: None,
            json_storage: None,
            comment: None,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Render the column definition, e.g. `flag tinyint(1) NOT NULL DEFAULT 0`
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type);
        if let Some(width) = self.width {
            sql.push_str(&format!("({})", width));
        }
        sql.push_str(if self.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default.to_sql());
        }
        if let Some(on_update) = &self.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(on_update.to_sql());
        }
        if let Some(comment) = &self.comment {
            sql.push_str(&format!(" COMMENT '{}'", comment.replace('\'', "''")));
        }
        sql
    }
}

/// Which bookkeeping timestamp a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampRole {
    Created,
    Updated,
}

impl TimestampRole {
    pub fn default_name(&self) -> &'static str {
        match self {
            TimestampRole::Created => "created_at",
            TimestampRole::Updated => "updated_at",
        }
    }
}

/// Options for a boolean stored as an integer
#[derive(Debug, Clone)]
pub struct BooleanColumnOptions {
    pub name: String,
    pub default: bool,
    pub nullable: bool,
    /// Column comment; SQLite has no column comments and ignores it
    pub comment: Option<String>,
}

impl BooleanColumnOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: false,
            nullable: false,
            comment: None,
        }
    }

    pub fn default_value(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Options for a JSON column
#[derive(Debug, Clone)]
pub struct JsonColumnOptions {
    pub name: String,
    /// Ask for the engine-native `json` type
    pub native_type: bool,
    pub nullable: bool,
}

impl JsonColumnOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: false,
            nullable: true,
        }
    }

    pub fn native(mut self) -> Self {
        self.native_type = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

impl Dialect {
    /// A NOT NULL column of the given logical kind
    pub fn column(&self, name: impl Into<String>, kind: ColumnKind) -> ColumnSpec {
        ColumnSpec::new(name, self.resolve_column_type(kind))
    }

    /// `created_at` / `updated_at` column, optionally renamed
    ///
    /// MySQL gets an explicit `timestamp`, and the updated column refreshes
    /// itself on every write. SQLite keeps its native `datetime`.
    pub fn timestamp_column(&self, role: TimestampRole, name: Option<&str>) -> ColumnSpec {
        let name = name.unwrap_or(role.default_name());
        let mut spec = self
            .column(name, ColumnKind::Timestamp)
            .default_value(ColumnDefault::CurrentTimestamp);

        if self.is_mysql() && role == TimestampRole::Updated {
            spec.on_update = Some(ColumnDefault::CurrentTimestamp);
        }
        spec
    }

    /// Boolean stored as `tinyint(1)` on MySQL and `integer` on SQLite
    pub fn boolean_as_int_column(&self, options: BooleanColumnOptions) -> ColumnSpec {
        let default = if options.default { "1" } else { "0" };
        let mut spec = self
            .column(options.name, ColumnKind::BooleanAsInt)
            .default_value(ColumnDefault::Literal(default.to_string()));

        if self.is_mysql() {
            spec.width = Some(1);
            spec.comment = options.comment;
        }
        spec.nullable = options.nullable;
        spec
    }

    /// JSON column
    ///
    /// A request for the native type is dropped on SQLite, which keeps JSON
    /// as serialized text.
    pub fn json_column(&self, options: JsonColumnOptions) -> ColumnSpec {
        let mut spec = self.column(options.name, ColumnKind::Json);
        spec.nullable = options.nullable;
        spec.json_storage = Some(match self.backend() {
            Backend::Mysql => JsonStorage::Native,
            Backend::Sqlite => {
                if options.native_type {
                    tracing::debug!(
                        column = %spec.name,
                        "native json type requested on sqlite; storing as text"
                    );
                }
                JsonStorage::SerializedText
            }
        });
        spec
    }
}
