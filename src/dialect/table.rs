//! Table DDL assembled from resolved column specs

use super::{Backend, ColumnSpec, Dialect, TimestampRole};
use crate::core::error::ConfigError;
use std::collections::HashSet;

/// A table keyed by a UUID `id` column
#[derive(Debug, Clone, Default)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Append `created_at` and `updated_at` with their default names
    pub fn with_timestamps(self, dialect: &Dialect) -> Self {
        self.column(dialect.timestamp_column(TimestampRole::Created, None))
            .column(dialect.timestamp_column(TimestampRole::Updated, None))
    }

    /// Render an idempotent `CREATE TABLE IF NOT EXISTS` statement
    pub fn create_table_sql(&self, dialect: &Dialect) -> Result<String, ConfigError> {
        let mut seen = HashSet::from(["id"]);
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.columns", self.name),
                    value: column.name.clone(),
                    message: "duplicate column name".to_string(),
                });
            }
        }

        let id_type = match dialect.backend() {
            Backend::Mysql => "CHAR(36)",
            Backend::Sqlite => "TEXT",
        };

        let mut lines = Vec::with_capacity(self.columns.len() + 1);
        lines.push(format!("id {} NOT NULL PRIMARY KEY", id_type));
        lines.extend(self.columns.iter().map(ColumnSpec::to_sql));

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            lines.join(",\n    ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{BooleanColumnOptions, ColumnKind};

    fn mail_addresses(dialect: &Dialect) -> TableDefinition {
        TableDefinition::new("mail_addresses")
            .column(ColumnSpec::new("address", "varchar").width(320))
            .column(dialect.column("signature", ColumnKind::MediumText).nullable())
            .column(dialect.boolean_as_int_column(BooleanColumnOptions::new("is_primary")))
            .with_timestamps(dialect)
    }

    #[test]
    fn test_create_table_mysql() {
        let dialect = Dialect::new(Backend::Mysql).unwrap();
        let sql = mail_addresses(&dialect).create_table_sql(&dialect).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS mail_addresses (\n    \
             id CHAR(36) NOT NULL PRIMARY KEY,\n    \
             address varchar(320) NOT NULL,\n    \
             signature mediumtext NULL,\n    \
             is_primary tinyint(1) NOT NULL DEFAULT 0,\n    \
             created_at timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP,\n    \
             updated_at timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP\n)"
        );
    }

    #[test]
    fn test_create_table_sqlite() {
        let dialect = Dialect::new(Backend::Sqlite).unwrap();
        let sql = mail_addresses(&dialect).create_table_sql(&dialect).unwrap();
        assert!(sql.contains("id TEXT NOT NULL PRIMARY KEY"));
        assert!(sql.contains("signature text NULL"));
        assert!(sql.contains("is_primary integer NOT NULL DEFAULT 0"));
        assert!(sql.contains("updated_at datetime NOT NULL DEFAULT CURRENT_TIMESTAMP\n)"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let dialect = Dialect::new(Backend::Sqlite).unwrap();
        let table = TableDefinition::new("t")
            .with_timestamps(&dialect)
            .with_timestamps(&dialect);
        match table.create_table_sql(&dialect) {
            Err(ConfigError::InvalidValue { value, .. }) => assert_eq!(value, "created_at"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_id_column_rejected() {
        let dialect = Dialect::new(Backend::Mysql).unwrap();
        let table = TableDefinition::new("t").column(ColumnSpec::new("id", "int"));
        assert!(table.create_table_sql(&dialect).is_err());
    }
}
