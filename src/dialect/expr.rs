//! SQL expression fragments whose syntax differs between backends

use super::{Backend, Dialect};

/// Options for a grouped string aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConcat {
    pub separator: String,
    pub distinct: bool,
    /// Only honored on MySQL; SQLite's `group_concat` has no ordering clause
    pub order_by: Option<String>,
}

impl Default for GroupConcat {
    fn default() -> Self {
        Self {
            separator: ", ".to_string(),
            distinct: true,
            order_by: None,
        }
    }
}

impl GroupConcat {
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Dialect {
    /// Aggregate `column` into one delimited string per group
    ///
    /// ```text
    /// mysql:  GROUP_CONCAT(DISTINCT col ORDER BY o SEPARATOR ', ')
    /// sqlite: group_concat(DISTINCT col, ', ')
    /// ```
    ///
    /// SQLite limits `DISTINCT` aggregates to one argument, so the distinct
    /// form above renders but fails when SQLite executes it. Callers that need
    /// a custom separator on SQLite use `distinct(false)`.
    pub fn group_concat(&self, column: &str, options: &GroupConcat) -> String {
        let distinct = if options.distinct { "DISTINCT " } else { "" };
        let separator = quote_literal(&options.separator);

        match self.backend() {
            Backend::Mysql => {
                let order_by = options
                    .order_by
                    .as_deref()
                    .map(|expr| format!(" ORDER BY {}", expr))
                    .unwrap_or_default();
                format!(
                    "GROUP_CONCAT({}{}{} SEPARATOR {})",
                    distinct, column, order_by, separator
                )
            }
            Backend::Sqlite => {
                if let Some(order_by) = &options.order_by {
                    tracing::debug!(
                        column = %column,
                        order_by = %order_by,
                        "group_concat ordering is not supported on sqlite; dropped"
                    );
                }
                format!("group_concat({}{}, {})", distinct, column, separator)
            }
        }
    }

    /// String concatenation of already-rendered SQL expressions
    pub fn concat<S: AsRef<str>>(&self, parts: &[S]) -> String {
        match parts {
            [] => "''".to_string(),
            [single] => single.as_ref().to_string(),
            _ => {
                let parts: Vec<&str> = parts.iter().map(|p| p.as_ref()).collect();
                match self.backend() {
                    Backend::Mysql => format!("CONCAT({})", parts.join(", ")),
                    Backend::Sqlite => parts.join(" || "),
                }
            }
        }
    }
}
