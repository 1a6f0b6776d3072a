//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::field::{FieldFormat, FieldValue};
use crate::dialect::{Backend, Dialect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver name, e.g. "mysql" or "sqlite"
    pub connection_type: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_type: "mysql".to_string(),
        }
    }
}

/// Maintenance-mode gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Message returned to callers while the gate is closed
    #[serde(default = "default_maintenance_message")]
    pub message: String,

    /// Path prefixes that stay reachable during maintenance
    #[serde(default)]
    pub allow_paths: Vec<String>,

    /// Seconds clients should wait before retrying
    #[serde(default)]
    pub retry_after: Option<u64>,
}

fn default_maintenance_message() -> String {
    "The service is under maintenance, please try again later".to_string()
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            message: default_maintenance_message(),
            allow_paths: Vec::new(),
            retry_after: None,
        }
    }
}

/// Authentication guard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Strategies tried in order: "api-key", "header", "none"
    ///
    /// Empty by default; a deployment must pick at least one. "header" trusts
    /// identity headers as sent, so enable it only behind a proxy that strips
    /// and re-injects them.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,

    /// Policy string, see `AuthPolicy::parse_policy`
    #[serde(default = "default_policy")]
    pub policy: String,

    /// API key → service name
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

fn default_strategies() -> Vec<String> {
    Vec::new()
}

fn default_policy() -> String {
    "authenticated".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            policy: default_policy(),
            api_keys: HashMap::new(),
        }
    }
}

/// Outgoing webhook targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// URLs notified on mail-address lifecycle events
    #[serde(default)]
    pub mail_address: Vec<String>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub webhooks: WebhookConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            },
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment
    ///
    /// - `DB_CONNECTION`: database connection type
    /// - `MAINTENANCE_MODE`: `true`/`1`/`on` to enable the gate
    /// - `MAINTENANCE_MESSAGE`: gate message
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (used by tests instead of the real env)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(connection_type) = lookup("DB_CONNECTION") {
            self.database.connection_type = connection_type;
        }
        if let Some(mode) = lookup("MAINTENANCE_MODE") {
            self.maintenance.enabled = matches!(
                mode.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "on" | "yes"
            );
        }
        if let Some(message) = lookup("MAINTENANCE_MESSAGE") {
            self.maintenance.message = message;
        }
    }

    /// Backend identity for this process
    pub fn backend(&self) -> Result<Backend, ConfigError> {
        Backend::parse(&self.database.connection_type)
    }

    /// Resolved dialect for the configured backend
    pub fn dialect(&self) -> Result<Dialect, ConfigError> {
        Dialect::new(self.backend()?)
    }

    /// Check every section, reporting the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dialect()?;

        for (index, url) in self.webhooks.mail_address.iter().enumerate() {
            if !FieldFormat::Url.validate(&FieldValue::String(url.clone())) {
                return Err(ConfigError::InvalidValue {
                    field: format!("webhooks.mail_address[{}]", index),
                    value: url.clone(),
                    message: "expected an http(s) URL".to_string(),
                });
            }
        }

        if self.auth.strategies.is_empty() {
            return Err(ConfigError::MissingField {
                field: "strategies".to_string(),
                context: "auth".to_string(),
            });
        }

        Ok(())
    }
}
