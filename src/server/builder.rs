//! ServerBuilder for fluent API to build HTTP servers

use super::guard::auth_layer;
use super::maintenance::{MaintenanceGate, maintenance_layer};
use crate::config::AppConfig;
use crate::core::auth::AuthGuard;
use crate::core::error::ConfigError;
use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder wrapping application routes with the shared gates
///
/// Layering, outermost first: request tracing, maintenance gate, then the
/// auth guard around application routes. Health routes skip the auth guard.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_yaml_file("config/app.yaml")?;
/// let app = ServerBuilder::from_config(&config)?
///     .with_routes(mail_address_routes(state))
///     .build();
/// ```
pub struct ServerBuilder {
    maintenance: Option<MaintenanceGate>,
    auth_guard: Option<AuthGuard>,
    routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            maintenance: None,
            auth_guard: None,
            routes: Vec::new(),
        }
    }

    /// Gate and guard taken from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .with_maintenance(MaintenanceGate::from_config(&config.maintenance))
            .with_auth_guard(AuthGuard::from_config(&config.auth)?))
    }

    /// Set the maintenance gate; keep a clone to toggle it at runtime
    pub fn with_maintenance(mut self, gate: MaintenanceGate) -> Self {
        self.maintenance = Some(gate);
        self
    }

    pub fn with_auth_guard(mut self, guard: AuthGuard) -> Self {
        self.auth_guard = Some(guard);
        self
    }

    /// Add application routes; they sit behind the auth guard
    pub fn with_routes(mut self, routes: Router) -> Self {
        self.routes.push(routes);
        self
    }

    pub fn build(self) -> Router {
        let mut protected = Router::new();
        for routes in self.routes {
            protected = protected.merge(routes);
        }
        if let Some(guard) = self.auth_guard {
            protected = protected.layer(middleware::from_fn_with_state(guard, auth_layer));
        }

        let mut app = health_routes().merge(protected);
        if let Some(gate) = self.maintenance {
            app = app.layer(middleware::from_fn_with_state(gate, maintenance_layer));
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown on SIGTERM / Ctrl+C
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "this-common"
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_rejects_unknown_strategy() {
        let mut config = AppConfig::default();
        config.auth.strategies = vec!["kerberos".to_string()];
        assert!(ServerBuilder::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_requires_explicit_strategy() {
        assert!(ServerBuilder::from_config(&AppConfig::default()).is_err());

        let mut config = AppConfig::default();
        config.auth.strategies = vec!["api-key".to_string()];
        assert!(ServerBuilder::from_config(&config).is_ok());
    }

    #[test]
    fn test_build_without_gates() {
        let _app: Router = ServerBuilder::default().with_routes(Router::new()).build();
    }
}
