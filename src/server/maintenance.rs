//! Maintenance-mode gate
//!
//! While the gate is closed every request gets `503 Service Unavailable`
//! except health checks and the configured allow-list.

use crate::config::MaintenanceConfig;
use crate::core::error::{CommonError, RequestError};
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::RETRY_AFTER;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const ALWAYS_ALLOWED: &[&str] = &["/health", "/healthz"];

#[derive(Debug)]
struct GateInner {
    enabled: AtomicBool,
    message: String,
    allow_paths: Vec<String>,
    retry_after: Option<u64>,
}

/// Shared maintenance switch
///
/// Cloning shares the same switch, so a handle kept by an admin task can
/// open or close the gate for a running router.
#[derive(Debug, Clone)]
pub struct MaintenanceGate {
    inner: Arc<GateInner>,
}

impl MaintenanceGate {
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self {
            inner: Arc::new(GateInner {
                enabled: AtomicBool::new(config.enabled),
                message: config.message.clone(),
                allow_paths: config
                    .allow_paths
                    .iter()
                    .map(|prefix| prefix.trim_end_matches('/').to_string())
                    .collect(),
                retry_after: config.retry_after,
            }),
        }
    }

    pub fn enable(&self) {
        self.inner.enabled.store(true, Ordering::SeqCst);
        tracing::warn!("maintenance mode enabled");
    }

    pub fn disable(&self) {
        self.inner.enabled.store(false, Ordering::SeqCst);
        tracing::info!("maintenance mode disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Whether a request for `path` may proceed
    ///
    /// Allow-list entries match whole path segments: `/admin` admits
    /// `/admin` and `/admin/status`, not `/administrators`.
    pub fn admits(&self, path: &str) -> bool {
        !self.is_enabled()
            || ALWAYS_ALLOWED.contains(&path)
            || self
                .inner
                .allow_paths
                .iter()
                .any(|prefix| within_prefix(path, prefix))
    }

    fn rejection(&self) -> Response {
        let mut response = CommonError::from(RequestError::ServiceUnavailable {
            message: self.inner.message.clone(),
            retry_after: self.inner.retry_after,
        })
        .into_response();

        if let Some(secs) = self.inner.retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

fn within_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Axum middleware enforcing a [`MaintenanceGate`]
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/orders", get(list_orders))
///     .layer(axum::middleware::from_fn_with_state(gate.clone(), maintenance_layer));
/// ```
pub async fn maintenance_layer(
    State(gate): State<MaintenanceGate>,
    request: Request,
    next: Next,
) -> Response {
    if gate.admits(request.uri().path()) {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "request rejected by maintenance gate");
    gate.rejection()
}
