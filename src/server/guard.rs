//! Authentication middleware

use crate::core::auth::AuthGuard;
use crate::core::error::CommonError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

/// Axum middleware running an [`AuthGuard`]
///
/// On success the resolved [`AuthContext`](crate::core::AuthContext) is
/// stored in the request extensions for handlers to extract with
/// `Extension<AuthContext>`.
pub async fn auth_layer(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, CommonError> {
    let context = guard.authorize(request.headers()).await?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
