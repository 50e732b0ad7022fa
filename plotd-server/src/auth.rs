//! Bearer-token request authentication.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::token::token_eq;
use crate::AppState;

/// Middleware enforcing the configured bearer token on every route.
///
/// A missing or mismatched credential yields a bare `401` regardless of
/// whether the route exists, so probing cannot map the API surface.
pub async fn require_bearer(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = app.config.token.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(credential) if token_eq(credential, expected) => next.run(req).await,
        _ => {
            tracing::debug!("rejecting request with missing or invalid bearer token");
            (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
        }
    }
}
