//! services/api/src/web/middleware.rs
//!
//! HTTP Basic authentication middleware for the admin-gated routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use tracing::warn;

use crate::config::AdminCredentials;
use crate::web::state::AppState;

/// Challenge sent with every 401 from the admin routes.
pub const ADMIN_CHALLENGE: &str = "Basic realm=\"Admin\"";

/// Why an admin request was refused.
///
/// A missing configuration is an operator problem and must stay distinguishable
/// from a visitor presenting bad credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminAuthError {
    #[error("Admin credentials are not configured")]
    NotConfigured,
    #[error("Authentication required")]
    Unauthorized,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        match self {
            AdminAuthError::NotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
            }
            AdminAuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, HeaderValue::from_static(ADMIN_CHALLENGE))],
                self.to_string(),
            )
                .into_response(),
        }
    }
}

/// Decodes a `Basic` authorization header into `(username, password)`.
///
/// A decoded value without a `:` yields empty credentials, which never match.
pub fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    Some(match decoded.split_once(':') {
        Some((username, password)) => (username.to_string(), password.to_string()),
        None => (String::new(), String::new()),
    })
}

/// Checks the request against the configured credentials.
pub fn authorize(
    configured: Option<&AdminCredentials>,
    headers: &HeaderMap,
) -> Result<(), AdminAuthError> {
    let expected = configured.ok_or(AdminAuthError::NotConfigured)?;
    let (username, password) = parse_basic_auth(headers).ok_or(AdminAuthError::Unauthorized)?;

    if username == expected.username && password == expected.password {
        Ok(())
    } else {
        Err(AdminAuthError::Unauthorized)
    }
}

/// Middleware that admits only requests carrying the configured admin credentials.
///
/// If no credentials are configured, returns 503 whatever the request carries.
/// If the credentials are missing or wrong, returns 401 with a Basic challenge.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AdminAuthError> {
    authorize(state.config.admin.as_ref(), req.headers()).map_err(|e| {
        warn!(path = %req.uri().path(), "Rejected admin request: {}", e);
        e
    })?;

    Ok(next.run(req).await)
}
