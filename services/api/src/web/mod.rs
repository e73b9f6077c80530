pub mod admin;
pub mod analytics;
pub mod client_info;
pub mod contact;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use admin::{admin_dashboard_handler, admin_export_handler};
pub use analytics::record_event_handler;
pub use contact::{create_contact_handler, list_contact_submissions_handler};
pub use middleware::require_admin;

use state::AppState;

/// Largest accepted request body. Analytics events and contact messages are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the API and admin routes around the shared state.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/analytics", post(record_event_handler))
        .route("/api/contact", post(create_contact_handler));

    // Admin routes (HTTP Basic required)
    let admin_routes = Router::new()
        .route(
            "/api/contact-submissions",
            get(list_contact_submissions_handler),
        )
        .route("/admin", get(admin_dashboard_handler))
        .route("/admin/export", get(admin_export_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
