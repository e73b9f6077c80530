//! services/api/src/web/rest.rs
//!
//! Contains the shared REST response payloads and the master definition for the
//! OpenAPI specification.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::{
    analytics::{self, AnalyticsEventRequest},
    contact::{
        self, ContactRequest, ContactSubmissionResponse, CreateContactResponse, ValidationIssue,
        ValidationResponse,
    },
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analytics::record_event_handler,
        contact::create_contact_handler,
        contact::list_contact_submissions_handler,
    ),
    components(
        schemas(
            AnalyticsEventRequest,
            ContactRequest,
            ContactSubmissionResponse,
            CreateContactResponse,
            ValidationIssue,
            ValidationResponse,
            MessageResponse,
        )
    ),
    modifiers(&AdminSecurity),
    tags(
        (name = "Site API", description = "Contact form and visitor analytics endpoints.")
    )
)]
pub struct ApiDoc;

/// Registers the HTTP Basic scheme used by the admin-gated routes.
struct AdminSecurity;

impl utoipa::Modify for AdminSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_basic",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

//=========================================================================================
// API Response Structs
//=========================================================================================

/// A plain `{success, message}` body used for failures.
#[derive(Serialize, ToSchema, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
