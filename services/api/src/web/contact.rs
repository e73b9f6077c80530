//! services/api/src/web/contact.rs
//!
//! Contact form submission and the admin listing of stored submissions.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use site_core::domain::{ContactSubmission, FieldError, NewContactSubmission};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
}

impl From<ContactRequest> for NewContactSubmission {
    fn from(request: ContactRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            company: request.company,
            project_type: request.project_type,
            message: request.message.unwrap_or_default(),
        }
    }
}

/// The response payload sent after successfully storing a submission.
#[derive(Serialize, ToSchema, Debug)]
pub struct CreateContactResponse {
    pub success: bool,
    pub id: Uuid,
}

/// One failed rule. `path` names the offending field.
#[derive(Serialize, ToSchema, Debug)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl From<FieldError> for ValidationIssue {
    fn from(error: FieldError) -> Self {
        Self {
            path: vec![error.field.to_string()],
            message: error.message,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ValidationResponse {
    pub success: bool,
    pub message: String,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResponse {
    fn new(errors: Vec<ValidationIssue>) -> Self {
        Self {
            success: false,
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmissionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ContactSubmission> for ContactSubmissionResponse {
    fn from(submission: ContactSubmission) -> Self {
        Self {
            id: submission.id,
            name: submission.name,
            email: submission.email,
            company: submission.company,
            project_type: submission.project_type,
            message: submission.message,
            submitted: submission.submitted,
            created_at: submission.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Submit the contact form.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission stored", body = CreateContactResponse),
        (status = 400, description = "Validation failed", body = ValidationResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let issue = ValidationIssue {
                path: Vec::new(),
                message: rejection.body_text(),
            };
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidationResponse::new(vec![issue])),
            )
                .into_response();
        }
    };

    let submission = NewContactSubmission::from(request);
    if let Err(errors) = submission.validate() {
        let issues = errors.into_iter().map(ValidationIssue::from).collect();
        return (StatusCode::BAD_REQUEST, Json(ValidationResponse::new(issues))).into_response();
    }

    match state.contacts.create_contact_submission(submission).await {
        Ok(stored) => {
            info!(submission_id = %stored.id, "Stored contact submission");
            Json(CreateContactResponse {
                success: true,
                id: stored.id,
            })
            .into_response()
        }
        Err(e) => {
            error!("Failed to store contact submission: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::failure("Failed to submit contact form")),
            )
                .into_response()
        }
    }
}

/// List every contact submission, newest first.
#[utoipa::path(
    get,
    path = "/api/contact-submissions",
    responses(
        (status = 200, description = "All submissions", body = [ContactSubmissionResponse]),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 503, description = "Admin credentials are not configured"),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(("admin_basic" = []))
)]
pub async fn list_contact_submissions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<MessageResponse>)> {
    let submissions = state.contacts.list_contact_submissions().await.map_err(|e| {
        error!("Failed to list contact submissions: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse::failure("Failed to fetch submissions")),
        )
    })?;

    let response: Vec<ContactSubmissionResponse> =
        submissions.into_iter().map(Into::into).collect();
    Ok(Json(response))
}
