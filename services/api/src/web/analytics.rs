//! services/api/src/web/analytics.rs
//!
//! The ingestion endpoint for browser analytics events.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;
use site_core::domain::{AnalyticsEvent, EventType};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::web::client_info::ClientInfo;
use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request Payload
//=========================================================================================

/// An analytics event as sent by the browser.
#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEventRequest {
    /// One of `page_entered`, `button_clicked`, `section_visited`.
    pub event_type: Option<String>,
    pub page_path: Option<String>,
    pub section_id: Option<String>,
    pub button_id: Option<String>,
    pub button_label: Option<String>,
    pub referrer: Option<String>,
}

impl AnalyticsEventRequest {
    /// Validates the payload and enriches it with server-observed metadata.
    ///
    /// Returns `None` when the event type is unknown or the page path is empty.
    pub fn into_event(self, client: ClientInfo, timestamp: DateTime<Utc>) -> Option<AnalyticsEvent> {
        let event_type: EventType = self.event_type?.parse().ok()?;
        let page_path = self.page_path.filter(|path| !path.is_empty())?;

        Some(AnalyticsEvent {
            timestamp,
            event_type,
            page_path,
            section_id: self.section_id.unwrap_or_default(),
            button_id: self.button_id.unwrap_or_default(),
            button_label: self.button_label.unwrap_or_default(),
            ip_address: client.ip_address,
            location: client.location,
            user_agent: client.user_agent,
            referrer: self.referrer.unwrap_or_default(),
        })
    }
}

//=========================================================================================
// Handler
//=========================================================================================

/// Record one analytics event.
///
/// The timestamp, client address, location and user agent are taken from the
/// request, never from the payload.
#[utoipa::path(
    post,
    path = "/api/analytics",
    request_body = AnalyticsEventRequest,
    responses(
        (status = 204, description = "Event recorded"),
        (status = 400, description = "Invalid analytics event", body = MessageResponse),
        (status = 500, description = "Failed to store analytics event", body = MessageResponse)
    )
)]
pub async fn record_event_handler(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    payload: Result<Json<AnalyticsEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, Json<MessageResponse>)> {
    let invalid = || {
        (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::failure("Invalid analytics event")),
        )
    };

    let Json(request) = payload.map_err(|e| {
        debug!("Rejected analytics payload: {}", e);
        invalid()
    })?;
    let timestamp = Utc::now().trunc_subsecs(3);
    let event = request.into_event(client, timestamp).ok_or_else(invalid)?;

    state.analytics.append(&event).await.map_err(|e| {
        error!("Failed to store analytics event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse::failure("Failed to store analytics event")),
        )
    })?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: "203.0.113.5".to_string(),
            location: "unknown".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 18, 0, 0).unwrap()
    }

    #[test]
    fn section_event_is_enriched() {
        let request = AnalyticsEventRequest {
            event_type: Some("section_visited".to_string()),
            page_path: Some("/".to_string()),
            section_id: Some("services".to_string()),
            ..Default::default()
        };

        let event = request.into_event(client(), now()).unwrap();
        assert_eq!(event.event_type, EventType::SectionVisited);
        assert_eq!(event.section_id, "services");
        assert_eq!(event.button_id, "");
        assert_eq!(event.ip_address, "203.0.113.5");
        assert_eq!(event.timestamp, now());
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let request = AnalyticsEventRequest {
            event_type: Some("unknown".to_string()),
            page_path: Some("/".to_string()),
            ..Default::default()
        };
        assert!(request.into_event(client(), now()).is_none());
    }

    #[test]
    fn missing_or_empty_page_path_is_rejected() {
        let missing = AnalyticsEventRequest {
            event_type: Some("page_entered".to_string()),
            ..Default::default()
        };
        assert!(missing.into_event(client(), now()).is_none());

        let empty = AnalyticsEventRequest {
            event_type: Some("page_entered".to_string()),
            page_path: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.into_event(client(), now()).is_none());
    }
}
