//! crates/site_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or storage format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Analytics
//=========================================================================================

/// The closed set of interactions the site records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageEntered,
    ButtonClicked,
    SectionVisited,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageEntered => "page_entered",
            EventType::ButtonClicked => "button_clicked",
            EventType::SectionVisited => "section_visited",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known event types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type '{0}'")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page_entered" => Ok(EventType::PageEntered),
            "button_clicked" => Ok(EventType::ButtonClicked),
            "section_visited" => Ok(EventType::SectionVisited),
            other => Err(UnknownEventType(other.to_string())),
        }
    }
}

/// One observed visitor interaction, enriched with server-side metadata.
///
/// Events are immutable once appended to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub page_path: String,
    /// Empty unless `event_type` is `SectionVisited`.
    pub section_id: String,
    /// Empty unless `event_type` is `ButtonClicked`.
    pub button_id: String,
    pub button_label: String,
    pub ip_address: String,
    /// Comma-joined city/region/country, or `"unknown"`.
    pub location: String,
    pub user_agent: String,
    pub referrer: String,
}

//=========================================================================================
// Contact submissions
//=========================================================================================

/// A stored visitor inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
}

/// The visitor-supplied part of a contact submission, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
}

/// A single failed validation rule, keyed by the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl NewContactSubmission {
    /// Checks that every required field is present and non-blank.
    ///
    /// All failures are collected so the visitor sees them at once.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ];

        let errors: Vec<FieldError> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| FieldError {
                field,
                message: "Required".to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
