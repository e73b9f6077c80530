//! crates/site_core/src/capture.rs
//!
//! The client-side half of the analytics pipeline.
//!
//! A `Tracker` is driven by the page integration: it is told about navigations,
//! section visibility changes and clicks, decides which of them are worth an
//! event, and hands each event to a `Transport` without waiting for delivery.
//! Delivery is best effort; an event may be lost if the page unloads first.

use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::domain::EventType;

/// Paths under this prefix are operator pages and are never instrumented.
pub const ADMIN_PREFIX: &str = "/admin";

/// Fraction of a section that must be visible before it counts as visited.
pub const SECTION_VISIBILITY_THRESHOLD: f64 = 0.45;

/// Where events are sent.
pub const ANALYTICS_ENDPOINT: &str = "/api/analytics";

//=========================================================================================
// Events and Transport
//=========================================================================================

/// An event as produced by the browser, before server-side enrichment.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEvent {
    pub event_type: EventType,
    pub page_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
}

impl CapturedEvent {
    fn new(event_type: EventType, page_path: &str) -> Self {
        Self {
            event_type,
            page_path: page_path.to_string(),
            section_id: None,
            button_id: None,
            button_label: None,
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    event: &'a CapturedEvent,
    referrer: &'a str,
}

/// Fire-and-forget delivery channels offered by the host page.
pub trait Transport {
    /// Whether a beacon channel that survives page unload is available.
    fn supports_beacon(&self) -> bool;

    /// Queues `body` for delivery through the beacon channel.
    fn send_beacon(&self, endpoint: &str, body: String);

    /// Starts a keep-alive POST of `body`. The outcome is never observed.
    fn send_keepalive(&self, endpoint: &str, body: String);
}

/// Serializes an event and hands it to the transport, preferring the beacon.
///
/// Nothing is retried and nothing is awaited.
pub fn dispatch<T: Transport + ?Sized>(transport: &T, event: &CapturedEvent, referrer: &str) {
    let body = match serde_json::to_string(&Payload { event, referrer }) {
        Ok(body) => body,
        Err(e) => {
            warn!("Dropping analytics event that failed to serialize: {}", e);
            return;
        }
    };

    if transport.supports_beacon() {
        transport.send_beacon(ANALYTICS_ENDPOINT, body);
    } else {
        transport.send_keepalive(ANALYTICS_ENDPOINT, body);
    }
}

//=========================================================================================
// Click targets
//=========================================================================================

/// The attributes of a DOM element that click tracking looks at.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub role: Option<String>,
    pub test_id: Option<String>,
    pub aria_label: Option<String>,
    pub text: String,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn with_test_id(mut self, test_id: &str) -> Self {
        self.test_id = Some(test_id.to_string());
        self
    }

    pub fn with_aria_label(mut self, label: &str) -> Self {
        self.aria_label = Some(label.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Buttons, links and anything with an explicit button role.
    pub fn is_interactive(&self) -> bool {
        matches!(self.tag.as_str(), "button" | "a") || self.role.as_deref() == Some("button")
    }

    /// Derives `(button_id, button_label)` for this element.
    pub fn button_metadata(&self) -> (String, String) {
        let raw_label = [
            self.test_id.as_deref(),
            self.aria_label.as_deref(),
            Some(self.text.as_str()),
            self.id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or("");
        let label = raw_label.split_whitespace().collect::<Vec<_>>().join(" ");

        let id = [self.test_id.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| label.clone());

        (id, label)
    }
}

//=========================================================================================
// Tracker
//=========================================================================================

/// Per-tab capture state. One page view lasts from one navigation to the next.
pub struct Tracker<T: Transport> {
    transport: T,
    referrer: String,
    page_path: Option<String>,
    reported_sections: HashSet<String>,
}

impl<T: Transport> Tracker<T> {
    pub fn new(transport: T, referrer: impl Into<String>) -> Self {
        Self {
            transport,
            referrer: referrer.into(),
            page_path: None,
            reported_sections: HashSet::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The path of the current page view, if it is instrumented.
    fn active_path(&self) -> Option<&str> {
        self.page_path
            .as_deref()
            .filter(|path| !path.starts_with(ADMIN_PREFIX))
    }

    fn emit(&self, event: CapturedEvent) -> Option<CapturedEvent> {
        dispatch(&self.transport, &event, &self.referrer);
        Some(event)
    }

    /// Starts a new page view. Re-announcing the current path is not a navigation.
    pub fn navigate(&mut self, path: &str) -> Option<CapturedEvent> {
        if self.page_path.as_deref() == Some(path) {
            return None;
        }
        self.page_path = Some(path.to_string());
        self.reported_sections.clear();

        let path = self.active_path()?;
        let event = CapturedEvent::new(EventType::PageEntered, path);
        self.emit(event)
    }

    /// Reports a visibility change of the section `section_id`.
    ///
    /// Emits `section_visited` the first time the section crosses the threshold in
    /// the current page view and never again until the next navigation.
    pub fn observe_section(&mut self, section_id: &str, ratio: f64) -> Option<CapturedEvent> {
        let path = self.active_path()?;
        if section_id.is_empty()
            || !ratio.is_finite()
            || ratio < SECTION_VISIBILITY_THRESHOLD
            || self.reported_sections.contains(section_id)
        {
            return None;
        }

        let mut event = CapturedEvent::new(EventType::SectionVisited, path);
        event.section_id = Some(section_id.to_string());
        self.reported_sections.insert(section_id.to_string());
        self.emit(event)
    }

    /// Reports a click. `chain` is the clicked element followed by its ancestors.
    pub fn click(&mut self, chain: &[Element]) -> Option<CapturedEvent> {
        let path = self.active_path()?;
        let clickable = chain.iter().find(|element| element.is_interactive())?;
        let (button_id, button_label) = clickable.button_metadata();

        let mut event = CapturedEvent::new(EventType::ButtonClicked, path);
        event.button_id = Some(button_id);
        event.button_label = Some(button_label);
        self.emit(event)
    }
}
