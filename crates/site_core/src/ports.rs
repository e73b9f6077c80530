//! crates/site_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage implementations like files or databases.

use async_trait::async_trait;

use crate::domain::{AnalyticsEvent, ContactSubmission, NewContactSubmission};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Append-only log of analytics events.
///
/// Implementations keep events in arrival order; `recent` derives recency from that
/// order rather than from timestamps.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Appends one event after all previously appended events.
    async fn append(&self, event: &AnalyticsEvent) -> PortResult<()>;

    /// Returns at most `limit` events, most recently appended first.
    async fn recent(&self, limit: usize) -> PortResult<Vec<AnalyticsEvent>>;

    /// Returns the raw stored representation, byte for byte.
    async fn export(&self) -> PortResult<Vec<u8>>;

    /// Suggested file name for the exported data.
    fn export_file_name(&self) -> String;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Stores a validated submission and marks it as submitted.
    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> PortResult<ContactSubmission>;

    /// Lists every submission, newest first.
    async fn list_contact_submissions(&self) -> PortResult<Vec<ContactSubmission>>;
}
