//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use site_core::ports::{AnalyticsStore, ContactStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<dyn AnalyticsStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub config: Arc<Config>,
}
