//! Shared fixtures for the HTTP-level tests.

#![allow(dead_code)]

use api_lib::adapters::CsvEventStore;
use api_lib::config::{AdminCredentials, Config, DEFAULT_ADMIN_EVENT_LIMIT};
use api_lib::web::{api_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use site_core::domain::{AnalyticsEvent, ContactSubmission, NewContactSubmission};
use site_core::ports::{AnalyticsStore, ContactStore, PortError, PortResult};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// Contact store double that keeps submissions in memory.
#[derive(Default)]
pub struct InMemoryContactStore {
    submissions: Mutex<Vec<ContactSubmission>>,
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> PortResult<ContactSubmission> {
        let stored = ContactSubmission {
            id: Uuid::new_v4(),
            name: submission.name,
            email: submission.email,
            company: submission.company,
            project_type: submission.project_type,
            message: submission.message,
            submitted: true,
            created_at: Utc::now(),
        };
        self.submissions.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_contact_submissions(&self) -> PortResult<Vec<ContactSubmission>> {
        Ok(self.submissions.lock().await.iter().rev().cloned().collect())
    }
}

/// Stores that fail every operation, for the 500 paths.
pub struct BrokenStore;

#[async_trait]
impl ContactStore for BrokenStore {
    async fn create_contact_submission(
        &self,
        _submission: NewContactSubmission,
    ) -> PortResult<ContactSubmission> {
        Err(PortError::Unexpected("database is down".to_string()))
    }

    async fn list_contact_submissions(&self) -> PortResult<Vec<ContactSubmission>> {
        Err(PortError::Unexpected("database is down".to_string()))
    }
}

#[async_trait]
impl AnalyticsStore for BrokenStore {
    async fn append(&self, _event: &AnalyticsEvent) -> PortResult<()> {
        Err(PortError::Io(std::io::Error::other("disk full")))
    }

    async fn recent(&self, _limit: usize) -> PortResult<Vec<AnalyticsEvent>> {
        Err(PortError::Io(std::io::Error::other("disk gone")))
    }

    async fn export(&self) -> PortResult<Vec<u8>> {
        Err(PortError::Io(std::io::Error::other("disk gone")))
    }

    fn export_file_name(&self) -> String {
        "visits.csv".to_string()
    }
}

/// A router wired to temporary storage. Keep it alive for the whole test.
pub struct TestApp {
    pub router: Router,
    pub analytics: Arc<CsvEventStore>,
    pub contacts: Arc<InMemoryContactStore>,
    _dir: TempDir,
}

pub fn config(admin: bool, admin_event_limit: usize) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        analytics_csv_path: "unused.csv".into(),
        admin: admin.then(|| AdminCredentials {
            username: ADMIN_USER.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        }),
        admin_event_limit,
        static_dir: None,
        cors_allowed_origin: None,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config(true, DEFAULT_ADMIN_EVENT_LIMIT))
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let analytics = Arc::new(CsvEventStore::new(dir.path().join("data").join("visits.csv")));
        let contacts = Arc::new(InMemoryContactStore::default());

        let state = Arc::new(AppState {
            analytics: analytics.clone(),
            contacts: contacts.clone(),
            config: Arc::new(config),
        });

        Self {
            router: api_router(state),
            analytics,
            contacts,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Router whose stores always fail.
pub fn broken_router() -> Router {
    let broken = Arc::new(BrokenStore);
    api_router(Arc::new(AppState {
        analytics: broken.clone(),
        contacts: broken,
        config: Arc::new(config(true, DEFAULT_ADMIN_EVENT_LIMIT)),
    }))
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub fn admin_auth() -> String {
    basic_auth(ADMIN_USER, ADMIN_PASSWORD)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
