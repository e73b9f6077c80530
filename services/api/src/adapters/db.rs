//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ContactStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::domain::{ContactSubmission, NewContactSubmission};
use site_core::ports::{ContactStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContactStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ContactSubmissionRecord {
    id: Uuid,
    name: String,
    email: String,
    company: Option<String>,
    project_type: Option<String>,
    message: String,
    submitted: bool,
    created_at: DateTime<Utc>,
}
impl ContactSubmissionRecord {
    fn to_domain(self) -> ContactSubmission {
        ContactSubmission {
            id: self.id,
            name: self.name,
            email: self.email,
            company: self.company,
            project_type: self.project_type,
            message: self.message,
            submitted: self.submitted,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ContactStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContactStore for DbAdapter {
    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> PortResult<ContactSubmission> {
        let record = sqlx::query_as::<_, ContactSubmissionRecord>(
            "INSERT INTO contact_submissions (id, name, email, company, project_type, message, submitted) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE) \
             RETURNING id, name, email, company, project_type, message, submitted, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.company)
        .bind(&submission.project_type)
        .bind(&submission.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    async fn list_contact_submissions(&self) -> PortResult<Vec<ContactSubmission>> {
        let records = sqlx::query_as::<_, ContactSubmissionRecord>(
            "SELECT id, name, email, company, project_type, message, submitted, created_at \
             FROM contact_submissions ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let submissions = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(submissions)
    }
}
