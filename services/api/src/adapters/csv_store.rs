//! services/api/src/adapters/csv_store.rs
//!
//! The file-backed implementation of the `AnalyticsStore` port.
//!
//! The CSV file is the system of record for analytics. Appends are plain
//! `O_APPEND` writes with no locking, so concurrent requests are ordered only by
//! the operating system; under heavy concurrent load rows may interleave. Every
//! read loads the whole file, so read cost grows with the history.

use async_trait::async_trait;
use site_core::csv::{encode_event, header_line, recent_events};
use site_core::domain::AnalyticsEvent;
use site_core::ports::{AnalyticsStore, PortResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An analytics store that appends one CSV row per event.
#[derive(Clone, Debug)]
pub struct CsvEventStore {
    path: PathBuf,
}

impl CsvEventStore {
    /// Creates a new `CsvEventStore`. The file is created lazily on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and, if the file is missing, writes the header row.
    pub async fn ensure_file(&self) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(mut file) => {
                file.write_all(format!("{}\n", header_line()).as_bytes())
                    .await?;
                file.flush().await?;
                info!("Created analytics log at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_to_string(&self) -> PortResult<String> {
        self.ensure_file().await?;
        Ok(fs::read_to_string(&self.path).await?)
    }
}

//=========================================================================================
// `AnalyticsStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalyticsStore for CsvEventStore {
    async fn append(&self, event: &AnalyticsEvent) -> PortResult<()> {
        self.ensure_file().await?;

        let row = format!("{}\n", encode_event(event));
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        // A single write keeps the row contiguous under O_APPEND.
        file.write_all(row.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> PortResult<Vec<AnalyticsEvent>> {
        let content = self.read_to_string().await?;
        Ok(recent_events(&content, limit))
    }

    async fn export(&self) -> PortResult<Vec<u8>> {
        self.ensure_file().await?;
        Ok(fs::read(&self.path).await?)
    }

    fn export_file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "visits.csv".to_string())
    }
}
