//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── YYYY-MM-DD.csv        # One record per target date
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::MatchSet;
use crate::storage::{ResultSink, WriteMetadata};

/// Header row of every daily record.
pub const CSV_HEADER: [&str; 2] = ["URL", "Last Modified"];

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Record key for a given date.
    fn record_key(date: NaiveDate) -> String {
        format!("{}.csv", date.format("%Y-%m-%d"))
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// `/`-separated location of a key, as it appears in the repository.
    fn location(&self, key: &str) -> String {
        let root = self.root_dir.to_string_lossy().replace('\\', "/");
        let root = root.trim_end_matches('/');
        if root.is_empty() || root == "." {
            key.to_string()
        } else {
            format!("{root}/{key}")
        }
    }

    /// Repository-relative location of the record for `date`.
    pub fn record_location(&self, date: NaiveDate) -> String {
        self.location(&Self::record_key(date))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Encode the match set as CSV with a header row.
    fn encode_csv(matches: &MatchSet) -> Result<Vec<u8>> {
        // Header is written by hand so an empty set still gets one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for entry in matches {
            writer.serialize(entry)?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}

#[async_trait]
impl ResultSink for LocalStorage {
    async fn write_matches(&self, matches: &MatchSet) -> Result<WriteMetadata> {
        let key = Self::record_key(matches.target_date());
        let bytes = Self::encode_csv(matches)?;
        let path = self.write_bytes(&key, &bytes).await?;

        log::info!("Results saved to '{}' ({} rows)", path.display(), matches.len());

        Ok(WriteMetadata {
            location: self.record_location(matches.target_date()),
            path,
            row_count: matches.len(),
            timestamp: Utc::now(),
        })
    }
}
