//! Storage abstractions for daily records.
//!
//! Each run writes one dated table of matched pages:
//!
//! ```text
//! daily_updates/
//! ├── 2026-10-16.csv
//! └── 2026-10-17.csv      # URL,Last Modified
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::MatchSet;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Location relative to the repository root, `/`-separated
    pub location: String,
    /// Filesystem path written
    pub path: PathBuf,
    /// Number of data rows (header excluded)
    pub row_count: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for record storage backends.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Write the match set as a table keyed by its target date.
    ///
    /// Rows keep discovery order. An existing record for the same date is replaced.
    async fn write_matches(&self, matches: &MatchSet) -> Result<WriteMetadata>;
}
