//! Storage abstractions for the persisted listing.
//!
//! The previous run's output is read once at startup as fallback data and
//! replaced once at the end with the new result. The two directions are kept
//! as separate traits so the "read old, then atomically replace" order stays
//! explicit at the call site.
//!
//! ## File format
//!
//! ```text
//! mirror_name,file_name
//! alpha,Show_24.03.15_20-15_ard_90_TVOON_DE.mpg.HD.mp4.otrkey
//! beta,Show_24.03.15_20-15_ard_90_TVOON_DE.mpg.HD.mp4.otrkey
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{FallbackIndex, FileEntry};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a completed write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of rows written, excluding the header
    pub row_count: usize,
    /// Where the rows now live
    pub location: String,
    pub timestamp: DateTime<Utc>,
}

/// Source of last-known-good listings.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    /// Load the previous run's entries grouped by mirror.
    ///
    /// Missing or unreadable data is not an error: it yields an empty index.
    async fn load_fallback(&self) -> FallbackIndex;
}

/// Destination for the merged result.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Replace the stored listing with `entries`.
    ///
    /// Either the full new listing becomes visible or the old one stays.
    async fn save(&self, entries: &[FileEntry]) -> Result<WriteMetadata>;
}
