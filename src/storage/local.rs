//! Local filesystem storage implementation.
//!
//! Stores the listing as a two-column CSV file. Writes go to a sibling
//! temporary file (the target name plus `.tmp`) which is synced and then
//! renamed over the target, so a crash mid-write leaves the previous listing
//! intact for the next run's fallback.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{FallbackIndex, FileEntry};
use crate::storage::{FallbackSource, ResultSink, WriteMetadata};

const HEADER: [&str; 2] = ["mirror_name", "file_name"];

/// CSV file storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage for the given CSV file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Temporary path next to the target: the full file name plus `.tmp`.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write bytes atomically (write to temp, then rename).
    ///
    /// The temporary file is removed again if any step fails.
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.temp_path();
        let result = Self::write_and_rename(&tmp, &self.path, bytes).await;
        if result.is_err()
            && let Err(e) = tokio::fs::remove_file(&tmp).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("Could not remove temporary file {}: {}", tmp.display(), e);
        }
        result
    }

    async fn write_and_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(tmp, target).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read all stored entries, or None if nothing has been stored yet.
    ///
    /// Rows that do not fit the two-column layout are skipped with a warning.
    pub async fn load_entries(&self) -> Result<Option<Vec<FileEntry>>> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn decode(bytes: &[u8]) -> Result<Vec<FileEntry>> {
        let mut reader = csv::Reader::from_reader(bytes);

        let headers = reader.headers()?.clone();
        for column in HEADER {
            if !headers.iter().any(|h| h == column) {
                return Err(AppError::validation(format!(
                    "missing column '{column}' in header"
                )));
            }
        }

        let mut entries = Vec::new();
        for (row, record) in reader.deserialize::<FileEntry>().enumerate() {
            match record {
                Ok(entry) => entries.push(entry),
                // Row 1 is the header.
                Err(e) => log::warn!("Skipping malformed row {}: {}", row + 2, e),
            }
        }
        Ok(entries)
    }

    fn encode(entries: &[FileEntry]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for entry in entries {
            writer.write_record([&entry.mirror_name, &entry.file_name])?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}

#[async_trait]
impl FallbackSource for LocalStorage {
    async fn load_fallback(&self) -> FallbackIndex {
        match self.load_entries().await {
            Ok(Some(entries)) => {
                let index = FallbackIndex::from_entries(entries);
                log::info!(
                    "Loaded fallback data: {} entries for {} mirrors from {}",
                    index.entry_count(),
                    index.mirror_count(),
                    self.path.display()
                );
                index
            }
            Ok(None) => {
                log::warn!(
                    "No existing listing at {}. Will not use fallback.",
                    self.path.display()
                );
                FallbackIndex::default()
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable listing at {}: {}. Will not use fallback.",
                    self.path.display(),
                    e
                );
                FallbackIndex::default()
            }
        }
    }
}

#[async_trait]
impl ResultSink for LocalStorage {
    async fn save(&self, entries: &[FileEntry]) -> Result<WriteMetadata> {
        let bytes = Self::encode(entries)?;
        self.write_bytes(&bytes).await?;

        log::debug!("Wrote {} rows to {}", entries.len(), self.path.display());

        Ok(WriteMetadata {
            row_count: entries.len(),
            location: self.path.display().to_string(),
            timestamp: Utc::now(),
        })
    }
}
