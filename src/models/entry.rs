//! Output rows and the fallback index built from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One file advertised by one mirror.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    pub mirror_name: String,
    pub file_name: String,
}

impl FileEntry {
    pub fn new(mirror_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            mirror_name: mirror_name.into(),
            file_name: file_name.into(),
        }
    }
}

/// File names each mirror produced in the previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackIndex {
    by_mirror: HashMap<String, Vec<String>>,
}

impl FallbackIndex {
    /// Group entries by mirror, keeping file order within each mirror.
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut by_mirror: HashMap<String, Vec<String>> = HashMap::new();
        for entry in entries {
            by_mirror
                .entry(entry.mirror_name)
                .or_default()
                .push(entry.file_name);
        }
        Self { by_mirror }
    }

    /// Cached file names for a mirror; empty when the mirror is unknown.
    pub fn files_for(&self, mirror_name: &str) -> &[String] {
        self.by_mirror
            .get(mirror_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn mirror_count(&self) -> usize {
        self.by_mirror.len()
    }

    /// Total number of cached entries across all mirrors.
    pub fn entry_count(&self) -> usize {
        self.by_mirror.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mirror.is_empty()
    }
}
