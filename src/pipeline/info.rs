// src/pipeline/info.rs

//! Summary of a saved listing.

use std::collections::HashMap;

use crate::models::{FileEntry, ParsedFilename};

/// Row counts for one mirror in a saved listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCount {
    pub mirror_name: String,
    pub files: usize,
    /// Files whose names follow the OTR naming grammar
    pub parseable: usize,
}

/// Count rows per mirror, in order of first appearance.
pub fn summarize(entries: &[FileEntry]) -> Vec<MirrorCount> {
    let mut counts: Vec<MirrorCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let position = *positions.entry(entry.mirror_name.as_str()).or_insert_with(|| {
            counts.push(MirrorCount {
                mirror_name: entry.mirror_name.clone(),
                files: 0,
                parseable: 0,
            });
            counts.len() - 1
        });

        let count = &mut counts[position];
        count.files += 1;
        if ParsedFilename::parse(&entry.file_name).is_some() {
            count.parseable += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let entries = vec![
            FileEntry::new("b", "Show_24.03.15_20-15_ard_90_TVOON_DE.mpg.avi.otrkey"),
            FileEntry::new("a", "old.otrkey"),
            FileEntry::new("b", "other.otrkey"),
        ];

        assert_eq!(
            summarize(&entries),
            vec![
                MirrorCount {
                    mirror_name: "b".into(),
                    files: 2,
                    parseable: 1,
                },
                MirrorCount {
                    mirror_name: "a".into(),
                    files: 1,
                    parseable: 0,
                },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
