// src/services/extractor.rs

//! Identifier extraction from raw listing pages.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static OTRKEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_.+-]+\.otrkey").expect("otrkey pattern is valid"));

/// Collect every otrkey file name mentioned in `text`.
///
/// Works on any page format (HTML, plain text, JSON). The returned set is
/// sorted and free of duplicates.
pub fn extract(text: &str) -> BTreeSet<String> {
    OTRKEY_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
