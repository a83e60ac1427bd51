// src/models/mirror.rs

//! Mirror descriptors loaded from the mirror list.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// How a mirror's listing page is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessPolicy {
    /// Plain GET of the listing URL
    Direct,
    /// Through the relay service, subject to its monthly call cap
    QuotaLimitedProxy,
}

/// A mirror server advertising a listing of otrkey files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorDescriptor {
    /// Unique mirror name
    pub name: String,

    /// URL of the listing page
    pub list_url: String,

    pub access_policy: AccessPolicy,

    /// Search URL template with a `{query}` placeholder
    pub search_url: Option<String>,
}

/// A mirror as written in `mirrors.json`.
#[derive(Debug, Clone, Deserialize)]
struct MirrorRecord {
    name: String,
    list_url: String,
    #[serde(default)]
    proxy: Option<String>,
    #[serde(default)]
    search_url: Option<String>,
}

impl MirrorDescriptor {
    /// Create a mirror reached directly.
    pub fn direct(name: impl Into<String>, list_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list_url: list_url.into(),
            access_policy: AccessPolicy::Direct,
            search_url: None,
        }
    }

    /// Create a mirror reached through the relay.
    pub fn proxied(name: impl Into<String>, list_url: impl Into<String>) -> Self {
        Self {
            access_policy: AccessPolicy::QuotaLimitedProxy,
            ..Self::direct(name, list_url)
        }
    }

    /// Attach a search URL template.
    pub fn with_search_url(mut self, template: impl Into<String>) -> Self {
        self.search_url = Some(template.into());
        self
    }

    /// Load and validate the mirror list from a JSON file.
    ///
    /// `proxy_tag` is the `proxy` value that selects the relay path; any
    /// other value, or none, means direct access.
    pub fn load_all(path: impl AsRef<Path>, proxy_tag: &str) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read mirror list {}: {e}", path.display()))
        })?;
        Self::parse_all(&content, proxy_tag)
    }

    /// Parse and validate a JSON mirror list.
    pub fn parse_all(json: &str, proxy_tag: &str) -> Result<Vec<Self>> {
        let records: Vec<MirrorRecord> = serde_json::from_str(json)?;
        let mirrors: Vec<Self> = records
            .into_iter()
            .map(|record| {
                let access_policy = match record.proxy.as_deref() {
                    Some(tag) if tag == proxy_tag => AccessPolicy::QuotaLimitedProxy,
                    _ => AccessPolicy::Direct,
                };
                Self {
                    name: record.name,
                    list_url: record.list_url,
                    access_policy,
                    search_url: record.search_url.filter(|s| !s.trim().is_empty()),
                }
            })
            .collect();

        Self::validate_all(&mirrors)?;
        Ok(mirrors)
    }

    /// Check names are non-empty and unique and URLs are absolute.
    pub fn validate_all(mirrors: &[Self]) -> Result<()> {
        let mut seen = HashSet::new();
        for mirror in mirrors {
            if mirror.name.trim().is_empty() {
                return Err(AppError::config(format!(
                    "mirror with list_url {} has an empty name",
                    mirror.list_url
                )));
            }
            if !seen.insert(mirror.name.as_str()) {
                return Err(AppError::config(format!(
                    "duplicate mirror name '{}'",
                    mirror.name
                )));
            }
            Url::parse(&mirror.list_url).map_err(|e| {
                AppError::config(format!(
                    "mirror '{}' has invalid list_url '{}': {e}",
                    mirror.name, mirror.list_url
                ))
            })?;
        }
        Ok(())
    }

    pub fn is_proxied(&self) -> bool {
        self.access_policy == AccessPolicy::QuotaLimitedProxy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIRRORS: &str = r#"[
        {"name": "alpha", "list_url": "https://alpha.example/list.txt", "proxy": ""},
        {"name": "beta", "list_url": "https://beta.example/files", "proxy": "PROXY1",
         "search_url": "https://beta.example/?q={query}"},
        {"name": "gamma", "list_url": "https://gamma.example/", "proxy": "PROXY2"},
        {"name": "delta", "list_url": "https://delta.example/"}
    ]"#;

    #[test]
    fn test_parse_policies() {
        let mirrors = MirrorDescriptor::parse_all(MIRRORS, "PROXY1").unwrap();
        assert_eq!(mirrors.len(), 4);
        assert_eq!(mirrors[0].access_policy, AccessPolicy::Direct);
        assert_eq!(mirrors[1].access_policy, AccessPolicy::QuotaLimitedProxy);
        assert_eq!(mirrors[2].access_policy, AccessPolicy::Direct);
        assert_eq!(mirrors[3].access_policy, AccessPolicy::Direct);
        assert_eq!(
            mirrors[1].search_url.as_deref(),
            Some("https://beta.example/?q={query}")
        );
        assert!(mirrors[0].search_url.is_none());
    }

    #[test]
    fn test_custom_proxy_tag() {
        let mirrors = MirrorDescriptor::parse_all(MIRRORS, "PROXY2").unwrap();
        assert!(!mirrors[1].is_proxied());
        assert!(mirrors[2].is_proxied());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let json = r#"[
            {"name": "alpha", "list_url": "https://a.example/"},
            {"name": "alpha", "list_url": "https://b.example/"}
        ]"#;
        let err = MirrorDescriptor::parse_all(json, "PROXY1").unwrap_err();
        assert!(err.to_string().contains("duplicate mirror name"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let json = r#"[{"name": "  ", "list_url": "https://a.example/"}]"#;
        assert!(MirrorDescriptor::parse_all(json, "PROXY1").is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let json = r#"[{"name": "alpha", "list_url": "alpha/list"}]"#;
        assert!(matches!(
            MirrorDescriptor::parse_all(json, "PROXY1"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            MirrorDescriptor::parse_all("{not json", "PROXY1"),
            Err(AppError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = MirrorDescriptor::load_all("/nonexistent/mirrors.json", "PROXY1").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
