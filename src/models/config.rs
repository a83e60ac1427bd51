//! Application configuration structures.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Relay settings for quota-limited mirrors
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Input and output file locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration, using defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::config(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if !(self.quota.threshold > 0.0 && self.quota.threshold <= 1.0) {
            return Err(AppError::validation("quota.threshold must be in (0, 1]"));
        }
        if self.quota.api_key_env.trim().is_empty() {
            return Err(AppError::validation("quota.api_key_env is empty"));
        }
        if self.quota.proxy_tag.trim().is_empty() {
            return Err(AppError::validation("quota.proxy_tag is empty"));
        }
        Url::parse(&self.quota.relay_url).map_err(|e| {
            AppError::validation(format!(
                "quota.relay_url '{}' is invalid: {e}",
                self.quota.relay_url
            ))
        })?;
        Ok(())
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum mirrors fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Treat a listing without any identifiers as a failed fetch
    #[serde(default)]
    pub empty_listing_is_failure: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            empty_listing_is_failure: false,
        }
    }
}

/// Settings for the quota-limited relay path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Relay endpoint that forwards to the mirror listing
    #[serde(default = "defaults::relay_url")]
    pub relay_url: String,

    /// Probability of spending a relay call on a given run.
    ///
    /// The relay's free tier allows 1000 calls a month; 0.3188 keeps a
    /// scheduled job below that with 99% confidence.
    #[serde(default = "defaults::threshold")]
    pub threshold: f64,

    /// Environment variable holding the relay credential
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// `proxy` value in the mirror list that selects the relay path
    #[serde(default = "defaults::proxy_tag")]
    pub proxy_tag: String,

    /// Fixed seed for the admission draws
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            relay_url: defaults::relay_url(),
            threshold: defaults::threshold(),
            api_key_env: defaults::api_key_env(),
            proxy_tag: defaults::proxy_tag(),
            seed: None,
        }
    }
}

/// File locations, relative to the working directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::mirrors_file")]
    pub mirrors_file: PathBuf,

    #[serde(default = "defaults::output_file")]
    pub output_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mirrors_file: defaults::mirrors_file(),
            output_file: defaults::output_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "otrkey_files".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        8
    }

    // Quota defaults
    pub fn relay_url() -> String {
        "https://api.scraperapi.com/".into()
    }
    pub fn threshold() -> f64 {
        0.3188
    }
    pub fn api_key_env() -> String {
        "API_KEY".into()
    }
    pub fn proxy_tag() -> String {
        "PROXY1".into()
    }

    // Path defaults
    pub fn mirrors_file() -> PathBuf {
        PathBuf::from("mirrors.json")
    }
    pub fn output_file() -> PathBuf {
        PathBuf::from("otrkey_files.csv")
    }
}
