// src/services/fetcher.rs

//! Mirror listing fetcher.
//!
//! Retrieves one mirror's listing page, directly or through the relay, and
//! reduces it to the sorted set of otrkey names it mentions.

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::error::{AppError, Result};
use crate::models::{AccessPolicy, Config, MirrorDescriptor, QuotaConfig};
use crate::services::extractor::extract;
use crate::services::quota::QuotaGate;
use crate::utils::http;

/// Reason reported when the quota gate declines a relay call.
pub const QUOTA_SKIP_REASON: &str = "execution skipped to preserve quota";

/// Result of fetching one mirror's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Sorted, duplicate-free file names
    Success(Vec<String>),
    /// Human-readable reason naming the mirror, URL and cause
    Failure(String),
}

/// Anything that can produce a listing for a mirror.
#[async_trait]
pub trait ListingFetch: Send + Sync {
    /// Fetch a mirror's listing. Never panics or errors; failures are values.
    async fn fetch(&self, mirror: &MirrorDescriptor) -> FetchOutcome;
}

/// Looks up a credential by variable name.
pub type CredentialLookup = fn(&str) -> Option<String>;

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Relay endpoint and credential location.
#[derive(Clone)]
pub struct RelayConfig {
    pub url: String,
    /// Variable holding the credential, resolved at call time
    pub api_key_env: String,
    lookup: CredentialLookup,
}

impl RelayConfig {
    /// Relay whose credential is read from the process environment.
    pub fn new(url: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key_env: api_key_env.into(),
            lookup: env_lookup,
        }
    }

    /// Replace where the credential is looked up.
    pub fn with_lookup(mut self, lookup: CredentialLookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Current credential, if one is set.
    pub fn api_key(&self) -> Option<String> {
        (self.lookup)(&self.api_key_env)
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("url", &self.url)
            .field("api_key_env", &self.api_key_env)
            .finish_non_exhaustive()
    }
}

impl From<&QuotaConfig> for RelayConfig {
    fn from(quota: &QuotaConfig) -> Self {
        Self::new(&quota.relay_url, &quota.api_key_env)
    }
}

/// HTTP-backed listing fetcher.
#[derive(Debug)]
pub struct MirrorFetcher {
    client: Client,
    gate: QuotaGate,
    relay: RelayConfig,
    empty_listing_is_failure: bool,
}

impl MirrorFetcher {
    pub fn new(client: Client, gate: QuotaGate, relay: RelayConfig) -> Self {
        Self {
            client,
            gate,
            relay,
            empty_listing_is_failure: false,
        }
    }

    /// Build a fetcher with a fresh client from application settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_async_client(&config.crawler)?;
        let gate = QuotaGate::from_seed(config.quota.threshold, config.quota.seed);
        Ok(Self::new(client, gate, RelayConfig::from(&config.quota))
            .empty_listing_is_failure(config.crawler.empty_listing_is_failure))
    }

    /// Treat a listing without any otrkey names as a failed fetch.
    pub fn empty_listing_is_failure(mut self, enabled: bool) -> Self {
        self.empty_listing_is_failure = enabled;
        self
    }

    async fn fetch_direct(&self, mirror: &MirrorDescriptor) -> reqwest::Result<String> {
        let response = self.client.get(&mirror.list_url).send().await?;
        Self::read_body(response).await
    }

    async fn fetch_relayed(&self, mirror: &MirrorDescriptor) -> reqwest::Result<String> {
        let mut params: Vec<(&str, String)> = Vec::with_capacity(2);
        match self.relay.api_key() {
            Some(key) => params.push(("api_key", key)),
            None => log::debug!(
                "{} is not set, calling relay without credential",
                self.relay.api_key_env
            ),
        }
        params.push(("url", mirror.list_url.clone()));

        let response = self
            .client
            .get(&self.relay.url)
            .query(&params)
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn read_body(response: Response) -> reqwest::Result<String> {
        response.error_for_status()?.text().await
    }

    fn failure(mirror: &MirrorDescriptor, message: impl std::fmt::Display) -> FetchOutcome {
        FetchOutcome::Failure(AppError::fetch(&mirror.name, &mirror.list_url, message).to_string())
    }
}

#[async_trait]
impl ListingFetch for MirrorFetcher {
    async fn fetch(&self, mirror: &MirrorDescriptor) -> FetchOutcome {
        let body = match mirror.access_policy {
            AccessPolicy::Direct => self.fetch_direct(mirror).await,
            AccessPolicy::QuotaLimitedProxy => {
                if !self.gate.admit() {
                    log::debug!(
                        "Quota gate declined relay call for {} (threshold {})",
                        mirror.name,
                        self.gate.threshold()
                    );
                    return FetchOutcome::Failure(QUOTA_SKIP_REASON.to_string());
                }
                self.fetch_relayed(mirror).await
            }
        };

        match body {
            Ok(text) => {
                let files: Vec<String> = extract(&text).into_iter().collect();
                if files.is_empty() && self.empty_listing_is_failure {
                    Self::failure(mirror, "no files found in server response")
                } else {
                    FetchOutcome::Success(files)
                }
            }
            Err(e) => Self::failure(mirror, http::describe_error(&e)),
        }
    }
}
