// src/utils/http.rs

//! HTTP client utilities.

use std::error::Error as StdError;
use std::time::Duration;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Render a request error with its full cause chain.
///
/// `reqwest` keeps the interesting part (DNS failure, TLS error, timeout)
/// in the source chain rather than in its own message.
pub fn describe_error(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("timed out: {error}")
    } else if let Some(status) = error.status() {
        format!("HTTP {status}")
    } else {
        error.to_string()
    };

    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_async_client() {
        let config = CrawlerConfig::default();
        assert!(create_async_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_describe_connection_error() {
        let client = reqwest::Client::new();
        // Port 9 (discard) is closed on loopback in test environments.
        let error = client
            .get("http://127.0.0.1:9/list")
            .send()
            .await
            .unwrap_err();
        let message = describe_error(&error);
        assert!(message.contains("127.0.0.1:9"), "{message}");
    }
}
