// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::{Config, MirrorDescriptor};
use crate::services::RelayConfig;

/// Counts reported by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub direct_mirrors: usize,
    pub proxied_mirrors: usize,
    pub searchable_mirrors: usize,
}

/// Validate application settings and the mirror list.
pub fn run_validate(config: &Config) -> Result<ValidationReport> {
    config.validate()?;
    log::info!("✓ Config OK");
    log::info!("  User-Agent: {}", config.crawler.user_agent);
    log::info!("  Timeout: {}s", config.crawler.timeout_secs);
    log::info!("  Max concurrent: {}", config.crawler.max_concurrent);
    log::info!("  Quota threshold: {}", config.quota.threshold);

    let mirrors =
        MirrorDescriptor::load_all(&config.paths.mirrors_file, &config.quota.proxy_tag)?;

    let proxied_mirrors = mirrors.iter().filter(|m| m.is_proxied()).count();
    let report = ValidationReport {
        direct_mirrors: mirrors.len() - proxied_mirrors,
        proxied_mirrors,
        searchable_mirrors: mirrors.iter().filter(|m| m.search_url.is_some()).count(),
    };

    log::info!(
        "✓ Mirror list OK: {} mirrors ({} direct, {} via relay)",
        mirrors.len(),
        report.direct_mirrors,
        report.proxied_mirrors
    );
    if report.proxied_mirrors > 0 && RelayConfig::from(&config.quota).api_key().is_none() {
        log::warn!(
            "{} is not set; relay calls will fail authentication",
            config.quota.api_key_env
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_counts_policies() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mirrors.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "a", "list_url": "https://a.example/", "proxy": "",
                 "search_url": "https://a.example/?q={query}"},
                {"name": "b", "list_url": "https://b.example/", "proxy": "PROXY1"},
                {"name": "c", "list_url": "https://c.example/"}
            ]"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.paths.mirrors_file = path;

        let report = run_validate(&config).unwrap();
        assert_eq!(
            report,
            ValidationReport {
                direct_mirrors: 2,
                proxied_mirrors: 1,
                searchable_mirrors: 1,
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut config = Config::default();
        config.crawler.timeout_secs = 0;
        assert!(run_validate(&config).is_err());
    }
}
