use crate::config::types::Config;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates a parsed configuration
///
/// Catches everything that would otherwise surface mid-crawl: a missing or
/// relative seed, zero-sized pools or queues, an uncompilable filter pattern.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed(&config.crawl.seed)?;

    if config.crawl.page_workers == 0 {
        return Err(ConfigError::Validation(
            "page-workers must be greater than 0".to_string(),
        ));
    }

    if config.crawl.image_workers == 0 {
        return Err(ConfigError::Validation(
            "image-workers must be greater than 0".to_string(),
        ));
    }

    if config.crawl.harvesters == 0 {
        return Err(ConfigError::Validation(
            "harvesters must be greater than 0".to_string(),
        ));
    }

    if config.crawl.queue_size == 0 {
        return Err(ConfigError::Validation(
            "queue-size must be greater than 0".to_string(),
        ));
    }

    if let Some(pattern) = &config.filter.pattern {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", pattern, e)))?;
    }

    if config.output.mirror_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mirror-dir must not be empty".to_string(),
        ));
    }

    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.user_agent.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed URL: must parse, be http(s), and carry a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed).map_err(|e| ConfigError::InvalidSeed(format!("{}: {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidSeed(format!(
            "{}: only http and https seeds are supported",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidSeed(format!("{}: missing host", seed)));
    }

    Ok(())
}
