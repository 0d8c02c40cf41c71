use crate::config::types::{Config, CrawlerConfig, OutputConfig, ScheduleConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_schedule_config(&config.schedule)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_site_url(&config.site_url)?;

    if config.max_concurrent_items < 1 || config.max_concurrent_items > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_items must be between 1 and 100, got {}",
            config.max_concurrent_items
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    if config.comment_concurrency == Some(0) {
        return Err(ConfigError::Validation(
            "comment_concurrency must be >= 1 when set".to_string(),
        ));
    }

    if config.cycle_timeout == Some(0) {
        return Err(ConfigError::Validation(
            "cycle_timeout must be >= 1 second when set".to_string(),
        ));
    }

    Ok(())
}

/// The site URL must be an absolute http(s) URL with a host
fn validate_site_url(site_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(site_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site_url '{}': {}", site_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "site_url '{}' must use http or https",
            site_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "site_url '{}' has no host",
            site_url
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates polling configuration
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if !config.once && config.period == 0 {
        return Err(ConfigError::Validation(
            "period must be >= 1 second unless running once".to_string(),
        ));
    }

    Ok(())
}
