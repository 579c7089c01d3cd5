use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxyConfig, SiteConfig};
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Upper bound for any worker pool width
const MAX_POOL_WIDTH: usize = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_proxy_config(&config.proxy)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_pool_width("threads", config.threads)?;
    validate_pool_width("listing_threads", config.listing_threads)?;

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.page_start > config.page_end {
        return Err(ConfigError::Validation(format!(
            "page range is empty: page_start {} > page_end {}",
            config.page_start, config.page_end
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_pool_width(name: &str, width: usize) -> Result<(), ConfigError> {
    if width < 1 || width > MAX_POOL_WIDTH {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_POOL_WIDTH, width
        )));
    }
    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.enabled {
        Url::parse(&config.list_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid list_url: {}", e)))?;
        validate_path("cache_path", &config.cache_path)?;
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    Url::parse(&config.sitemap_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sitemap_url: {}", e)))?;

    if config.source_name.is_empty() {
        return Err(ConfigError::Validation(
            "source_name cannot be empty".to_string(),
        ));
    }

    if !config.attribute_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "attribute_path must be an absolute path, got '{}'",
            config.attribute_path
        )));
    }

    for template in &config.categories {
        validate_category_template(template)?;
    }

    Ok(())
}

/// Validates a category listing template (`...?page={}`)
fn validate_category_template(template: &str) -> Result<(), ConfigError> {
    if !template.contains("{}") {
        return Err(ConfigError::Validation(format!(
            "Category template '{}' must contain the '{{}}' page placeholder",
            template
        )));
    }

    Url::parse(&template.replace("{}", "1")).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid category template '{}': {}", template, e))
    })?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    validate_path("urls_path", &config.urls_path)?;
    validate_path("sitemap_dir", &config.sitemap_dir)?;
    validate_path("documents_path", &config.documents_path)?;
    validate_path("successful_path", &config.successful_path)?;
    validate_path("failed_path", &config.failed_path)?;
    validate_path("articles_path", &config.articles_path)?;
    validate_path("articles_successful_path", &config.articles_successful_path)?;
    validate_path("articles_failed_path", &config.articles_failed_path)?;
    validate_path("listing_path", &config.listing_path)?;
    validate_path("failed_listing_path", &config.failed_listing_path)?;
    Ok(())
}

fn validate_path(name: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(())
}
