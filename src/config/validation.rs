use crate::config::types::{Config, CookieEntry, CrawlerConfig, RoleEntry, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates site identity configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let home = Url::parse(&config.home_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid home-url: {}", e)))?;

    if home.scheme() != "http" && home.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "home-url must be http or https, got scheme '{}'",
            home.scheme()
        )));
    }

    if home.host_str().is_none() {
        return Err(ConfigError::Validation(
            "home-url must have a host".to_string(),
        ));
    }

    if let Some(sitemap) = &config.custom_sitemap {
        Url::parse(sitemap)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid custom-sitemap: {}", e)))?;
    }

    if let Some(ip) = &config.server_ip {
        ip.parse::<std::net::IpAddr>().map_err(|_| {
            ConfigError::Validation(format!("server-ip is not an IP address: '{}'", ip))
        })?;
    }

    if config.role_cookie.is_empty() {
        return Err(ConfigError::Validation(
            "role-cookie cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.threads < 1 || config.threads > 16 {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and 16, got {}",
            config.threads
        )));
    }

    if config.run_duration < 1 {
        return Err(ConfigError::Validation(
            "run-duration must be >= 1 second".to_string(),
        ));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1 second".to_string(),
        ));
    }

    if config.load_limit < 0.0 {
        return Err(ConfigError::Validation(format!(
            "load-limit must be >= 0, got {}",
            config.load_limit
        )));
    }

    for role in &config.roles {
        validate_role(role)?;
    }

    for cookie in &config.cookies {
        validate_cookie(cookie)?;
    }

    Ok(())
}

fn validate_role(role: &RoleEntry) -> Result<(), ConfigError> {
    if role.uid == 0 {
        return Err(ConfigError::Validation(
            "role uid must be > 0 (uid 0 is the built-in guest)".to_string(),
        ));
    }
    Ok(())
}

fn validate_cookie(cookie: &CookieEntry) -> Result<(), ConfigError> {
    if cookie.name.is_empty() {
        return Err(ConfigError::Validation(
            "cookie factor name cannot be empty".to_string(),
        ));
    }

    if cookie.values.is_empty() {
        return Err(ConfigError::Validation(format!(
            "cookie factor '{}' must have at least one value",
            cookie.name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
