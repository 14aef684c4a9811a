use crate::config::types::{
    Config, DispatchConfig, OpenConfig, ProbeConfig, SiteEntry, MAX_DELAY_SECS,
};
use crate::state::Family;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_probe_config(&config.probe)?;
    validate_dispatch_config(&config.dispatch)?;
    validate_open_config(&config.open)?;
    validate_sites(&config.sites)?;
    for domain in &config.skip_domains {
        validate_domain_key(domain)?;
    }
    Ok(())
}

/// Validates probe timing
fn validate_probe_config(config: &ProbeConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be at least 1".to_string(),
        ));
    }

    validate_seconds("base-delay-secs", config.base_delay_secs)?;
    validate_seconds("bucket-delay-secs", config.bucket_delay_secs)?;

    Ok(())
}

/// Validates worker pool sizing
fn validate_dispatch_config(config: &DispatchConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_domains < 1 || config.max_concurrent_domains > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-domains must be between 1 and 100, got {}",
            config.max_concurrent_domains
        )));
    }
    Ok(())
}

/// Validates opener settings
fn validate_open_config(config: &OpenConfig) -> Result<(), ConfigError> {
    if config.opener.trim().is_empty() {
        return Err(ConfigError::Validation("opener cannot be empty".to_string()));
    }
    if let Some(kind) = config
        .skip_kinds
        .iter()
        .find(|kind| kind.family() != Family::ToOpen)
    {
        return Err(ConfigError::Validation(format!(
            "skip-kinds only takes outcomes that are opened, got {}",
            kind
        )));
    }
    Ok(())
}

/// Validates extra site entries
pub(crate) fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in sites {
        validate_domain_key(&entry.domain)?;

        if !seen.insert(entry.domain.as_str()) {
            return Err(ConfigError::DuplicateSite(entry.domain.clone()));
        }

        if entry
            .contains
            .iter()
            .chain(entry.excludes.iter())
            .any(|marker| marker.is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "Site '{}' has an empty marker",
                entry.domain
            )));
        }
    }
    Ok(())
}

fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=MAX_DELAY_SECS).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 0 and {}, got {}",
            name, MAX_DELAY_SECS, value
        )));
    }
    Ok(())
}

/// Validates a domain key, optionally followed by `:port` for local hosts
fn validate_domain_key(key: &str) -> Result<(), ConfigError> {
    let domain = match key.rsplit_once(':') {
        Some((host, port)) if port.parse::<u16>().is_ok() => host,
        _ => key,
    };

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    // Check for invalid characters
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') && domain != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
