//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_git(config)?;
    validate_sync(config)?;
    validate_storage(config)?;
    validate_roll(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn validate_git(config: &Config) -> Result<()> {
    if config.git.remote.is_empty() {
        return Err(invalid("git.remote", "remote cannot be empty").into());
    }

    if config.git.branch.is_empty() {
        return Err(invalid("git.branch", "branch cannot be empty").into());
    }

    Ok(())
}

fn validate_sync(config: &Config) -> Result<()> {
    if config.sync.command.first().map_or(true, |p| p.is_empty()) {
        return Err(invalid("sync.command", "command cannot be empty").into());
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<()> {
    let bucket = &config.storage.bucket;
    let Some((scheme, rest)) = bucket.split_once("://") else {
        return Err(invalid("storage.bucket", "must start with a scheme, e.g. gs://").into());
    };

    if scheme.is_empty() || rest.trim_matches('/').is_empty() {
        return Err(invalid("storage.bucket", "must name a bucket after the scheme").into());
    }

    if bucket.ends_with('/') {
        return Err(invalid("storage.bucket", "must not end with '/'").into());
    }

    if config
        .storage
        .compressible_extensions
        .iter()
        .any(|e| e.is_empty() || e.starts_with('.') || e.contains(','))
    {
        return Err(invalid(
            "storage.compressible_extensions",
            "extensions are bare names like 'mojo' without dots or commas",
        )
        .into());
    }

    Ok(())
}

fn validate_roll(config: &Config) -> Result<()> {
    if config.roll.changelog_file.is_empty() {
        return Err(invalid("roll.changelog_file", "changelog file cannot be empty").into());
    }

    if config.roll.compare_url.ends_with('/') {
        return Err(invalid("roll.compare_url", "must not end with '/'").into());
    }

    Ok(())
}
