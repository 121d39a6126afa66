//! Configuration validation.
//!
//! Checks numeric service settings before the store or server starts, then
//! builds [`ServiceSettings`] from them.

use crate::domain::error::StockfolioError;
use crate::domain::price_fanout::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_CONCURRENCY, FanoutConfig};
use crate::domain::service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, ServiceSettings};
use crate::ports::config_port::ConfigPort;
use std::time::Duration;

pub fn validate_service_config(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    validate_max_concurrency(config)?;
    validate_timeout(config)?;
    validate_page_sizes(config)?;
    validate_provider_kind(config)?;
    Ok(())
}

/// Validate, then read the settings. Missing keys fall back to defaults.
pub fn build_service_settings(
    config: &dyn ConfigPort,
) -> Result<ServiceSettings, StockfolioError> {
    validate_service_config(config)?;
    Ok(ServiceSettings {
        fanout: FanoutConfig {
            max_concurrency: config.get_int(
                "provider",
                "max_concurrency",
                DEFAULT_MAX_CONCURRENCY as i64,
            ) as usize,
            timeout: Duration::from_millis(config.get_int(
                "provider",
                "timeout_ms",
                DEFAULT_LOOKUP_TIMEOUT.as_millis() as i64,
            ) as u64),
        },
        default_page_size: config.get_int("pagination", "default_limit", DEFAULT_PAGE_SIZE as i64)
            as usize,
        max_page_size: config.get_int("pagination", "max_limit", MAX_PAGE_SIZE as i64) as usize,
    })
}

fn validate_max_concurrency(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    let value = config.get_int("provider", "max_concurrency", DEFAULT_MAX_CONCURRENCY as i64);
    if value <= 0 {
        return Err(StockfolioError::ConfigInvalid {
            section: "provider".to_string(),
            key: "max_concurrency".to_string(),
            reason: "max_concurrency must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    let value = config.get_int(
        "provider",
        "timeout_ms",
        DEFAULT_LOOKUP_TIMEOUT.as_millis() as i64,
    );
    if value <= 0 {
        return Err(StockfolioError::ConfigInvalid {
            section: "provider".to_string(),
            key: "timeout_ms".to_string(),
            reason: "timeout_ms must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_page_sizes(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    let default_limit = config.get_int("pagination", "default_limit", DEFAULT_PAGE_SIZE as i64);
    let max_limit = config.get_int("pagination", "max_limit", MAX_PAGE_SIZE as i64);
    if max_limit <= 0 {
        return Err(StockfolioError::ConfigInvalid {
            section: "pagination".to_string(),
            key: "max_limit".to_string(),
            reason: "max_limit must be positive".to_string(),
        });
    }
    if default_limit <= 0 || default_limit > max_limit {
        return Err(StockfolioError::ConfigInvalid {
            section: "pagination".to_string(),
            key: "default_limit".to_string(),
            reason: format!("default_limit must be between 1 and {max_limit}"),
        });
    }
    Ok(())
}

fn validate_provider_kind(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    match config.get_string("provider", "kind").as_deref() {
        None | Some("alphavantage") | Some("constituents") => Ok(()),
        Some(other) => Err(StockfolioError::ConfigInvalid {
            section: "provider".to_string(),
            key: "kind".to_string(),
            reason: format!("unknown provider kind '{other}' (expected alphavantage or constituents)"),
        }),
    }
}
