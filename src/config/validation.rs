//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Parse-check addresses before subsystems consume them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "origin.port").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new(
            "listener.max_connections",
            "must be at least 1",
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be at least 1",
        ));
    }

    match config.origin.protocol.as_str() {
        "http" | "https" => {}
        other => errors.push(ValidationError::new(
            "origin.protocol",
            format!("must be \"http\" or \"https\", got {:?}", other),
        )),
    }
    if config.origin.host.is_empty() {
        errors.push(ValidationError::new("origin.host", "must not be empty"));
    }
    if config.origin.port == 0 {
        errors.push(ValidationError::new("origin.port", "must be non-zero"));
    }
    if !config.origin.base_path.is_empty() {
        if !config.origin.base_path.starts_with('/') {
            errors.push(ValidationError::new(
                "origin.base_path",
                "must start with '/' when set",
            ));
        }
        if config.origin.base_path.ends_with('/') {
            errors.push(ValidationError::new(
                "origin.base_path",
                "must not end with '/'",
            ));
        }
    }
    for (i, addr) in config.origin.resolve.iter().enumerate() {
        if addr.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::new(
                "origin.resolve",
                format!("entry {} is not an IP address: {:?}", i, addr),
            ));
        }
    }

    if config.fetch.timeout_secs == 0 {
        errors.push(ValidationError::new("fetch.timeout_secs", "must be at least 1"));
    }
    if config.fetch.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "fetch.connect_timeout_secs",
            "must be at least 1",
        ));
    }
    if config.fetch.max_in_flight == 0 {
        errors.push(ValidationError::new("fetch.max_in_flight", "must be at least 1"));
    }
    if config.fetch.max_body_bytes == 0 {
        errors.push(ValidationError::new("fetch.max_body_bytes", "must be at least 1"));
    }

    if config.imaging.engine != "gd" {
        errors.push(ValidationError::new(
            "imaging.engine",
            format!("unknown engine {:?} (supported: \"gd\")", config.imaging.engine),
        ));
    }
    if !(1..=100).contains(&config.imaging.quality) {
        errors.push(ValidationError::new("imaging.quality", "must be 1-100"));
    }
    if config.imaging.max_pixels == 0 {
        errors.push(ValidationError::new("imaging.max_pixels", "must be at least 1"));
    }

    match config.cache.expires.as_str() {
        "max" | "off" => {}
        other => {
            if other.parse::<u64>().is_err() {
                errors.push(ValidationError::new(
                    "cache.expires",
                    format!("must be \"max\", \"off\", or seconds, got {:?}", other),
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
