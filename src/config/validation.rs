//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the endpoint URL and timeout range
//! - Validate the transfer parameters before any network call
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SenderConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::SenderConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `transfer.to`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &SenderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.network.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "network.rpc_url",
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("network.rpc_url", e.to_string())),
    }

    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "network.rpc_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.transfer.to.trim().is_empty() {
        errors.push(ValidationError::new("transfer.to", "recipient is required"));
    } else {
        // Parse and structural checks share one source of truth with the builder.
        match config.transfer.to_request() {
            Ok(request) => {
                if let Err(e) = request.validate() {
                    errors.push(ValidationError::new("transfer", e.to_string()));
                }
            }
            Err(e) => errors.push(ValidationError::new("transfer", e.to_string())),
        }
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "'{}' is not one of {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
