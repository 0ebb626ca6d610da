//! Configuration validation.
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("demo.max_work must be at least one second")]
    DemoMaxWork,
}

/// Semantic checks on a deserialized config.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.demo.max_work.as_secs() == 0 {
        errors.push(ValidationError::DemoMaxWork);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
