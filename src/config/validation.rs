//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchlistConfig → Result<(), Vec<ValidationError>>
//! - The filesystem is not consulted; list construction checks directories

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WatchlistConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no lists configured")]
    NoLists,

    #[error("list #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("list name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("list '{0}' has an empty path")]
    EmptyPath(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &WatchlistConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.lists.is_empty() {
        errors.push(ValidationError::NoLists);
    }

    let mut seen = HashSet::new();
    for (index, list) in config.lists.iter().enumerate() {
        if list.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(list.name.as_str()) {
            errors.push(ValidationError::DuplicateName(list.name.clone()));
        }

        if list.path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyPath(list.name.clone()));
        }
    }

    let metrics_address = &config.observability.metrics_address;
    if !metrics_address.is_empty() && metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ListConfig;
    use crate::matcher::Policy;

    fn list(name: &str, path: &str) -> ListConfig {
        ListConfig {
            name: name.into(),
            path: path.into(),
            policy: Policy::Deny,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = WatchlistConfig::default();
        config.lists.push(list("banned", "/tmp/banned.txt"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_config() {
        let errors = validate_config(&WatchlistConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoLists]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WatchlistConfig::default();
        config.lists.push(list("a", "a.txt"));
        config.lists.push(list("a", ""));
        config.lists.push(list(" ", "c.txt"));
        config.observability.metrics_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateName("a".into()),
                ValidationError::EmptyPath("a".into()),
                ValidationError::EmptyName { index: 2 },
                ValidationError::InvalidMetricsAddress("not-an-address".into()),
            ]
        );
    }
}
