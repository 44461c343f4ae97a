//! Organization creation configuration.
//!
//! Loaded from environment variables with defaults matching the standard
//! organization form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum organization name length, in characters.
pub const DEFAULT_NAME_MAX_LENGTH: usize = 255;

/// Default error bag for organization creation failures.
pub const DEFAULT_VALIDATION_BAG: &str = "createOrganization";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings for [`OrganizationCreator`](crate::creator::OrganizationCreator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorConfig {
    /// Maximum organization name length in characters.
    pub name_max_length: usize,

    /// Error bag validation failures are reported under.
    pub validation_bag: String,

    /// Maximum non-personal organizations one principal may own.
    /// `None` means unlimited.
    pub max_owned_organizations: Option<usize>,

    /// Whether to publish `organization.created` events when a bus is attached.
    pub publish_events: bool,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
            validation_bag: DEFAULT_VALIDATION_BAG.to_string(),
            max_owned_organizations: None,
            publish_events: true,
        }
    }
}

impl CreatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ORG_NAME_MAX_LENGTH`: Maximum name length (default: 255)
    /// - `ORG_VALIDATION_BAG`: Error bag name (default: createOrganization)
    /// - `ORG_MAX_OWNED`: Per-principal organization quota (default: unlimited)
    /// - `ORG_PUBLISH_EVENTS`: Publish creation events (default: true)
    ///
    /// Unparseable numbers fall back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            name_max_length: std::env::var("ORG_NAME_MAX_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.name_max_length),
            validation_bag: std::env::var("ORG_VALIDATION_BAG")
                .unwrap_or(default.validation_bag),
            max_owned_organizations: std::env::var("ORG_MAX_OWNED")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(default.max_owned_organizations),
            publish_events: std::env::var("ORG_PUBLISH_EVENTS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.publish_events),
        }
    }

    /// Reject settings that would make every creation fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name_max_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ORG_NAME_MAX_LENGTH".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.validation_bag.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ORG_VALIDATION_BAG".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.max_owned_organizations == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "ORG_MAX_OWNED".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CreatorConfig::default();
        assert_eq!(config.name_max_length, 255);
        assert_eq!(config.validation_bag, "createOrganization");
        assert!(config.max_owned_organizations.is_none());
        assert!(config.publish_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = CreatorConfig {
            name_max_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "ORG_NAME_MAX_LENGTH"
        ));

        let config = CreatorConfig {
            validation_bag: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CreatorConfig {
            max_owned_organizations: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
