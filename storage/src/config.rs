use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::ContainerIdentifier;

/// Subdirectory provisioned when none is configured.
pub const DEFAULT_SUBPATH: &str = "Documents";

/// Errors produced while loading a [`ResolverConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be parsed.
    #[error("invalid resolver config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Defaults applied when a resolution request leaves them out.
///
/// Host shells usually hand this over as JSON:
///
/// ```
/// use ubiquity_storage::ResolverConfig;
///
/// let config = ResolverConfig::from_json(r#"{ "default_identifier": "iCloud.com.example.app" }"#)
///     .unwrap();
/// assert_eq!(config.subpath.to_str(), Some("Documents"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Container used when a request names none. `None` lets the platform pick
    /// the first container the app is entitled to.
    pub default_identifier: Option<ContainerIdentifier>,
    /// Subdirectory provisioned under the container root.
    pub subpath: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_identifier: None,
            subpath: PathBuf::from(DEFAULT_SUBPATH),
        }
    }
}

impl ResolverConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the input is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the container used when a request names none.
    #[must_use]
    pub fn with_default_identifier(mut self, identifier: impl Into<ContainerIdentifier>) -> Self {
        self.default_identifier = Some(identifier.into());
        self
    }

    /// Set the subdirectory provisioned under the container root.
    #[must_use]
    pub fn with_subpath(mut self, subpath: impl Into<PathBuf>) -> Self {
        self.subpath = subpath.into();
        self
    }
}
