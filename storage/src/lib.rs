//! Cloud-synced storage roots.
//!
//! This crate resolves the root directory of a cloud storage container (an iCloud
//! ubiquity container on Apple platforms), makes sure a named subdirectory exists
//! below it and hands back the verified path.
//!
//! Resolution is stateless: every call asks the platform again and re-checks the
//! filesystem. The blocking work never runs on the caller's context; results come
//! back either through a future or through a [`Dispatcher`] such as [`MainQueue`].
//!
//! ```no_run
//! use ubiquity_storage::StorageRootResolver;
//!
//! async fn documents() {
//!     let resolver = StorageRootResolver::platform();
//!     match resolver.resolve(None, "Documents").await {
//!         Ok(root) => println!("iCloud documents at {}", root.path().display()),
//!         Err(e) => println!("{} ({})", e, e.code()),
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod dispatch;
mod provider;
mod provision;
mod resolver;

/// Platform-specific implementations.
pub mod sys;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, DEFAULT_SUBPATH, ResolverConfig};
pub use dispatch::{Dispatcher, Immediate, Job, MainQueue, MainQueueHandle};
pub use provider::{ContainerProvider, FixedContainer, PlatformContainer};
pub use resolver::StorageRootResolver;

/// Opaque name of a logical cloud storage container, e.g. `iCloud.com.example.app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerIdentifier(String);

impl ContainerIdentifier {
    /// Wrap a container identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContainerIdentifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A resolved storage directory that existed when it was returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
    created: bool,
}

impl StorageRoot {
    pub(crate) const fn new(path: PathBuf, created: bool) -> Self {
        Self { path, created }
    }

    /// Absolute path of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this resolution had to create the directory.
    #[must_use]
    pub const fn was_created(&self) -> bool {
        self.created
    }

    /// Consume the root and return its path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for StorageRoot {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Errors that can occur while resolving a storage root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The cloud service backing the container is not configured, signed in or entitled.
    #[error("container {} is not available", .identifier.as_ref().map_or("<default>", ContainerIdentifier::as_str))]
    ContainerUnavailable {
        /// The identifier that was asked for, `None` for the default container.
        identifier: Option<ContainerIdentifier>,
    },
    /// Checking or creating the target directory failed.
    #[error("failed to provision {}: {message}", .path.display())]
    ProvisioningFailed {
        /// The directory that could not be provisioned.
        path: PathBuf,
        /// Description of the underlying I/O error.
        message: String,
    },
}

impl ResolutionError {
    /// Stable error code used on the call bridge.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ContainerUnavailable { .. } => "ICLOUD_UNAVAILABLE",
            Self::ProvisioningFailed { .. } => "DIRECTORY_CREATION_FAILED",
        }
    }

    /// Whether calling again without outside intervention may succeed.
    ///
    /// An unavailable container needs the user to sign in or the app to be entitled,
    /// so only provisioning failures are worth retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::ProvisioningFailed { .. })
    }

    pub(crate) fn provisioning(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::ProvisioningFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
