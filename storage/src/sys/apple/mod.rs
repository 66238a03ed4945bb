//! Apple platform (iOS/macOS) ubiquity container lookup using swift-bridge.

use crate::ContainerIdentifier;
use std::path::PathBuf;

#[swift_bridge::bridge]
mod ffi {
    extern "Swift" {
        fn ubiquity_container_path(identifier: Option<String>) -> Option<String>;
    }
}

/// Root of the ubiquity container, via `FileManager.url(forUbiquityContainerIdentifier:)`.
///
/// Returns `None` when iCloud is signed out, disabled for the app, or the app lacks
/// the iCloud entitlement. May block while iCloud sets the container up, so this
/// must stay off the main thread.
#[must_use]
pub fn container_root(identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
    ffi::ubiquity_container_path(identifier.map(|id| id.as_str().to_owned())).map(PathBuf::from)
}
