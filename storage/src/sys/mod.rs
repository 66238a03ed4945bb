//! Platform container lookups.

#[cfg(any(target_os = "ios", target_os = "macos"))]
mod apple;
#[cfg(any(target_os = "ios", target_os = "macos"))]
pub use apple::container_root;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::container_root;

#[cfg(not(any(target_os = "ios", target_os = "macos", target_os = "windows")))]
mod stub {
    use crate::ContainerIdentifier;
    use std::path::PathBuf;

    /// No cloud container service on this platform.
    #[must_use]
    pub fn container_root(identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
        log::debug!(
            "no ubiquity containers on this platform (asked for {})",
            identifier.map_or("<default>", ContainerIdentifier::as_str)
        );
        None
    }
}
#[cfg(not(any(target_os = "ios", target_os = "macos", target_os = "windows")))]
pub use stub::container_root;
