use std::collections::HashMap;
use std::path::PathBuf;

use crate::{ContainerIdentifier, sys};

/// Looks up the root directory of a cloud storage container.
///
/// This is the only place the resolver talks to the platform. The lookup may block
/// (the Apple implementation can wait on iCloud metadata), so it is only ever called
/// from a worker thread.
pub trait ContainerProvider: Send + Sync {
    /// Root directory of the container, or `None` if the container is unavailable.
    ///
    /// `None` as the identifier asks for the process-default container.
    fn container_root(&self, identifier: Option<&ContainerIdentifier>) -> Option<PathBuf>;
}

impl<F> ContainerProvider for F
where
    F: Fn(Option<&ContainerIdentifier>) -> Option<PathBuf> + Send + Sync,
{
    fn container_root(&self, identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
        self(identifier)
    }
}

/// The container provider of the current platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformContainer;

impl ContainerProvider for PlatformContainer {
    fn container_root(&self, identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
        sys::container_root(identifier)
    }
}

/// Containers at fixed locations, for simulators and tests.
///
/// ```
/// use ubiquity_storage::{ContainerProvider, FixedContainer};
///
/// let provider = FixedContainer::new("/sim/icloud")
///     .with_container("iCloud.com.example.notes", "/sim/notes");
///
/// assert_eq!(provider.container_root(None).unwrap().to_str(), Some("/sim/icloud"));
/// assert!(provider.container_root(Some(&"iCloud.com.other".into())).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixedContainer {
    default_root: Option<PathBuf>,
    named: HashMap<ContainerIdentifier, PathBuf>,
}

impl FixedContainer {
    /// A provider whose default container lives at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            default_root: Some(root.into()),
            named: HashMap::new(),
        }
    }

    /// A provider for which every container is unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Register a named container at `root`.
    #[must_use]
    pub fn with_container(
        mut self,
        identifier: impl Into<ContainerIdentifier>,
        root: impl Into<PathBuf>,
    ) -> Self {
        self.named.insert(identifier.into(), root.into());
        self
    }
}

impl ContainerProvider for FixedContainer {
    fn container_root(&self, identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
        match identifier {
            Some(id) => self.named.get(id).cloned(),
            None => self.default_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_container_resolves_named_and_default() {
        let provider = FixedContainer::new("/sim/icloud").with_container("iCloud.a", "/sim/a");
        assert_eq!(provider.container_root(None), Some(PathBuf::from("/sim/icloud")));
        assert_eq!(
            provider.container_root(Some(&"iCloud.a".into())),
            Some(PathBuf::from("/sim/a"))
        );
        assert_eq!(provider.container_root(Some(&"iCloud.b".into())), None);
    }

    #[test]
    fn unavailable_has_no_default() {
        assert_eq!(FixedContainer::unavailable().container_root(None), None);
    }

    #[test]
    fn closures_are_providers() {
        let provider = |id: Option<&ContainerIdentifier>| {
            id.map(|id| PathBuf::from("/containers").join(id.as_str()))
        };
        assert_eq!(
            provider.container_root(Some(&"iCloud.x".into())),
            Some(PathBuf::from("/containers/iCloud.x"))
        );
        assert_eq!(provider.container_root(None), None);
    }
}
