use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use futures::channel::oneshot;

use crate::provision::{ensure_dir, target_path};
use crate::{
    ContainerIdentifier, ContainerProvider, Dispatcher, PlatformContainer, ResolutionError,
    ResolverConfig, StorageRoot,
};

/// Resolves a container root and provisions a subdirectory below it.
///
/// The resolver holds no state besides its provider and defaults; every call
/// asks the provider again and re-checks the filesystem.
#[derive(Debug)]
pub struct StorageRootResolver<P = PlatformContainer> {
    provider: Arc<P>,
    config: ResolverConfig,
}

impl<P> Clone for StorageRootResolver<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl StorageRootResolver<PlatformContainer> {
    /// A resolver backed by the current platform.
    #[must_use]
    pub fn platform() -> Self {
        Self::new(PlatformContainer)
    }
}

impl<P: ContainerProvider + 'static> StorageRootResolver<P> {
    /// Create a resolver with the default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    /// Create a resolver with explicit defaults.
    pub fn with_config(provider: P, config: ResolverConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// The defaults this resolver applies.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve using the configured default container and subpath.
    ///
    /// # Errors
    /// See [`resolve`](Self::resolve).
    pub async fn resolve_default(&self) -> Result<StorageRoot, ResolutionError> {
        self.resolve(None, self.config.subpath.clone()).await
    }

    /// Resolve `subpath` inside the container named by `identifier`.
    ///
    /// The lookup and any directory creation run on a worker thread spawned for this
    /// call; the returned future completes on whichever context awaits it.
    ///
    /// # Errors
    /// - [`ResolutionError::ContainerUnavailable`] if the provider has no root for the container.
    /// - [`ResolutionError::ProvisioningFailed`] if the directory could not be checked or created.
    pub async fn resolve(
        &self,
        identifier: Option<ContainerIdentifier>,
        subpath: impl Into<PathBuf>,
    ) -> Result<StorageRoot, ResolutionError> {
        let subpath = subpath.into();
        let (tx, rx) = oneshot::channel();
        let worker = self.clone();
        let target = subpath.clone();

        thread::spawn(move || {
            let _ = tx.send(worker.resolve_blocking(identifier.as_ref(), &target));
        });

        rx.await.unwrap_or_else(|_| {
            log::error!("storage root worker terminated before reporting a result");
            Err(ResolutionError::provisioning(
                subpath,
                "resolution worker terminated unexpectedly",
            ))
        })
    }

    /// Resolve on a worker thread and hand the result to `completion` through `dispatcher`.
    ///
    /// Use this from contexts that cannot await, such as a UI thread draining a
    /// [`MainQueue`](crate::MainQueue).
    pub fn resolve_with<D, F>(
        &self,
        identifier: Option<ContainerIdentifier>,
        subpath: impl Into<PathBuf>,
        dispatcher: D,
        completion: F,
    ) where
        D: Dispatcher + 'static,
        F: FnOnce(Result<StorageRoot, ResolutionError>) + Send + 'static,
    {
        let subpath = subpath.into();
        let worker = self.clone();

        thread::spawn(move || {
            let result = worker.resolve_blocking(identifier.as_ref(), &subpath);
            dispatcher.dispatch(Box::new(move || completion(result)));
        });
    }

    /// Resolve on the current thread.
    ///
    /// This blocks on the platform lookup and the filesystem; never call it from a
    /// latency-sensitive context.
    ///
    /// # Errors
    /// See [`resolve`](Self::resolve).
    pub fn resolve_blocking(
        &self,
        identifier: Option<&ContainerIdentifier>,
        subpath: &Path,
    ) -> Result<StorageRoot, ResolutionError> {
        let identifier = identifier.or(self.config.default_identifier.as_ref());

        let Some(root) = self.provider.container_root(identifier) else {
            log::warn!(
                "container {} is unavailable",
                identifier.map_or("<default>", ContainerIdentifier::as_str)
            );
            return Err(ResolutionError::ContainerUnavailable {
                identifier: identifier.cloned(),
            });
        };
        log::debug!("container root resolved to {}", root.display());

        let target = target_path(&root, subpath)?;
        match ensure_dir(&target) {
            Ok(created) => {
                if created {
                    log::info!("created storage root {}", target.display());
                }
                Ok(StorageRoot::new(target, created))
            }
            Err(e) => {
                log::warn!("{e}");
                Err(e)
            }
        }
    }
}
