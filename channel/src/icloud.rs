//! `getICloudDocumentsPath`: provisions the iCloud documents directory for the shell.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use ubiquity_storage::{
    ContainerIdentifier, ContainerProvider, Immediate, PlatformContainer, StorageRootResolver,
};

use crate::{ChannelError, MethodCall, MethodChannel, MethodHandler, Reply, codes};

/// Method name the shell calls to obtain the documents path.
pub const GET_ICLOUD_DOCUMENTS_PATH: &str = "getICloudDocumentsPath";

/// Optional overrides a caller may pass. Both fall back to the resolver's config.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct DocumentsPathArgs {
    container_identifier: Option<ContainerIdentifier>,
    subpath: Option<PathBuf>,
}

impl DocumentsPathArgs {
    fn parse(arguments: Value) -> Result<Self, ChannelError> {
        if arguments.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(arguments).map_err(|e| {
            ChannelError::new(
                codes::INVALID_ARGUMENTS,
                format!("Invalid arguments for {GET_ICLOUD_DOCUMENTS_PATH}"),
            )
            .with_details(e.to_string())
        })
    }
}

/// Answers `getICloudDocumentsPath` with the absolute path of the provisioned
/// directory, or a structured error.
#[derive(Debug)]
pub struct DocumentsPathHandler<P = PlatformContainer> {
    resolver: StorageRootResolver<P>,
}

impl<P: ContainerProvider + 'static> DocumentsPathHandler<P> {
    /// Serve documents paths from `resolver`.
    pub const fn new(resolver: StorageRootResolver<P>) -> Self {
        Self { resolver }
    }
}

impl<P: ContainerProvider + 'static> MethodHandler for DocumentsPathHandler<P> {
    fn handle(&self, call: MethodCall, reply: Reply) {
        let args = match DocumentsPathArgs::parse(call.arguments) {
            Ok(args) => args,
            Err(e) => {
                reply.error(e);
                return;
            }
        };
        let subpath = args
            .subpath
            .unwrap_or_else(|| self.resolver.config().subpath.clone());

        // The reply marshals back onto the channel's dispatcher, so the worker can
        // complete immediately.
        self.resolver
            .resolve_with(args.container_identifier, subpath, Immediate, move |result| {
                match result {
                    Ok(root) => reply.success(root.path().to_string_lossy().into_owned()),
                    Err(e) => reply.error(e),
                }
            });
    }
}

/// Register the iCloud documents handler on `channel`.
pub fn register_icloud<P: ContainerProvider + 'static>(
    channel: &mut MethodChannel,
    resolver: StorageRootResolver<P>,
) {
    channel.register(GET_ICLOUD_DOCUMENTS_PATH, DocumentsPathHandler::new(resolver));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelConfig, MethodResponse};
    use serde_json::json;
    use std::fs;
    use ubiquity_storage::{FixedContainer, MainQueue, ResolverConfig};

    fn channel_with(provider: FixedContainer) -> MethodChannel {
        let mut channel = MethodChannel::from_config(&ChannelConfig::default());
        register_icloud(&mut channel, StorageRootResolver::new(provider));
        channel
    }

    #[tokio::test]
    async fn provisions_documents_in_simulated_container() {
        let tmp = tempfile::tempdir().unwrap();
        let sim = tmp.path().join("sim/icloud");
        let channel = channel_with(FixedContainer::new(&sim));

        let response = channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await;

        let expected = sim.join("Documents");
        assert_eq!(
            response,
            MethodResponse::Success(json!(expected.to_string_lossy()))
        );
        assert!(expected.is_dir());
    }

    #[tokio::test]
    async fn existing_documents_directory_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = tmp.path().join("Documents");
        fs::create_dir(&documents).unwrap();
        fs::write(documents.join("notes.md"), b"# notes").unwrap();
        let channel = channel_with(FixedContainer::new(tmp.path()));

        let response = channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await;

        assert_eq!(
            response,
            MethodResponse::Success(json!(documents.to_string_lossy()))
        );
        assert!(documents.join("notes.md").is_file());
    }

    #[tokio::test]
    async fn unavailable_container_reports_icloud_unavailable() {
        let channel = channel_with(FixedContainer::unavailable());

        let response = channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await;

        let MethodResponse::Error(err) = response else {
            panic!("expected an error, got {response:?}");
        };
        assert_eq!(err.code, codes::ICLOUD_UNAVAILABLE);
        assert_eq!(err.message, "iCloud container is not available");
        assert_eq!(
            err.details.as_deref(),
            Some("Make sure iCloud is enabled and the app has proper entitlements")
        );
    }

    #[tokio::test]
    async fn creation_failure_reports_directory_creation_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let blocked = tmp.path().join("container");
        fs::write(&blocked, b"").unwrap();
        let channel = channel_with(FixedContainer::new(&blocked));

        let response = channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await;

        let MethodResponse::Error(err) = response else {
            panic!("expected an error, got {response:?}");
        };
        assert_eq!(err.code, codes::DIRECTORY_CREATION_FAILED);
        assert_eq!(err.message, "Failed to create iCloud directory");
        assert!(err.details.is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn arguments_override_container_and_subpath() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = FixedContainer::unavailable()
            .with_container("iCloud.com.example.notes", tmp.path().join("notes"));
        let channel = channel_with(provider);

        let call = MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH).with_arguments(json!({
            "containerIdentifier": "iCloud.com.example.notes",
            "subpath": "Archive/2024",
        }));
        let response = channel.call(call).await;

        let expected = tmp.path().join("notes/Archive/2024");
        assert_eq!(
            response,
            MethodResponse::Success(json!(expected.to_string_lossy()))
        );
        assert!(expected.is_dir());
    }

    #[tokio::test]
    async fn configured_subpath_is_the_default() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = StorageRootResolver::with_config(
            FixedContainer::new(tmp.path()),
            ResolverConfig::new().with_subpath("Projects"),
        );
        let mut channel = MethodChannel::new("test");
        register_icloud(&mut channel, resolver);

        let response = channel.call(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH)).await;

        assert_eq!(
            response,
            MethodResponse::Success(json!(tmp.path().join("Projects").to_string_lossy()))
        );
    }

    #[tokio::test]
    async fn bad_arguments_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let channel = channel_with(FixedContainer::new(tmp.path()));

        let call = MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH).with_arguments(json!({ "subpath": 7 }));
        let response = channel.call(call).await;

        assert_eq!(response.error_code(), Some(codes::INVALID_ARGUMENTS));
        assert!(!tmp.path().join("Documents").exists());
    }

    #[tokio::test]
    async fn unknown_method_on_icloud_channel_is_not_implemented() {
        let channel = channel_with(FixedContainer::new("/sim/icloud"));

        let response = channel.call(MethodCall::new("getICloudDownloadsPath")).await;

        assert_eq!(response, MethodResponse::NotImplemented);
    }

    #[test]
    fn reply_is_delivered_on_the_owning_queue() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = MainQueue::new();
        let mut channel = MethodChannel::with_dispatcher("test", queue.handle());
        register_icloud(&mut channel, StorageRootResolver::new(FixedContainer::new(tmp.path())));

        let owner = std::thread::current().id();
        let (tx, rx) = std::sync::mpsc::channel();
        channel.invoke(MethodCall::new(GET_ICLOUD_DOCUMENTS_PATH), move |response| {
            tx.send((std::thread::current().id(), response)).unwrap();
        });

        while queue.run_pending() == 0 {
            std::thread::yield_now();
        }

        let (thread_id, response) = rx.recv().unwrap();
        assert_eq!(thread_id, owner);
        assert!(response.is_success());
    }
}
