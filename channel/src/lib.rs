//! Method-call bridge between an application shell and native code.
//!
//! A [`MethodChannel`] receives [`MethodCall`]s by name and answers each one exactly
//! once with a [`MethodResponse`]. Handlers run their blocking work off the caller's
//! context and post the reply back through the channel's
//! [`Dispatcher`](ubiquity_storage::Dispatcher).
//!
//! The crate ships one handler, [`DocumentsPathHandler`], which answers
//! `getICloudDocumentsPath` with the provisioned iCloud documents directory.

#![warn(missing_docs)]

mod channel;
mod codec;
mod config;
mod icloud;

pub use channel::{MethodChannel, MethodHandler, Reply};
pub use codec::{decode_call, decode_response, encode_call, encode_response};
pub use config::{ChannelConfig, DEFAULT_CHANNEL_NAME};
pub use icloud::{DocumentsPathHandler, GET_ICLOUD_DOCUMENTS_PATH, register_icloud};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ubiquity_storage::ResolutionError;

/// Error codes that can appear in [`ChannelError::code`].
pub mod codes {
    /// The cloud container is not available.
    pub const ICLOUD_UNAVAILABLE: &str = "ICLOUD_UNAVAILABLE";
    /// The storage directory could not be created.
    pub const DIRECTORY_CREATION_FAILED: &str = "DIRECTORY_CREATION_FAILED";
    /// A known method was called with arguments it cannot use.
    pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";
    /// The incoming message could not be decoded.
    pub const MALFORMED_CALL: &str = "MALFORMED_CALL";
    /// A handler finished without answering.
    pub const HANDLER_DROPPED: &str = "HANDLER_DROPPED";
}

/// A request sent over the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Name of the method to invoke.
    pub method: String,
    /// Method arguments; `null` when there are none.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// A call without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Attach arguments to the call.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// A structured error sent back over the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelError {
    /// Machine-readable code, see [`codes`].
    pub code: String,
    /// Human-readable summary.
    pub message: String,
    /// Underlying error text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ChannelError {
    /// Create an error without details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach the underlying error text.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<ResolutionError> for ChannelError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::ContainerUnavailable { .. } => {
                Self::new(codes::ICLOUD_UNAVAILABLE, "iCloud container is not available")
                    .with_details(
                        "Make sure iCloud is enabled and the app has proper entitlements",
                    )
            }
            ResolutionError::ProvisioningFailed { message, .. } => Self::new(
                codes::DIRECTORY_CREATION_FAILED,
                "Failed to create iCloud directory",
            )
            .with_details(message),
        }
    }
}

/// The answer to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum MethodResponse {
    /// The call succeeded with a result value.
    Success(Value),
    /// The call failed.
    Error(ChannelError),
    /// No handler is registered for the method.
    NotImplemented,
}

impl MethodResponse {
    /// Whether this is a [`MethodResponse::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The error code, if this is an error response.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error(err) => Some(&err.code),
            _ => None,
        }
    }
}

impl From<ChannelError> for MethodResponse {
    fn from(err: ChannelError) -> Self {
        Self::Error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_maps_to_icloud_unavailable() {
        let err: ChannelError = ResolutionError::ContainerUnavailable { identifier: None }.into();
        assert_eq!(err.code, codes::ICLOUD_UNAVAILABLE);
        assert_eq!(err.message, "iCloud container is not available");
        assert!(err.details.is_some());
    }

    #[test]
    fn provisioning_failure_carries_underlying_text() {
        let err: ChannelError = ResolutionError::ProvisioningFailed {
            path: "/sim/icloud/Documents".into(),
            message: "Permission denied (os error 13)".into(),
        }
        .into();
        assert_eq!(err.code, codes::DIRECTORY_CREATION_FAILED);
        assert_eq!(err.message, "Failed to create iCloud directory");
        assert_eq!(err.details.as_deref(), Some("Permission denied (os error 13)"));
    }

    #[test]
    fn response_helpers() {
        assert!(MethodResponse::Success(json!("/sim")).is_success());
        assert!(!MethodResponse::NotImplemented.is_success());
        let response: MethodResponse = ChannelError::new(codes::MALFORMED_CALL, "bad").into();
        assert_eq!(response.error_code(), Some(codes::MALFORMED_CALL));
        assert_eq!(MethodResponse::NotImplemented.error_code(), None);
    }
}
