//! # Ubiquity
//!
//! Cloud container storage roots for native app shells.
//!
//! Ubiquity resolves the directory of a cloud storage container (an iCloud ubiquity
//! container on Apple platforms), provisions a subdirectory such as `Documents` below it,
//! and exposes the result to a cross-platform shell through a method-call bridge.
//!
//! ## Features
//!
//! - `storage`: Container lookup, directory provisioning and result dispatching.
//! - `channel`: The method-call bridge and the `getICloudDocumentsPath` handler.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! ubiquity = { version = "0.1", features = ["channel"] }
//! ```
//!
//! ```rust,ignore
//! use ubiquity::channel::{self, MethodCall, MethodChannel};
//! use ubiquity::storage::StorageRootResolver;
//!
//! async fn documents_path() {
//!     let mut bridge = MethodChannel::new(channel::DEFAULT_CHANNEL_NAME);
//!     channel::register_icloud(&mut bridge, StorageRootResolver::platform());
//!
//!     let response = bridge.call(MethodCall::new(channel::GET_ICLOUD_DOCUMENTS_PATH)).await;
//!     println!("{response:?}");
//! }
//! ```

#[cfg(feature = "channel")]
pub use ubiquity_channel as channel;

#[cfg(feature = "storage")]
pub use ubiquity_storage as storage;
