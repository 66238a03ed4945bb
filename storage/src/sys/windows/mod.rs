//! Windows lookup through the iCloud for Windows sync folder.

use crate::ContainerIdentifier;
use std::path::PathBuf;

/// Folder iCloud for Windows syncs iCloud Drive into, under the user profile.
const ICLOUD_DRIVE: &str = "iCloudDrive";

/// Root of iCloud Drive when iCloud for Windows is installed and signed in.
///
/// iCloud for Windows only syncs the shared iCloud Drive, so named containers
/// are unavailable.
#[must_use]
pub fn container_root(identifier: Option<&ContainerIdentifier>) -> Option<PathBuf> {
    if let Some(id) = identifier {
        log::debug!("iCloud for Windows has no per-app container {id}");
        return None;
    }

    let root = dirs::home_dir()?.join(ICLOUD_DRIVE);
    root.is_dir().then_some(root)
}
