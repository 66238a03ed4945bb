//! Making sure a directory exists.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::ResolutionError;

/// Join `subpath` onto `root`, refusing anything that could escape the container.
pub fn target_path(root: &Path, subpath: &Path) -> Result<PathBuf, ResolutionError> {
    let escapes = subpath.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ResolutionError::provisioning(
            root.join(subpath),
            format!("subpath {} leaves the container", subpath.display()),
        ));
    }
    Ok(root.join(subpath))
}

/// Ensure `path` exists as a directory, creating it and any missing parents.
///
/// Returns whether this call created it. On failure every directory created here
/// is removed again, so the filesystem looks the way it did before the call.
pub fn ensure_dir(path: &Path) -> Result<bool, ResolutionError> {
    ensure_dir_with(path, |dir| fs::create_dir(dir))
}

fn ensure_dir_with<F>(path: &Path, create: F) -> Result<bool, ResolutionError>
where
    F: Fn(&Path) -> io::Result<()>,
{
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(ResolutionError::provisioning(path, "exists and is not a directory"));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ResolutionError::provisioning(path, e)),
    }

    let missing = missing_ancestors(path);
    let mut created = Vec::with_capacity(missing.len());

    for dir in missing.iter().rev() {
        match create(dir) {
            Ok(()) => created.push(*dir),
            // Someone else got there first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => {
                rollback(&created);
                return Err(ResolutionError::provisioning(path, e));
            }
        }
    }

    // A dangling symlink has no missing ancestors, so nothing above created it.
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(created.last() == Some(&path)),
        Ok(_) => {
            rollback(&created);
            Err(ResolutionError::provisioning(path, "exists and is not a directory"))
        }
        Err(e) => {
            rollback(&created);
            Err(ResolutionError::provisioning(path, e))
        }
    }
}

/// `path` and each of its ancestors that does not exist yet, deepest first.
fn missing_ancestors(path: &Path) -> Vec<&Path> {
    path.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .take_while(|p| fs::symlink_metadata(p).is_err())
        .collect()
}

fn rollback(created: &[&Path]) {
    for dir in created.iter().rev() {
        if let Err(e) = fs::remove_dir(dir) {
            log::warn!("could not remove {} after failed provisioning: {e}", dir.display());
        }
    }
}
