//! Filesystem utilities.

use std::fs::Permissions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, SyncError};

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Read a document that is known to exist.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        SyncError::Io(std::io::Error::new(
            err.kind(),
            format!("read {}: {err}", path.display()),
        ))
    })
}

/// Replace `path` with `contents` through a sibling temp file.
///
/// Readers observe either the old or the new contents, never a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents.as_bytes())?;
    if let Some(permissions) = target_permissions(path)? {
        file.as_file().set_permissions(permissions)?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| SyncError::Io(err.error))?;
    Ok(())
}

/// Permissions the replacement file should carry.
///
/// An existing target keeps its mode. A new file gets 0644 instead of the
/// owner-only mode temp files are created with.
fn target_permissions(path: &Path) -> Result<Option<Permissions>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(default_permissions()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
const fn default_permissions() -> Option<Permissions> {
    None
}
