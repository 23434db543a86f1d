//! File permission handling.
//!
//! Browser profiles may hold session cookies and saved credentials, so cloned
//! profiles are restricted to the owning user.

use crate::config::ProfileConfig;
use crate::error::{DeskutilError, Result};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = std::fs::metadata(path).map_err(|e| DeskutilError::io_with_path(e, path))?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(mode);
    std::fs::set_permissions(path, permissions).map_err(|e| DeskutilError::io_with_path(e, path))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    debug!("Skipping permission change on non-unix platform for: {}", path.display());
    Ok(())
}

/// Make a file executable (mode 0o755).
///
/// Desktop environments refuse to trust launchers without the executable bit.
pub fn set_executable(path: &Path) -> Result<()> {
    set_mode(path, 0o755)?;
    debug!("Set executable permissions on: {}", path.display());
    Ok(())
}

/// Set file permissions to be readable and writable by owner only (0o600).
pub fn set_private_file(path: &Path) -> Result<()> {
    set_mode(path, ProfileConfig::FILE_MODE)
}

/// Set directory permissions to owner-only traversal (0o700).
pub fn set_private_dir(path: &Path) -> Result<()> {
    set_mode(path, ProfileConfig::DIR_MODE)
}

/// Restrict every directory and file under `root` (inclusive) to the owner.
///
/// Symlinks are left alone; changing their mode would follow them out of the tree.
pub fn harden_tree(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| DeskutilError::Io {
            message: format!("Failed to walk {}: {}", root.display(), e),
            path: e.path().map(Path::to_path_buf),
            source: None,
        })?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            set_private_dir(entry.path())?;
        } else if file_type.is_file() {
            set_private_file(entry.path())?;
        }
    }

    debug!("Restricted permissions under {}", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    #[cfg(unix)]
    fn test_set_executable() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("launcher.desktop");
        File::create(&file_path).unwrap();

        set_executable(&file_path).unwrap();
        assert_eq!(mode_of(&file_path), 0o755);
    }

    #[test]
    #[cfg(unix)]
    fn test_harden_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("profile");
        fs::create_dir_all(root.join("storage").join("default")).unwrap();
        fs::write(root.join("prefs.js"), "x").unwrap();
        fs::write(root.join("storage").join("default").join("data"), "y").unwrap();

        harden_tree(&root).unwrap();

        assert_eq!(mode_of(&root), 0o700);
        assert_eq!(mode_of(&root.join("storage")), 0o700);
        assert_eq!(mode_of(&root.join("storage").join("default")), 0o700);
        assert_eq!(mode_of(&root.join("prefs.js")), 0o600);
        assert_eq!(mode_of(&root.join("storage").join("default").join("data")), 0o600);
    }
}
