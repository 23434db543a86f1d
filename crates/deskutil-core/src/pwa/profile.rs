//! Browser profile materialization from a template directory.

use crate::config::ProfileConfig;
use crate::error::{DeskutilError, Result};
use crate::platform::harden_tree;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Clones the template profile into fresh, owner-only profile directories.
#[derive(Debug, Clone)]
pub struct ProfileMaterializer {
    template: PathBuf,
    profiles_dir: PathBuf,
    hardened: bool,
}

impl ProfileMaterializer {
    /// Create a materializer.
    ///
    /// Hardened mode is on by default: extension state copied from the
    /// template is deleted along with the caches.
    pub fn new(template: impl Into<PathBuf>, profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            profiles_dir: profiles_dir.into(),
            hardened: true,
        }
    }

    pub fn hardened(mut self, hardened: bool) -> Self {
        self.hardened = hardened;
        self
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn profile_dir(&self, profile_id: &str) -> PathBuf {
        self.profiles_dir.join(profile_id)
    }

    /// Build `<profiles_dir>/<profile_id>` from the template.
    ///
    /// Any existing directory at the destination is deleted first; the result
    /// never merges with a previous profile.
    pub fn materialize(&self, profile_id: &str) -> Result<PathBuf> {
        if !self.template.is_dir() {
            return Err(DeskutilError::TemplateNotFound {
                searched: vec![self.template.clone()],
            });
        }

        let dest = self.profile_dir(profile_id);
        if dest.exists() {
            debug!("Removing existing profile at {}", dest.display());
            fs::remove_dir_all(&dest).map_err(|e| DeskutilError::io_with_path(e, &dest))?;
        }

        let copied = copy_template(&self.template, &dest)?;
        harden_tree(&dest)?;

        remove_trash(&dest, ProfileConfig::TRASH);
        if self.hardened {
            remove_trash(&dest, ProfileConfig::HARDENED_TRASH);
        }

        info!(
            "Materialized profile {} ({} files from {})",
            profile_id,
            copied,
            self.template.display()
        );
        Ok(dest)
    }
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| ProfileConfig::LOCK_FILES.iter().any(|lock| n == *lock))
        .unwrap_or(false)
}

/// Recursively copy `src` into `dest`, skipping lock files at any depth.
///
/// Returns the number of files copied.
fn copy_template(src: &Path, dest: &Path) -> Result<u64> {
    let mut copied = 0;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_lock_file(e.path()));

    for entry in walker {
        let entry = entry.map_err(|e| DeskutilError::Io {
            message: format!("Failed to walk template: {}", e),
            path: e.path().map(Path::to_path_buf),
            source: None,
        })?;

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| DeskutilError::Other(e.to_string()))?;
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| DeskutilError::io_with_path(e, &target))?;
        } else if file_type.is_file() || entry.path().is_file() {
            // Symlinks to files are copied by content.
            fs::copy(entry.path(), &target).map_err(|e| DeskutilError::io_with_path(e, &target))?;
            copied += 1;
        } else {
            warn!("Skipping unsupported template entry {}", entry.path().display());
        }
    }

    Ok(copied)
}

/// Delete volatile entries from a fresh profile. Missing entries are fine and
/// other failures are logged, never fatal.
fn remove_trash(profile: &Path, names: &[&str]) {
    for name in names {
        let path = profile.join(name);
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match result {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}
