//! Platform-specific path utilities.
//!
//! This module provides functions to get:
//! - The XDG data home and the PWA layout beneath it
//! - The template profile used to seed new browser profiles
//! - PATH lookups for required external binaries

use crate::config::PwaConfig;
use crate::error::{DeskutilError, Result};
use std::path::{Path, PathBuf};

/// Get the XDG data home directory.
///
/// # Platform Behavior
/// - Honors `$XDG_DATA_HOME` when it is set to an absolute path
/// - Otherwise falls back to `~/.local/share`
pub fn xdg_data_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME") {
        let dir = PathBuf::from(dir);
        if dir.is_absolute() {
            return Ok(dir);
        }
    }

    let home = dirs::home_dir().ok_or_else(|| DeskutilError::Other(
        "Could not determine home directory".to_string(),
    ))?;
    Ok(home.join(".local").join("share"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}

/// Well-known locations used by the PWA tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwaPaths {
    /// `$XDG_DATA_HOME/firefoxpwa`
    pub root: PathBuf,
    /// Per-site directories holding `manifest.json` and the icon.
    pub sites_dir: PathBuf,
    /// Per-profile browser state directories.
    pub profiles_dir: PathBuf,
    /// The registry document.
    pub registry: PathBuf,
    /// `$XDG_DATA_HOME/applications`
    pub desktop_dir: PathBuf,
}

impl PwaPaths {
    /// Resolve the layout from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_data_home(xdg_data_home()?))
    }

    /// Build the layout beneath an explicit data home.
    pub fn from_data_home(data_home: impl AsRef<Path>) -> Self {
        let data_home = data_home.as_ref();
        let root = data_home.join(PwaConfig::DATA_DIR_NAME);
        Self {
            sites_dir: root.join(PwaConfig::SITES_DIR_NAME),
            profiles_dir: root.join(PwaConfig::PROFILES_DIR_NAME),
            registry: root.join(PwaConfig::REGISTRY_FILENAME),
            desktop_dir: data_home.join(PwaConfig::APPLICATIONS_DIR_NAME),
            root,
        }
    }

    pub fn site_dir(&self, site_id: &str) -> PathBuf {
        self.sites_dir.join(site_id)
    }

    pub fn profile_dir(&self, profile_id: &str) -> PathBuf {
        self.profiles_dir.join(profile_id)
    }

    /// Default user-managed template location inside the data root.
    pub fn user_template(&self) -> PathBuf {
        self.root.join(PwaConfig::TEMPLATE_DIR_NAME)
    }
}

/// Candidate template profile directories, in lookup order.
pub fn template_candidates(paths: &PwaPaths) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        for rel in PwaConfig::TEMPLATE_EXE_RELATIVE {
            candidates.push(exe_dir.join(rel));
        }
    }

    candidates.push(paths.user_template());
    candidates.push(PathBuf::from(PwaConfig::TEMPLATE_SYSTEM_PATH));
    candidates
}

/// Resolve the template profile directory.
///
/// An explicit path wins when it exists; otherwise the first existing
/// candidate is used.
pub fn resolve_template(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<PathBuf> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        searched.push(path.to_path_buf());
    }

    for candidate in candidates {
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
        searched.push(candidate.clone());
    }

    Err(DeskutilError::TemplateNotFound { searched })
}

/// Check if a command exists in the system PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Fail with [`DeskutilError::MissingDependency`] unless `cmd` is on PATH.
pub fn require_command(cmd: &str) -> Result<()> {
    if command_exists(cmd) {
        Ok(())
    } else {
        Err(DeskutilError::MissingDependency {
            name: cmd.to_string(),
        })
    }
}
