//! Desktop entry (.desktop file) generation for deployed sites.
//!
//! Implements the subset of the XDG Desktop Entry Specification the launcher
//! needs. Entries are a projection of the registry; [`scan_for_name`] only
//! exists to adopt entries written before the registry carried names.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::config::PwaConfig;
use crate::error::{DeskutilError, Result};
use crate::metadata::atomic_write_string;
use crate::platform::set_executable;
use regex::Regex;
use tracing::{debug, warn};

static LAUNCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Exec=.*firefoxpwa site launch ([A-Z0-9]+)").unwrap()
});

/// A desktop entry representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Entry name (shown in menus).
    pub name: String,
    /// Executable command.
    pub exec: String,
    /// Icon name or path.
    pub icon: String,
}

impl DesktopEntry {
    /// The launcher entry for a deployed site.
    pub fn for_site(name: &str, site_id: &str, site_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            exec: launch_command(site_id),
            icon: site_dir.join(PwaConfig::ICON_FILENAME).display().to_string(),
        }
    }

    /// Generate the .desktop file content.
    pub fn render(&self) -> String {
        let mut content = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(content, "[Desktop Entry]");
        let _ = writeln!(content, "Name={}", self.name);
        let _ = writeln!(content, "Exec={}", self.exec);
        let _ = writeln!(content, "Type=Application");
        let _ = writeln!(content, "Terminal=false");
        let _ = writeln!(content, "Icon={}", self.icon);
        let _ = writeln!(content, "Categories={};", PwaConfig::DESKTOP_CATEGORIES.join(";"));

        content
    }

    /// Write the desktop entry to a file and mark it executable.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        atomic_write_string(path, &self.render())?;

        // Desktop environments only trust executable launchers.
        set_executable(path)?;

        debug!("Wrote desktop entry to {:?}", path);
        Ok(())
    }
}

/// Command that launches a site; the site id is the reverse-lookup key.
pub fn launch_command(site_id: &str) -> String {
    format!(
        "env -u DRI_PRIME {} site launch {}",
        PwaConfig::LAUNCHER_BINARY,
        site_id
    )
}

fn entry_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// File name for a display name: alphanumerics only, lower-cased.
pub fn entry_file_name(name: &str) -> String {
    format!("{}{}.desktop", entry_key(name), PwaConfig::DESKTOP_SUFFIX)
}

pub fn entry_path(desktop_dir: &Path, name: &str) -> PathBuf {
    desktop_dir.join(entry_file_name(name))
}

/// Path for a new entry launching `site_id`.
///
/// Distinct names can share a key ("Foo Bar" and "foobar"). When the plain
/// path already launches another site, the site id suffix is appended.
pub fn entry_path_for_site(desktop_dir: &Path, name: &str, site_id: &str) -> PathBuf {
    let path = entry_path(desktop_dir, name);
    let owner = fs::read_to_string(&path)
        .ok()
        .and_then(|content| site_id_from_entry(&content));

    match owner {
        Some(other) if other != site_id => {
            let skip = site_id
                .chars()
                .count()
                .saturating_sub(PwaConfig::DESKTOP_ID_SUFFIX_LEN);
            let tail: String = site_id.chars().skip(skip).flat_map(char::to_lowercase).collect();
            let alt = desktop_dir.join(format!(
                "{}-{}{}.desktop",
                entry_key(name),
                tail,
                PwaConfig::DESKTOP_SUFFIX
            ));
            warn!(
                "{} already launches site {}; using {}",
                path.display(),
                other,
                alt.display()
            );
            alt
        }
        _ => path,
    }
}

/// Extract the site id from desktop entry text.
pub fn site_id_from_entry(content: &str) -> Option<String> {
    LAUNCH_RE
        .captures(content)
        .map(|caps| caps[1].to_string())
}

fn has_name_line(content: &str, name: &str) -> bool {
    content
        .lines()
        .any(|line| line.strip_prefix("Name=") == Some(name))
}

fn desktop_files(desktop_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(desktop_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "desktop").unwrap_or(false))
        .collect();
    files.sort();
    files
}

/// Scan `desktop_dir` for an entry whose `Name=` is exactly `name`.
///
/// Returns the embedded site id and the entry path.
pub fn scan_for_name(desktop_dir: &Path, name: &str) -> Option<(String, PathBuf)> {
    desktop_files(desktop_dir).into_iter().find_map(|path| {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable desktop entry {}: {}", path.display(), e);
                return None;
            }
        };
        if !has_name_line(&content, name) {
            return None;
        }
        site_id_from_entry(&content).map(|id| (id, path))
    })
}

/// Every desktop entry that launches `site_id`.
pub fn entries_for_site(desktop_dir: &Path, site_id: &str) -> Vec<PathBuf> {
    desktop_files(desktop_dir)
        .into_iter()
        .filter(|path| {
            fs::read_to_string(path)
                .ok()
                .and_then(|content| site_id_from_entry(&content))
                .as_deref()
                == Some(site_id)
        })
        .collect()
}

/// Remove a desktop entry, tolerating its absence.
pub fn remove_entry(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DeskutilError::io_with_path(e, path)),
    }
}
