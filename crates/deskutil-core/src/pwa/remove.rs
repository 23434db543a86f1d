//! Removal of a deployed PWA by display name.

use super::desktop::{entries_for_site, remove_entry};
use super::lookup::{find_existing, LookupSource};
use super::registry::RegistryStore;
use crate::error::{DeskutilError, Result};
use crate::platform::PwaPaths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a removal deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub site_id: String,
    /// Profile that owned the site, if the registry knew it.
    pub profile_id: Option<String>,
    pub site_dir_removed: bool,
    /// False when the profile is still used by another site.
    pub profile_dir_removed: bool,
    pub desktop_entries_removed: Vec<PathBuf>,
}

pub struct PwaRemover {
    paths: PwaPaths,
}

impl PwaRemover {
    pub fn new(paths: PwaPaths) -> Self {
        Self { paths }
    }

    /// Remove the site deployed under `name` along with its profile, registry
    /// entries and desktop entry.
    ///
    /// Nothing is touched when no site matches.
    pub fn remove(&self, name: &str) -> Result<RemovalReport> {
        let mut store = RegistryStore::open(&self.paths.registry)?;
        let existing = find_existing(store.document(), &self.paths.desktop_dir, name).ok_or_else(
            || DeskutilError::NotFound {
                name: name.to_string(),
            },
        )?;

        let site_id = existing.site_id;
        info!("Removing '{}' (ID: {})", name, site_id);

        let mut report = RemovalReport {
            site_id: site_id.clone(),
            ..Default::default()
        };

        if let Some(profile_id) = store.document().profile_for_site(&site_id).map(str::to_string) {
            if store.detach_site(&profile_id, &site_id) {
                report.profile_dir_removed =
                    remove_dir_if_present(&self.paths.profile_dir(&profile_id))?;
                store.remove_profile(&profile_id);
            } else {
                info!("Profile {} is shared with other sites; keeping it", profile_id);
            }
            report.profile_id = Some(profile_id);
        } else {
            warn!("Site {} is not in the registry; its profile is left alone", site_id);
        }

        report.site_dir_removed = remove_dir_if_present(&self.paths.site_dir(&site_id))?;
        store.remove_site(&site_id);
        if store.is_dirty() {
            store.save()?;
        }

        let mut entries = entries_for_site(&self.paths.desktop_dir, &site_id);
        if let LookupSource::DesktopEntry(path) = existing.source {
            if !entries.contains(&path) {
                entries.push(path);
            }
        }
        for entry in entries {
            if remove_entry(&entry)? {
                report.desktop_entries_removed.push(entry);
            }
        }

        info!("Removed {}", name);
        Ok(report)
    }
}

fn remove_dir_if_present(dir: &Path) -> Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DeskutilError::io_with_path(e, dir)),
    }
}
