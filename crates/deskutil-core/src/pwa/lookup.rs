//! Display name → site id lookup.
//!
//! The registry is authoritative. Desktop entries are only consulted for
//! sites deployed before the registry recorded display names.

use super::desktop::scan_for_name;
use super::registry::RegistryDocument;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where an existing site was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupSource {
    Registry,
    /// Found only through a desktop entry at this path.
    DesktopEntry(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSite {
    pub site_id: String,
    pub source: LookupSource,
}

/// Find the site deployed under `name`.
pub fn find_existing(doc: &RegistryDocument, desktop_dir: &Path, name: &str) -> Option<ExistingSite> {
    if let Some(site) = doc.find_site_by_name(name) {
        debug!("Found '{}' in registry as {}", name, site.ulid);
        return Some(ExistingSite {
            site_id: site.ulid.clone(),
            source: LookupSource::Registry,
        });
    }

    let (site_id, path) = scan_for_name(desktop_dir, name)?;
    warn!(
        "'{}' is only known from desktop entry {} (site {})",
        name,
        path.display(),
        site_id
    );
    Some(ExistingSite {
        site_id,
        source: LookupSource::DesktopEntry(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pwa::desktop::{entry_path, DesktopEntry};
    use crate::pwa::manifest::WebAppManifest;
    use crate::pwa::registry::{ProfileRecord, SiteRecord};
    use tempfile::TempDir;

    #[test]
    fn test_registry_wins_over_desktop_entry() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        DesktopEntry::for_site("Example", "0LEGACY", dir)
            .write_to_file(&entry_path(dir, "Example"))
            .unwrap();

        let mut doc = RegistryDocument::default();
        doc.profiles
            .insert("0P".into(), ProfileRecord::new("0P", "Example", vec!["0S".into()]));
        doc.sites.insert(
            "0S".into(),
            SiteRecord::new(
                "0S",
                "0P",
                "http://example.com",
                WebAppManifest::for_site("Example", "http://example.com").unwrap(),
            ),
        );

        let found = find_existing(&doc, dir, "Example").unwrap();
        assert_eq!(found.site_id, "0S");
        assert_eq!(found.source, LookupSource::Registry);

        let legacy = find_existing(&RegistryDocument::default(), dir, "Example").unwrap();
        assert_eq!(legacy.site_id, "0LEGACY");
        assert_eq!(
            legacy.source,
            LookupSource::DesktopEntry(entry_path(dir, "Example"))
        );

        assert!(find_existing(&doc, dir, "Missing").is_none());
    }
}
