//! The PWA registry document and its locked, atomically-saved store.
//!
//! The registry is a single JSON object shared with the site launcher:
//!
//! ```json
//! {"profiles": {"<id>": {"ulid": "<id>", "name": "...", "sites": ["<id>"]}},
//!  "sites":    {"<id>": {"ulid": "<id>", "profile": "<id>",
//!                        "config": {"document_url": "...", "manifest_url": "..."},
//!                        "manifest": {...}}}}
//! ```
//!
//! The launcher writes keys of its own into the same file, so every record
//! keeps unknown keys in a flattened `extra` map.

use super::manifest::WebAppManifest;
use crate::error::{DeskutilError, Result};
use crate::metadata::{atomic_read_json, atomic_write_json, null_as_default};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A browser profile registered with the launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub ulid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sites: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileRecord {
    pub fn new(ulid: impl Into<String>, name: impl Into<String>, sites: Vec<String>) -> Self {
        Self {
            ulid: ulid.into(),
            name: Some(name.into()),
            sites,
            extra: Map::new(),
        }
    }
}

/// Where a site was installed from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manifest_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A deployed site registered with the launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub ulid: String,
    pub profile: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: SiteConfig,
    pub manifest: WebAppManifest,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteRecord {
    pub fn new(
        ulid: impl Into<String>,
        profile: impl Into<String>,
        url: &str,
        manifest: WebAppManifest,
    ) -> Self {
        Self {
            ulid: ulid.into(),
            profile: profile.into(),
            config: SiteConfig {
                document_url: url.to_string(),
                manifest_url: url.to_string(),
                extra: Map::new(),
            },
            manifest,
            extra: Map::new(),
        }
    }
}

/// The whole registry: identifier → profile and identifier → site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileRecord>,
    #[serde(default)]
    pub sites: BTreeMap<String, SiteRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistryDocument {
    /// Find the site deployed under display name `name`.
    ///
    /// Matches the site manifest name first, then the owning profile's name.
    pub fn find_site_by_name(&self, name: &str) -> Option<&SiteRecord> {
        let mut matches = self.sites.values().filter(|site| {
            site.manifest.name == name
                || self
                    .profiles
                    .get(&site.profile)
                    .and_then(|p| p.name.as_deref())
                    == Some(name)
        });

        let first = matches.next();
        if let Some(site) = first {
            if matches.next().is_some() {
                warn!(
                    "Multiple sites are named '{}'; using {}",
                    name, site.ulid
                );
            }
        }
        first
    }

    /// Profile identifier that owns `site_id`, if the site is registered.
    pub fn profile_for_site(&self, site_id: &str) -> Option<&str> {
        self.sites.get(site_id).map(|s| s.profile.as_str())
    }

    /// Sites whose profile reference does not resolve.
    pub fn dangling_sites(&self) -> Vec<&str> {
        self.sites
            .values()
            .filter(|s| !self.profiles.contains_key(&s.profile))
            .map(|s| s.ulid.as_str())
            .collect()
    }
}

/// Load the registry at `path`.
///
/// A missing file yields an empty document. A file that exists but does not
/// parse is reported as [`DeskutilError::RegistryCorrupt`] and never replaced.
pub fn load(path: &Path) -> Result<RegistryDocument> {
    match atomic_read_json::<RegistryDocument>(path) {
        Ok(Some(doc)) => Ok(doc),
        Ok(None) => {
            debug!("No registry at {}, starting empty", path.display());
            Ok(RegistryDocument::default())
        }
        Err(DeskutilError::Json { message, .. }) => Err(DeskutilError::RegistryCorrupt {
            path: path.to_path_buf(),
            message,
        }),
        Err(e) => Err(e),
    }
}

/// Exclusive advisory lock on a sibling of the registry file.
///
/// The lock file itself is left on disk; removing it would let a waiting
/// process lock an unlinked inode while a third locks a fresh one.
struct RegistryLock {
    file: File,
}

impl RegistryLock {
    fn acquire(lock_path: &Path) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| DeskutilError::io_with_path(e, parent))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)
            .map_err(|e| DeskutilError::io_with_path(e, lock_path))?;
        file.lock_exclusive()
            .map_err(|e| DeskutilError::io_with_path(e, lock_path))?;

        debug!("Acquired registry lock {}", lock_path.display());
        Ok(Self { file })
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// A registry opened for a read-modify-write cycle.
///
/// The advisory lock is held from [`RegistryStore::open`] until the store is
/// dropped, so concurrent deployments serialize instead of losing updates.
pub struct RegistryStore {
    path: PathBuf,
    document: RegistryDocument,
    dirty: bool,
    _lock: RegistryLock,
}

impl RegistryStore {
    /// Lock and load the registry at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lock = RegistryLock::acquire(&lock_path_for(&path))?;
        let document = load(&path)?;

        let dangling = document.dangling_sites();
        if !dangling.is_empty() {
            warn!("Registry has sites without a profile: {:?}", dangling);
        }

        Ok(Self {
            path,
            document,
            dirty: false,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &RegistryDocument {
        &self.document
    }

    /// Whether anything changed since the store was opened or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn upsert_site(&mut self, id: impl Into<String>, record: SiteRecord) {
        self.document.sites.insert(id.into(), record);
        self.dirty = true;
    }

    pub fn upsert_profile(&mut self, id: impl Into<String>, record: ProfileRecord) {
        self.document.profiles.insert(id.into(), record);
        self.dirty = true;
    }

    pub fn remove_site(&mut self, id: &str) -> Option<SiteRecord> {
        let removed = self.document.sites.remove(id);
        self.dirty |= removed.is_some();
        removed
    }

    pub fn remove_profile(&mut self, id: &str) -> Option<ProfileRecord> {
        let removed = self.document.profiles.remove(id);
        self.dirty |= removed.is_some();
        removed
    }

    /// Detach `site_id` from its profile's site list.
    ///
    /// Returns true when the profile is left without any sites.
    pub fn detach_site(&mut self, profile_id: &str, site_id: &str) -> bool {
        match self.document.profiles.get_mut(profile_id) {
            Some(profile) => {
                let before = profile.sites.len();
                profile.sites.retain(|s| s != site_id);
                self.dirty |= profile.sites.len() != before;
                profile.sites.is_empty()
            }
            None => true,
        }
    }

    /// Persist the document atomically.
    pub fn save(&mut self) -> Result<()> {
        atomic_write_json(&self.path, &self.document)?;
        self.dirty = false;
        debug!("Saved registry {}", self.path.display());
        Ok(())
    }
}

fn lock_path_for(registry: &Path) -> PathBuf {
    let name = registry
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "registry".to_string());
    registry.with_file_name(format!(".{}.lock", name))
}
