//! Web app manifests and the per-site directory.
//!
//! Each site directory holds `manifest.json`, a small `config.json` with usage
//! timestamps and, optionally, `icon.png`.

use crate::config::PwaConfig;
use crate::error::{DeskutilError, Result};
use crate::metadata::{atomic_read_json, atomic_write_json, null_as_default};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// One entry of the manifest `icons` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    #[serde(default, deserialize_with = "null_as_default")]
    pub src: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub purpose: String,
}

impl ManifestIcon {
    /// The icon every generated site ships: `icon.png`, 512px, any purpose.
    pub fn default_png() -> Self {
        Self {
            src: PwaConfig::ICON_FILENAME.to_string(),
            sizes: "512x512".to_string(),
            mime_type: "image/png".to_string(),
            purpose: "any".to_string(),
        }
    }
}

/// A web app manifest as consumed by the site launcher.
///
/// Keys this crate does not model are kept in `extra` so manifests written by
/// the launcher itself survive a load/save cycle. The launcher leaves optional
/// members `null`; those read as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAppManifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub background_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icons: Vec<ManifestIcon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebAppManifest {
    /// Build the default manifest for a site named `name` served at `url`.
    pub fn for_site(name: &str, url: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            short_name: name.to_string(),
            start_url: url.to_string(),
            scope: scope_for(url)?,
            display: "standalone".to_string(),
            background_color: "#000000".to_string(),
            theme_color: "#000000".to_string(),
            description: format!("PWA for {}", name),
            icons: vec![ManifestIcon::default_png()],
            extra: Map::new(),
        })
    }

    /// Point the manifest at a new URL, recomputing the scope.
    pub fn retarget(&mut self, url: &str) -> Result<()> {
        self.scope = scope_for(url)?;
        self.start_url = url.to_string();
        Ok(())
    }
}

/// Compute the navigation scope for `url`: `<scheme>://<host[:port]>/`.
pub fn scope_for(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| DeskutilError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| DeskutilError::InvalidUrl {
        url: url.to_string(),
        message: "URL has no host".to_string(),
    })?;

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct SiteUsage {
    installed: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SiteConfigFile {
    usage: SiteUsage,
}

/// Files belonging to one site directory.
#[derive(Debug, Clone)]
pub struct SiteFiles {
    dir: PathBuf,
}

impl SiteFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(PwaConfig::MANIFEST_FILENAME)
    }

    pub fn icon_path(&self) -> PathBuf {
        self.dir.join(PwaConfig::ICON_FILENAME)
    }

    /// Load `manifest.json`, or `None` if the site has none yet.
    pub fn read_manifest(&self) -> Result<Option<WebAppManifest>> {
        atomic_read_json(&self.manifest_path())
    }

    pub fn write_manifest(&self, manifest: &WebAppManifest) -> Result<()> {
        atomic_write_json(&self.manifest_path(), manifest)
    }

    /// Record the installation time in the site's `config.json`.
    pub fn write_install_record(&self, installed: DateTime<Utc>) -> Result<()> {
        let record = SiteConfigFile {
            usage: SiteUsage { installed },
        };
        atomic_write_json(&self.dir.join(PwaConfig::SITE_CONFIG_FILENAME), &record)
    }

    /// Copy `icon` into the site as `icon.png`.
    ///
    /// A missing source is skipped with a warning; the previous icon, if any,
    /// stays in place.
    pub fn install_icon(&self, icon: &Path) -> Result<bool> {
        if !icon.is_file() {
            warn!("Icon file missing, keeping current icon: {}", icon.display());
            return Ok(false);
        }

        fs::create_dir_all(&self.dir).map_err(|e| DeskutilError::io_with_path(e, &self.dir))?;
        let dest = self.icon_path();
        fs::copy(icon, &dest).map_err(|e| DeskutilError::io_with_path(e, &dest))?;
        debug!("Installed icon {} -> {}", icon.display(), dest.display());
        Ok(true)
    }
}
