//! Bringing browser extensions into a profile.
//!
//! One capability, three deployment modes selected by [`ExtensionStrategy`]:
//!
//! - `Copy`: the operator supplies `ID:PATH` and the package is copied in now.
//! - `Policy`: the operator supplies `ID:INSTALL_URL`; a policy document makes
//!   the browser fetch and force-install it on next launch (needs network then).
//! - `Store`: the operator supplies a bare name resolved against a directory
//!   of pre-downloaded `.xpi` packages whose ids are read from their manifests.

use crate::config::ProfileConfig;
use crate::error::{DeskutilError, Result};
use crate::metadata::{atomic_read_json, atomic_write_json};
use crate::platform::set_private_file;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

static ADDON_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\{[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\}|[A-Za-z0-9._+-]*@[A-Za-z0-9._-]+)$")
        .unwrap()
});

/// Whether `s` is a syntactically valid add-on id (`name@domain` or `{uuid}`).
pub fn is_addon_id(s: &str) -> bool {
    ADDON_ID_RE.is_match(s)
}

/// How extensions reach a profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtensionStrategy {
    #[default]
    Copy,
    Policy,
    Store { dir: PathBuf },
}

/// One requested extension, parsed for a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonSpec {
    Package { id: String, path: PathBuf },
    Remote { id: String, install_url: String },
    Named { name: String },
}

impl ExtensionStrategy {
    /// Parse an operator-supplied addon argument for this strategy.
    pub fn parse_addon(&self, raw: &str) -> Result<AddonSpec> {
        let raw = raw.trim();
        match self {
            ExtensionStrategy::Copy => {
                let (id, path) = split_pair(raw)?;
                Ok(AddonSpec::Package {
                    id,
                    path: PathBuf::from(path),
                })
            }
            ExtensionStrategy::Policy => {
                let (id, url) = split_pair(raw)?;
                Url::parse(&url).map_err(|e| DeskutilError::InvalidUrl {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
                Ok(AddonSpec::Remote {
                    id,
                    install_url: url,
                })
            }
            ExtensionStrategy::Store { .. } => {
                if raw.is_empty() {
                    return Err(DeskutilError::Validation {
                        field: "addon".to_string(),
                        message: "empty extension name".to_string(),
                    });
                }
                Ok(AddonSpec::Named {
                    name: raw.to_string(),
                })
            }
        }
    }
}

/// Split `ID:VALUE` on the first colon. Add-on ids never contain one.
fn split_pair(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((id, value)) if !id.is_empty() && !value.is_empty() => {
            Ok((id.to_string(), value.to_string()))
        }
        _ => Err(DeskutilError::Validation {
            field: "addon".to_string(),
            message: format!("expected ID:VALUE, got '{}'", raw),
        }),
    }
}

/// Outcome of an install pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Ids installed or scheduled for installation.
    pub installed: Vec<String>,
    /// Requested entries that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Installs extensions into a profile with a fixed strategy.
#[derive(Debug, Clone, Default)]
pub struct ExtensionInstaller {
    strategy: ExtensionStrategy,
}

impl ExtensionInstaller {
    pub fn new(strategy: ExtensionStrategy) -> Self {
        Self { strategy }
    }

    /// Install every entry of `addons` into `profile_dir`.
    ///
    /// Individual entries that cannot be parsed or found are skipped with a
    /// warning; only failures to write into the profile are returned as errors.
    pub fn install(&self, profile_dir: &Path, addons: &[String]) -> Result<InstallReport> {
        let mut report = InstallReport::default();
        if addons.is_empty() {
            return Ok(report);
        }

        info!("Installing {} extensions...", addons.len());

        let mut remote = Vec::new();
        for raw in addons {
            let spec = match self.strategy.parse_addon(raw) {
                Ok(spec) => spec,
                Err(e) => {
                    warn!("Skipping extension '{}': {}", raw, e);
                    report.skipped.push((raw.clone(), e.to_string()));
                    continue;
                }
            };

            match spec {
                AddonSpec::Package { id, path } => {
                    if !path.is_file() {
                        warn!("Extension file missing: {}", path.display());
                        report
                            .skipped
                            .push((raw.clone(), format!("missing file {}", path.display())));
                        continue;
                    }
                    copy_package(profile_dir, &id, &path)?;
                    report.installed.push(id);
                }
                AddonSpec::Remote { id, install_url } => remote.push((id, install_url)),
                AddonSpec::Named { name } => {
                    let ExtensionStrategy::Store { dir } = &self.strategy else {
                        continue;
                    };
                    match resolve_from_store(dir, &name) {
                        Some((id, path)) => {
                            copy_package(profile_dir, &id, &path)?;
                            report.installed.push(id);
                        }
                        None => {
                            warn!("Extension '{}' not found in {}", name, dir.display());
                            report
                                .skipped
                                .push((raw.clone(), format!("not found in {}", dir.display())));
                        }
                    }
                }
            }
        }

        if !remote.is_empty() {
            write_policy(profile_dir, &remote)?;
            report.installed.extend(remote.into_iter().map(|(id, _)| id));
        }

        Ok(report)
    }
}

fn copy_package(profile_dir: &Path, id: &str, src: &Path) -> Result<()> {
    let ext_dir = profile_dir.join(ProfileConfig::EXTENSIONS_DIR_NAME);
    fs::create_dir_all(&ext_dir).map_err(|e| DeskutilError::io_with_path(e, &ext_dir))?;

    let dest = ext_dir.join(format!("{}.{}", id, ProfileConfig::XPI_EXTENSION));
    fs::copy(src, &dest).map_err(|e| DeskutilError::io_with_path(e, &dest))?;
    set_private_file(&dest)?;

    debug!("Installed extension {} from {}", id, src.display());
    Ok(())
}

/// Read the add-on id embedded in an `.xpi` package.
///
/// Supports both `browser_specific_settings.gecko.id` and the older
/// `applications.gecko.id` layout.
pub fn read_addon_id(xpi: &Path) -> Result<Option<String>> {
    let manifest = read_package_manifest(xpi)?;
    Ok(["browser_specific_settings", "applications"]
        .iter()
        .find_map(|key| manifest.pointer(&format!("/{}/gecko/id", key)))
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn read_package_manifest(xpi: &Path) -> Result<Value> {
    let file = File::open(xpi).map_err(|e| DeskutilError::io_with_path(e, xpi))?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive.by_name("manifest.json")?;

    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .map_err(|e| DeskutilError::io_with_path(e, xpi))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Find a package for `name` in the store directory and determine its id.
///
/// A package matches when its file stem or its manifest `name` equals `name`
/// (case-insensitive). Packages without an embedded id fall back to their file
/// stem when that is itself a valid add-on id.
pub fn resolve_from_store(dir: &Path, name: &str) -> Option<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read extension store {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut packages: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case(ProfileConfig::XPI_EXTENSION))
                    .unwrap_or(false)
        })
        .collect();
    packages.sort();

    let wanted = name.to_lowercase();
    let stem_of = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let by_stem = packages
        .iter()
        .find(|p| stem_of(p).to_lowercase() == wanted);
    let path = match by_stem {
        Some(path) => path.clone(),
        None => packages
            .iter()
            .find(|p| {
                read_package_manifest(p)
                    .ok()
                    .and_then(|m| m.get("name").and_then(Value::as_str).map(str::to_lowercase))
                    .as_deref()
                    == Some(wanted.as_str())
            })?
            .clone(),
    };

    match read_addon_id(&path) {
        Ok(Some(id)) => Some((id, path)),
        Ok(None) | Err(_) => {
            let stem = stem_of(&path);
            if is_addon_id(&stem) {
                Some((stem, path))
            } else {
                warn!("Cannot determine add-on id for {}", path.display());
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ExtensionSetting {
    installation_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    install_url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Policies {
    #[serde(rename = "ExtensionSettings", default)]
    extension_settings: BTreeMap<String, ExtensionSetting>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PolicyDocument {
    #[serde(default)]
    policies: Policies,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Path of the policy document inside a profile.
pub fn policy_path(profile_dir: &Path) -> PathBuf {
    profile_dir
        .join(ProfileConfig::POLICY_DIR_NAME)
        .join(ProfileConfig::POLICY_FILENAME)
}

/// Write (or extend) the profile's policy document: everything blocked by
/// default, each requested id force-installed from its URL.
fn write_policy(profile_dir: &Path, remote: &[(String, String)]) -> Result<()> {
    let path = policy_path(profile_dir);
    let mut doc: PolicyDocument = match atomic_read_json(&path) {
        Ok(Some(doc)) => doc,
        Ok(None) => PolicyDocument::default(),
        Err(e) => {
            warn!("Replacing unreadable policy document {}: {}", path.display(), e);
            PolicyDocument::default()
        }
    };

    let settings = &mut doc.policies.extension_settings;
    settings.insert(
        "*".to_string(),
        ExtensionSetting {
            installation_mode: "blocked".to_string(),
            install_url: None,
            extra: Map::new(),
        },
    );
    for (id, url) in remote {
        settings.insert(
            id.clone(),
            ExtensionSetting {
                installation_mode: "force_installed".to_string(),
                install_url: Some(url.clone()),
                extra: Map::new(),
            },
        );
    }

    atomic_write_json(&path, &doc)?;
    info!("Wrote extension policy for {} add-ons to {}", remote.len(), path.display());
    Ok(())
}
