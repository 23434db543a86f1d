//! Create-or-update deployment of a PWA.
//!
//! A deployment either creates a new site + profile pair or, when a site with
//! the requested display name already exists, updates that site in place. The
//! update path never recreates the profile, so logged-in sessions survive.
//!
//! The registry lock is held for the whole flow. There is no rollback: a
//! failure on the create path can leave a site directory or profile behind
//! without a registry entry.

use super::desktop::{entries_for_site, entry_path_for_site, DesktopEntry};
use super::extensions::{ExtensionInstaller, ExtensionStrategy, InstallReport};
use super::lookup::{find_existing, ExistingSite, LookupSource};
use super::manifest::{scope_for, SiteFiles, WebAppManifest};
use super::prefs::PreferenceSet;
use super::profile::ProfileMaterializer;
use super::registry::{ProfileRecord, RegistryStore, SiteRecord};
use super::resolver::{HttpResolver, UrlResolver};
use super::ulid::generate_ulid;
use crate::error::{DeskutilError, Result};
use crate::platform::PwaPaths;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// What to deploy.
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    /// Display name; also the lookup key for updates.
    pub name: String,
    /// Target URL before redirect resolution.
    pub url: String,
    /// Icon file copied into the site as `icon.png`.
    pub icon: Option<PathBuf>,
    /// Comma-separated toolbar keywords, applied to new profiles only.
    pub layout: Option<String>,
    /// Forced user-agent string, applied to new profiles only.
    pub user_agent: Option<String>,
    /// Extension arguments, interpreted by the configured strategy.
    pub addons: Vec<String>,
}

impl DeployRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DeskutilError::Validation {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.name.contains(['\n', '\r']) {
            return Err(DeskutilError::Validation {
                field: "name".to_string(),
                message: "must be a single line".to_string(),
            });
        }
        scope_for(&self.url)?;
        Ok(())
    }
}

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Created {
        site_id: String,
        profile_id: String,
        desktop_entry: PathBuf,
    },
    Updated {
        site_id: String,
        profile_id: Option<String>,
        desktop_entry: PathBuf,
    },
}

impl DeployOutcome {
    pub fn site_id(&self) -> &str {
        match self {
            DeployOutcome::Created { site_id, .. } | DeployOutcome::Updated { site_id, .. } => {
                site_id
            }
        }
    }
}

/// Deploys PWAs into a [`PwaPaths`] layout.
pub struct PwaDeployer {
    paths: PwaPaths,
    materializer: ProfileMaterializer,
    extensions: ExtensionInstaller,
    resolver: Arc<dyn UrlResolver>,
}

impl PwaDeployer {
    /// Create a deployer that clones `template` for new profiles, resolves
    /// redirects over HTTP and copies extension packages.
    pub fn new(paths: PwaPaths, template: impl Into<PathBuf>) -> Self {
        let materializer = ProfileMaterializer::new(template, paths.profiles_dir.clone());
        Self {
            paths,
            materializer,
            extensions: ExtensionInstaller::default(),
            resolver: Arc::new(HttpResolver::new()),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn UrlResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_extension_strategy(mut self, strategy: ExtensionStrategy) -> Self {
        self.extensions = ExtensionInstaller::new(strategy);
        self
    }

    /// Toggle deletion of template extension state in new profiles.
    pub fn hardened(mut self, hardened: bool) -> Self {
        self.materializer = self.materializer.hardened(hardened);
        self
    }

    pub fn paths(&self) -> &PwaPaths {
        &self.paths
    }

    /// Deploy `request`, creating or updating as needed.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        request.validate()?;
        info!("Deploying PWA: {}", request.name);

        let mut store = RegistryStore::open(&self.paths.registry)?;
        match find_existing(store.document(), &self.paths.desktop_dir, &request.name) {
            Some(existing) => self.update(&mut store, existing, request).await,
            None => self.create(&mut store, request).await,
        }
    }

    async fn create(&self, store: &mut RegistryStore, request: &DeployRequest) -> Result<DeployOutcome> {
        let final_url = self.resolver.resolve(&request.url).await;
        let site_id = generate_ulid();
        let profile_id = generate_ulid();

        let manifest = WebAppManifest::for_site(&request.name, &final_url)?;
        let site = SiteFiles::new(self.paths.site_dir(&site_id));
        site.write_manifest(&manifest)?;
        site.write_install_record(Utc::now())?;
        if let Some(icon) = &request.icon {
            site.install_icon(icon)?;
        }

        info!("Generating profile {}", profile_id);
        let profile_dir = self.materializer.materialize(&profile_id)?;

        let mut prefs = PreferenceSet::base();
        if let Some(layout) = request.layout.as_deref().filter(|l| !l.trim().is_empty()) {
            prefs = prefs.with_layout(layout);
        }
        if let Some(user_agent) = &request.user_agent {
            prefs = prefs.with_user_agent(user_agent);
        }
        prefs.append_to(&profile_dir)?;

        self.install_extensions(&profile_dir, &request.addons)?;

        store.upsert_profile(
            profile_id.clone(),
            ProfileRecord::new(&profile_id, &request.name, vec![site_id.clone()]),
        );
        store.upsert_site(
            site_id.clone(),
            SiteRecord::new(&site_id, &profile_id, &final_url, manifest),
        );
        store.save()?;

        let desktop_entry = entry_path_for_site(&self.paths.desktop_dir, &request.name, &site_id);
        DesktopEntry::for_site(&request.name, &site_id, site.dir()).write_to_file(&desktop_entry)?;

        info!("{} deployed. Site ID: {}", request.name, site_id);
        Ok(DeployOutcome::Created {
            site_id,
            profile_id,
            desktop_entry,
        })
    }

    async fn update(
        &self,
        store: &mut RegistryStore,
        existing: ExistingSite,
        request: &DeployRequest,
    ) -> Result<DeployOutcome> {
        let site_id = existing.site_id;
        info!("Found existing app '{}' (ID: {}). Updating...", request.name, site_id);

        let final_url = self.resolver.resolve(&request.url).await;
        let registered = store.document().sites.get(&site_id).cloned();
        let site = SiteFiles::new(self.paths.site_dir(&site_id));

        let mut manifest = match site.read_manifest()? {
            Some(manifest) => manifest,
            None => match &registered {
                Some(record) => record.manifest.clone(),
                None => WebAppManifest::for_site(&request.name, &final_url)?,
            },
        };
        manifest.name = request.name.clone();
        manifest.short_name = request.name.clone();
        manifest.retarget(&final_url)?;
        site.write_manifest(&manifest)?;

        // Without a new icon the previous one stays in place.
        if let Some(icon) = &request.icon {
            site.install_icon(icon)?;
        }

        let profile_id = registered.as_ref().map(|r| r.profile.clone());
        match (&profile_id, registered) {
            (Some(profile_id), Some(mut record)) => {
                let profile_dir = self.paths.profile_dir(profile_id);
                if profile_dir.is_dir() {
                    self.install_extensions(&profile_dir, &request.addons)?;
                } else if !request.addons.is_empty() {
                    warn!("Profile {} has no directory; extensions skipped", profile_id);
                }

                record.config.document_url = final_url.clone();
                record.config.manifest_url = final_url.clone();
                record.manifest = manifest;
                store.upsert_site(site_id.clone(), record);

                let mut profile = store
                    .document()
                    .profiles
                    .get(profile_id)
                    .cloned()
                    .unwrap_or_else(|| ProfileRecord::new(profile_id, &request.name, Vec::new()));
                profile.name = Some(request.name.clone());
                if !profile.sites.contains(&site_id) {
                    profile.sites.push(site_id.clone());
                }
                store.upsert_profile(profile_id.clone(), profile);
                store.save()?;
            }
            _ => warn!(
                "Site {} is not in the registry; registry entry not refreshed",
                site_id
            ),
        }

        let desktop_entry = match existing.source {
            LookupSource::DesktopEntry(path) => path,
            LookupSource::Registry => self.desktop_entry_for(&site_id, &request.name),
        };
        DesktopEntry::for_site(&request.name, &site_id, site.dir()).write_to_file(&desktop_entry)?;

        info!("Updated {} successfully.", request.name);
        Ok(DeployOutcome::Updated {
            site_id,
            profile_id,
            desktop_entry,
        })
    }

    /// Reuse an entry that already launches the site so updates never add a
    /// second menu item.
    fn desktop_entry_for(&self, site_id: &str, name: &str) -> PathBuf {
        entries_for_site(&self.paths.desktop_dir, site_id)
            .into_iter()
            .next()
            .unwrap_or_else(|| entry_path_for_site(&self.paths.desktop_dir, name, site_id))
    }

    fn install_extensions(&self, profile_dir: &Path, addons: &[String]) -> Result<InstallReport> {
        let report = self.extensions.install(profile_dir, addons)?;
        if !report.installed.is_empty() {
            info!("Installed extensions: {}", report.installed.join(", "));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(DeployRequest::new("Example", "http://example.com").validate().is_ok());
        assert!(matches!(
            DeployRequest::new("  ", "http://example.com").validate(),
            Err(DeskutilError::Validation { .. })
        ));
        assert!(matches!(
            DeployRequest::new("Two\nLines", "http://example.com").validate(),
            Err(DeskutilError::Validation { .. })
        ));
        assert!(matches!(
            DeployRequest::new("Example", "example.com").validate(),
            Err(DeskutilError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_outcome_site_id() {
        let outcome = DeployOutcome::Updated {
            site_id: "0S".into(),
            profile_id: None,
            desktop_entry: PathBuf::from("/x.desktop"),
        };
        assert_eq!(outcome.site_id(), "0S");
    }
}
