//! Progressive web app deployment.
//!
//! A deployed PWA is a *site* (manifest + icon) bound to a *profile* (an
//! isolated browser state directory cloned from a template), both recorded in
//! the shared registry document and surfaced through a desktop entry.

pub mod deploy;
pub mod desktop;
pub mod extensions;
pub mod layout;
pub mod lookup;
pub mod manifest;
pub mod prefs;
pub mod profile;
pub mod registry;
pub mod remove;
pub mod resolver;
pub mod ulid;

pub use deploy::{DeployOutcome, DeployRequest, PwaDeployer};
pub use desktop::DesktopEntry;
pub use extensions::{ExtensionInstaller, ExtensionStrategy, InstallReport};
pub use lookup::{find_existing, ExistingSite, LookupSource};
pub use manifest::{SiteFiles, WebAppManifest};
pub use prefs::{PrefValue, Preference, PreferenceSet};
pub use profile::ProfileMaterializer;
pub use registry::{ProfileRecord, RegistryDocument, RegistryStore, SiteRecord};
pub use remove::{PwaRemover, RemovalReport};
pub use resolver::{HttpResolver, NoopResolver, UrlResolver};
pub use ulid::{generate_ulid, is_ulid};
