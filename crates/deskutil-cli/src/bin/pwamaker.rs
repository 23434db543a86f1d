//! pwamaker - deploy a progressive web app into its own browser profile.
//!
//! Deploying a name that already exists updates the site in place and keeps
//! its profile.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use deskutil_cli::{finish, init_logging};
use deskutil_core::config::PwaConfig;
use deskutil_core::platform::{require_command, resolve_template, template_candidates, PwaPaths};
use deskutil_core::pwa::{
    DeployOutcome, DeployRequest, ExtensionStrategy, NoopResolver, PwaDeployer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum AddonMode {
    /// `ID:/path/to/file.xpi`, copied into the profile
    #[default]
    Copy,
    /// `ID:https://...`, force-installed through an enterprise policy
    Policy,
    /// Bare name, looked up in --addon-store
    Store,
}

#[derive(Parser, Debug)]
#[command(name = "pwamaker")]
#[command(about = "Modular Firefox PWA generator")]
struct Args {
    /// Display name of the PWA
    #[arg(long)]
    name: String,

    /// Target URL
    #[arg(long)]
    url: String,

    /// Path to icon file
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Comma-separated navbar items
    #[arg(long, default_value = PwaConfig::DEFAULT_LAYOUT)]
    layout: String,

    /// Explicit path to template profile
    #[arg(long)]
    template: Option<PathBuf>,

    /// Extension to install (repeatable); format depends on --addon-mode
    #[arg(long = "addon")]
    addons: Vec<String>,

    /// How --addon values are interpreted
    #[arg(long, value_enum, default_value_t)]
    addon_mode: AddonMode,

    /// Directory of .xpi packages for --addon-mode store
    #[arg(long, required_if_eq("addon_mode", "store"))]
    addon_store: Option<PathBuf>,

    /// Force a user agent in the new profile
    #[arg(long)]
    user_agent: Option<String>,

    /// Keep extension state inherited from the template
    #[arg(long)]
    no_harden: bool,

    /// Use the URL as given instead of following redirects
    #[arg(long)]
    no_resolve: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn extension_strategy(&self) -> ExtensionStrategy {
        match self.addon_mode {
            AddonMode::Copy => ExtensionStrategy::Copy,
            AddonMode::Policy => ExtensionStrategy::Policy,
            AddonMode::Store => ExtensionStrategy::Store {
                dir: self.addon_store.clone().unwrap_or_default(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    finish(require_command(PwaConfig::LAUNCHER_BINARY))?;

    let paths = finish(PwaPaths::from_env())?;
    let template = finish(resolve_template(
        args.template.as_deref(),
        &template_candidates(&paths),
    ))?;
    debug!("Using template profile {}", template.display());

    let mut deployer = PwaDeployer::new(paths, template)
        .with_extension_strategy(args.extension_strategy())
        .hardened(!args.no_harden);
    if args.no_resolve {
        deployer = deployer.with_resolver(Arc::new(NoopResolver));
    }

    let request = DeployRequest {
        name: args.name.clone(),
        url: args.url.clone(),
        icon: args.icon.clone(),
        layout: Some(args.layout.clone()),
        user_agent: args.user_agent.clone(),
        addons: args.addons.clone(),
    };

    match finish(deployer.deploy(&request).await)? {
        DeployOutcome::Created { site_id, .. } => {
            info!("[SUCCESS] {} deployed. Site ID: {}", args.name, site_id)
        }
        DeployOutcome::Updated { site_id, .. } => {
            info!("[OK] Updated {} successfully. Site ID: {}", args.name, site_id)
        }
    }

    Ok(())
}
