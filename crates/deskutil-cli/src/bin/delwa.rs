//! delwa - delete a progressive web app by display name.

use anyhow::Result;
use clap::Parser;
use deskutil_cli::{finish, init_logging};
use deskutil_core::platform::PwaPaths;
use deskutil_core::pwa::PwaRemover;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "delwa")]
#[command(about = "Delete a Firefox PWA by name")]
struct Args {
    /// Exact name of the PWA (e.g. 'GitHub')
    name: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    info!("Searching for PWA: '{}'...", args.name);
    let paths = finish(PwaPaths::from_env())?;
    let report = finish(PwaRemover::new(paths).remove(&args.name))?;

    if let Some(profile_id) = &report.profile_id {
        if report.profile_dir_removed {
            info!("Deleted profile: {}", profile_id);
        }
    }
    for entry in &report.desktop_entries_removed {
        info!("Removed desktop entry: {}", entry.display());
    }
    info!("[SUCCESS] Deleted PWA: {} ({})", args.name, report.site_id);

    Ok(())
}
