//! refind-entries - regenerate the rEFInd menu include for recent system
//! generations.

use anyhow::Result;
use clap::Parser;
use deskutil_cli::{finish, init_logging};
use deskutil_core::boot::{generate, BootEntryConfig};
use deskutil_core::config::BootConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "refind-entries")]
#[command(about = "Write rEFInd menu entries for the newest system generations")]
struct Args {
    /// Directory holding system-<N>-link generations
    #[arg(long, default_value = BootConfig::PROFILE_DIR)]
    profile_dir: PathBuf,

    /// ESP mount point
    #[arg(long, default_value = BootConfig::ESP_MOUNT)]
    esp: PathBuf,

    /// Output file (default: <esp>/EFI/refind/zenos-entries.conf)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Menu icon, relative to the ESP root
    #[arg(long, default_value = BootConfig::ICON_PATH)]
    icon: String,

    /// Menu entry title
    #[arg(long, default_value = BootConfig::MENU_TITLE)]
    title: String,

    /// Kernel options appended to every entry
    #[arg(long, default_value = BootConfig::FORCED_OPTIONS)]
    options: String,

    /// Number of generations to list
    #[arg(long, default_value_t = BootConfig::GENERATION_LIMIT)]
    limit: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl From<Args> for BootEntryConfig {
    fn from(args: Args) -> Self {
        Self {
            profile_dir: args.profile_dir,
            esp: args.esp,
            output: args.output,
            icon: args.icon,
            title: args.title,
            forced_options: args.options,
            limit: args.limit,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = BootEntryConfig::from(args);
    if let Some(path) = finish(generate(&config))? {
        info!("Done. Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_boot_config() {
        let config = BootEntryConfig::from(Args::parse_from(["refind-entries"]));
        assert_eq!(config, BootEntryConfig::default());
    }
}
