//! zeroplay-manager - scaffold and watch the emulator game library.

use anyhow::Result;
use clap::{Parser, Subcommand};
use deskutil_cli::{finish, init_logging};
use deskutil_core::config::GamesConfig;
use deskutil_core::games::{scan_library, LibraryWatcher};
use deskutil_core::platform::expand_home;
use std::sync::atomic::Ordering;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "zeroplay-manager")]
#[command(about = "Scaffold game folders in the emulator library")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the library once
    Scan {
        /// Library root
        #[arg(default_value = GamesConfig::DEFAULT_LIBRARY)]
        path: String,
    },
    /// Scan, then keep watching for new games until interrupted
    Daemon {
        /// Library root
        #[arg(default_value = GamesConfig::DEFAULT_LIBRARY)]
        path: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match args.command {
        Command::Scan { path } => {
            let games = finish(scan_library(&expand_home(&path)))?;
            info!("Scan complete: {} games", games.len());
        }
        Command::Daemon { path } => {
            let watcher = LibraryWatcher::new(expand_home(&path));
            let stop = watcher.stop_handle();
            ctrlc::set_handler(move || {
                info!("Shutdown signal received, exiting");
                stop.store(true, Ordering::SeqCst);
            })?;
            finish(watcher.run())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let args = Args::parse_from(["zeroplay-manager", "scan"]);
        assert!(matches!(args.command, Command::Scan { ref path } if path == "~/Games"));

        let args = Args::parse_from(["zeroplay-manager", "daemon", "/mnt/games", "--debug"]);
        assert!(args.debug);
        assert!(matches!(args.command, Command::Daemon { ref path } if path == "/mnt/games"));
    }
}
