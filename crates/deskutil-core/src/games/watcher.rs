//! File system watcher for the game library.
//!
//! Watches the library recursively and scaffolds a game directory as soon as
//! a file is created in it or moved into it.

use super::scaffold::{route_event, scaffold_game, scan_library};
use crate::config::GamesConfig;
use crate::error::{DeskutilError, Result};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Blocking watcher over a game library.
pub struct LibraryWatcher {
    base: PathBuf,
    stop: Arc<AtomicBool>,
}

impl LibraryWatcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends [`LibraryWatcher::run`] once set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Scan once, then process events until stopped.
    ///
    /// Events are handled one at a time on the calling thread.
    pub fn run(&self) -> Result<()> {
        if !self.base.exists() {
            warn!("Path {} does not exist.", self.base.display());
            return Ok(());
        }

        scan_library(&self.base)?;

        let (event_tx, event_rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(event_tx)?;
        watcher.watch(&self.base, RecursiveMode::Recursive)?;

        info!("Watching game library at {}", self.base.display());

        while !self.stop.load(Ordering::SeqCst) {
            match event_rx.recv_timeout(GamesConfig::WATCH_POLL_INTERVAL) {
                Ok(Ok(event)) => self.handle(&event),
                Ok(Err(e)) => warn!("File watcher error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DeskutilError::Watch {
                        message: "event channel disconnected".to_string(),
                    });
                }
            }
        }

        debug!("Game library watcher stopping");
        Ok(())
    }

    fn handle(&self, event: &Event) {
        for path in event_paths(event) {
            if path.is_dir() {
                continue;
            }
            let Some(target) = route_event(&self.base, path) else {
                continue;
            };

            let game = target
                .game_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Change detected in {} ({}). Updating...", game, target.platform);

            if let Err(e) = scaffold_game(&target.game_dir, &target.platform) {
                warn!("Error scaffolding {}: {}", target.game_dir.display(), e);
            }
        }
    }
}

/// Paths of newly created files or rename destinations.
fn event_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => &[],
        EventKind::Create(_) => event.paths.as_slice(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.as_slice(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.get(1..).unwrap_or(&[])
        }
        _ => &[],
    }
}
