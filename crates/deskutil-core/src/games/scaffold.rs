use super::find_platform;
use crate::config::GamesConfig;
use crate::error::{DeskutilError, Result};
use crate::metadata::atomic_write_json;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-game override file written next to the ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub meta_game_title: String,
    pub meta_platform: String,
    pub emulator_override: Option<String>,
    #[serde(default)]
    pub custom_args: Vec<String>,
    pub compat_layer: Option<String>,
}

impl GameConfig {
    pub fn new(title: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            meta_game_title: title.into(),
            meta_platform: platform.into(),
            emulator_override: None,
            custom_args: Vec::new(),
            compat_layer: None,
        }
    }
}

/// Create the standard subfolders and, if missing, the override file.
///
/// Returns true when `config.json` was written. An existing override file is
/// never touched.
pub fn scaffold_game(game_dir: &Path, platform: &str) -> Result<bool> {
    for folder in GamesConfig::SUBFOLDERS {
        let dir = game_dir.join(folder);
        fs::create_dir_all(&dir).map_err(|e| DeskutilError::io_with_path(e, &dir))?;
    }

    let config_path = game_dir.join(GamesConfig::GAME_CONFIG_FILENAME);
    if config_path.exists() {
        debug!("{} already scaffolded", game_dir.display());
        return Ok(false);
    }

    let title = game_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    atomic_write_json(&config_path, &GameConfig::new(&title, platform))?;

    info!("Scaffolding complete for: {}", title);
    Ok(true)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| DeskutilError::io_with_path(e, dir))?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// A game directory holds at least one file other than its override file.
fn has_rom(game_dir: &Path) -> bool {
    fs::read_dir(game_dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.path().is_file() && e.file_name() != GamesConfig::GAME_CONFIG_FILENAME
            })
        })
        .unwrap_or(false)
}

/// Scaffold every game found under `base`.
///
/// A missing library is not an error. Returns the game directories that
/// were visited.
pub fn scan_library(base: &Path) -> Result<Vec<PathBuf>> {
    if !base.exists() {
        info!("Games directory {} not found. Skipping.", base.display());
        return Ok(Vec::new());
    }

    info!("Scanning game library at: {}", base.display());
    let mut games = Vec::new();

    for platform_dir in sorted_dirs(base)? {
        if is_hidden(&platform_dir)
            || platform_dir.file_name() == Some(GamesConfig::SKIPPED_PLATFORM.as_ref())
        {
            continue;
        }
        let platform = platform_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for game_dir in sorted_dirs(&platform_dir)? {
            if !has_rom(&game_dir) {
                continue;
            }
            if let Err(e) = scaffold_game(&game_dir, &platform) {
                warn!("Error scaffolding {}: {}", game_dir.display(), e);
                continue;
            }
            games.push(game_dir);
        }
    }

    Ok(games)
}

/// Game directory a filesystem event should scaffold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTarget {
    pub platform: String,
    pub game_dir: PathBuf,
}

/// Decide whether a new file at `path` belongs to a game under `base`.
///
/// Only files placed directly inside `<base>/<Platform>/<Game>/` of a known
/// platform qualify. Scaffolding output is ignored so the watcher never
/// reacts to its own writes.
pub fn route_event(base: &Path, path: &Path) -> Option<GameTarget> {
    if path.file_name() == Some(GamesConfig::GAME_CONFIG_FILENAME.as_ref()) {
        return None;
    }
    let parent = path.parent()?;
    let parent_name = parent.file_name()?.to_string_lossy();
    if GamesConfig::SUBFOLDERS.iter().any(|f| *f == parent_name) {
        return None;
    }

    let rel = path.strip_prefix(base).ok()?;
    let mut parts = rel.components();
    let platform = parts.next()?.as_os_str().to_string_lossy().into_owned();
    let game = parts.next()?.as_os_str().to_owned();
    parts.next()?;

    if platform == GamesConfig::SKIPPED_PLATFORM || find_platform(&platform).is_none() {
        return None;
    }

    let game_dir = base.join(&platform).join(game);
    (parent == game_dir).then_some(GameTarget { platform, game_dir })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_game_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let game = temp_dir.path().join("PS2").join("Okami");
        fs::create_dir_all(&game).unwrap();

        assert!(scaffold_game(&game, "PS2").unwrap());
        for folder in GamesConfig::SUBFOLDERS {
            assert!(game.join(folder).is_dir());
        }

        let raw = fs::read_to_string(game.join("config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["meta_game_title"], "Okami");
        assert_eq!(value["meta_platform"], "PS2");
        assert!(value["emulator_override"].is_null());
        assert_eq!(value["custom_args"], serde_json::json!([]));
        assert!(value["compat_layer"].is_null());

        fs::write(game.join("config.json"), "{\"custom\":true}").unwrap();
        assert!(!scaffold_game(&game, "PS2").unwrap());
        assert_eq!(
            fs::read_to_string(game.join("config.json")).unwrap(),
            "{\"custom\":true}"
        );
    }

    #[test]
    fn test_scan_library() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();

        let with_rom = base.join("SNES").join("Earthbound");
        fs::create_dir_all(&with_rom).unwrap();
        fs::write(with_rom.join("earthbound.sfc"), b"rom").unwrap();

        let empty = base.join("SNES").join("Empty");
        fs::create_dir_all(&empty).unwrap();

        let pc = base.join("PC").join("Doom");
        fs::create_dir_all(&pc).unwrap();
        fs::write(pc.join("doom.exe"), b"exe").unwrap();

        let hidden = base.join(".cache").join("Thing");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("blob"), b"x").unwrap();

        fs::write(base.join("notes.txt"), b"root file").unwrap();

        let games = scan_library(base).unwrap();
        assert_eq!(games, vec![with_rom.clone()]);
        assert!(with_rom.join("config.json").is_file());
        assert!(!empty.join("Saves").exists());
        assert!(!pc.join("config.json").exists());
        assert!(!hidden.join("config.json").exists());
    }

    #[test]
    fn test_scan_missing_library() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_library(&temp_dir.path().join("Games")).unwrap().is_empty());
    }

    #[test]
    fn test_route_event() {
        let base = Path::new("/home/u/Games");

        assert_eq!(
            route_event(base, Path::new("/home/u/Games/N64/Zelda/zelda.z64")),
            Some(GameTarget {
                platform: "N64".to_string(),
                game_dir: PathBuf::from("/home/u/Games/N64/Zelda"),
            })
        );

        // Scaffolding output.
        assert_eq!(route_event(base, Path::new("/home/u/Games/N64/Zelda/config.json")), None);
        assert_eq!(route_event(base, Path::new("/home/u/Games/N64/Zelda/Saves/a.sav")), None);
        // Too shallow, too deep, unknown or skipped platform, outside base.
        assert_eq!(route_event(base, Path::new("/home/u/Games/N64/zelda.z64")), None);
        assert_eq!(route_event(base, Path::new("/home/u/Games/N64/Zelda/disc/1.iso")), None);
        assert_eq!(route_event(base, Path::new("/home/u/Games/Amiga/Lemmings/l.adf")), None);
        assert_eq!(route_event(base, Path::new("/home/u/Games/PC/Doom/doom.exe")), None);
        assert_eq!(route_event(base, Path::new("/tmp/N64/Zelda/zelda.z64")), None);
    }
}
