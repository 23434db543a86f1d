//! Emulator game library management.
//!
//! The library is laid out as `<base>/<Platform>/<Game>/<rom file>`. Every
//! game directory is scaffolded with a fixed set of subfolders and a
//! per-game override file.

mod scaffold;
mod watcher;

pub use scaffold::{route_event, scaffold_game, scan_library, GameConfig, GameTarget};
pub use watcher::LibraryWatcher;

/// Known platform directory and its emulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub default_emulator: &'static str,
    pub alternatives: &'static [&'static str],
}

const fn platform(
    name: &'static str,
    default_emulator: &'static str,
    alternatives: &'static [&'static str],
) -> Platform {
    Platform {
        name,
        default_emulator,
        alternatives,
    }
}

/// Platform directories the watcher reacts to.
pub const PLATFORMS: &[Platform] = &[
    platform("Switch", "yuzu", &["ryujinx"]),
    platform("PS2", "pcsx2", &[]),
    platform("PS3", "rpcs3", &[]),
    platform("PS1", "duckstation", &[]),
    platform("PSP", "ppsspp", &[]),
    platform("N64", "simple64", &["mupen64plus"]),
    platform("GC", "dolphin", &[]),
    platform("Wii", "dolphin", &[]),
    platform("3DS", "citra", &["lime3ds"]),
    platform("Genesis", "genesis-plus-gx", &["picodrive"]),
    platform("Saturn", "beetle-saturn", &[]),
    platform("Dreamcast", "flycast", &[]),
    platform("Xbox", "xemu", &[]),
    platform("Xbox360", "xenia", &[]),
    platform("NES", "mesen", &[]),
    platform("SNES", "bsnes", &[]),
];

/// Look up a platform by directory name (case-sensitive).
pub fn find_platform(name: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_platform() {
        let switch = find_platform("Switch").unwrap();
        assert_eq!(switch.default_emulator, "yuzu");
        assert_eq!(switch.alternatives, &["ryujinx"]);
        assert_eq!(find_platform("GC").unwrap().default_emulator, "dolphin");
        assert!(find_platform("switch").is_none());
        assert!(find_platform("PC").is_none());
    }
}
