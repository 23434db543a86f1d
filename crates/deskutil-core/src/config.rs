//! Centralized configuration for deskutil.
//!
//! This module provides the well-known file names, directory layouts, timeouts
//! and lookup tables used by the PWA, game library and boot entry tools.

use std::time::Duration;

/// PWA registry and filesystem layout configuration.
pub struct PwaConfig;

impl PwaConfig {
    pub const DATA_DIR_NAME: &'static str = "firefoxpwa";
    pub const REGISTRY_FILENAME: &'static str = "config.json";
    pub const SITES_DIR_NAME: &'static str = "sites";
    pub const PROFILES_DIR_NAME: &'static str = "profiles";
    pub const APPLICATIONS_DIR_NAME: &'static str = "applications";
    pub const TEMPLATE_DIR_NAME: &'static str = "template";

    pub const MANIFEST_FILENAME: &'static str = "manifest.json";
    pub const SITE_CONFIG_FILENAME: &'static str = "config.json";
    pub const ICON_FILENAME: &'static str = "icon.png";

    pub const LAUNCHER_BINARY: &'static str = "firefoxpwa";
    pub const DESKTOP_SUFFIX: &'static str = "-fpwa";
    pub const DESKTOP_CATEGORIES: &'static [&'static str] = &["Network", "WebBrowser"];
    /// Site id characters appended when two names share an entry file name.
    pub const DESKTOP_ID_SUFFIX_LEN: usize = 6;
    pub const DEFAULT_LAYOUT: &'static str = "arrows,refresh";

    /// Template profile locations relative to the running executable.
    pub const TEMPLATE_EXE_RELATIVE: &'static [&'static str] = &[
        "resources/testprofile",
        "../share/firefoxpwa/testprofile",
    ];
    pub const TEMPLATE_SYSTEM_PATH: &'static str = "/usr/share/firefoxpwa/testprofile";

    // Crockford base32; ULID timestamps never start above 7.
    pub const ULID_ALPHABET: &'static [u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
    pub const ULID_FIRST_ALPHABET: &'static [u8] = b"01234567";
    pub const ULID_LEN: usize = 26;
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REDIRECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const MAX_REDIRECTS: usize = 10;
    pub const PROBE_USER_AGENT: &'static str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Mobile Safari/537.36";
}

/// Browser profile materialization configuration.
pub struct ProfileConfig;

impl ProfileConfig {
    /// Files held by a running instance of the template; never copied.
    pub const LOCK_FILES: &'static [&'static str] = &["lock", ".parentlock"];

    pub const TRASH: &'static [&'static str] =
        &["compatibility.ini", "search.json.mozlz4", "startupCache"];

    /// Extension state that would let a clone remember the template's add-ons.
    pub const HARDENED_TRASH: &'static [&'static str] = &[
        "extensions.json",
        "addonStartup.json.lz4",
        "extension-settings.json",
        "extension-preferences.json",
        "extensions",
    ];

    pub const PREFS_FILENAME: &'static str = "user.js";
    pub const EXTENSIONS_DIR_NAME: &'static str = "extensions";
    pub const POLICY_DIR_NAME: &'static str = "distribution";
    pub const POLICY_FILENAME: &'static str = "policies.json";
    pub const XPI_EXTENSION: &'static str = "xpi";

    pub const DIR_MODE: u32 = 0o700;
    pub const FILE_MODE: u32 = 0o600;
}

/// Emulator game library configuration.
pub struct GamesConfig;

impl GamesConfig {
    pub const DEFAULT_LIBRARY: &'static str = "~/Games";
    pub const GAME_CONFIG_FILENAME: &'static str = "config.json";
    pub const SKIPPED_PLATFORM: &'static str = "PC";
    pub const SUBFOLDERS: &'static [&'static str] = &[
        "Config", "Saves", "Mods", "Cheats", "Updates", "Media", "Manuals",
    ];
    pub const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(500);
}

/// Bootloader entry generation configuration.
pub struct BootConfig;

impl BootConfig {
    pub const PROFILE_DIR: &'static str = "/nix/var/nix/profiles";
    pub const ESP_MOUNT: &'static str = "/boot";
    pub const OUTPUT_RELATIVE: &'static str = "EFI/refind/zenos-entries.conf";
    pub const ESP_KERNEL_DIR: &'static str = "EFI/nixos";
    pub const ICON_PATH: &'static str = "/EFI/refind/themes/refind-ambience-hack/icons/os_zenos.png";
    pub const MENU_TITLE: &'static str = "ZenOS";
    pub const FORCED_OPTIONS: &'static str = "amd_iommu=on iommu=pt preempt=full threadirqs amd_pstate=active splash loglevel=4 lsm=landlock,yama,bpf";
    pub const GENERATION_LIMIT: usize = 5;
    pub const KERNEL_SUFFIX: &'static str = "-bzImage.efi";
    pub const INITRD_SUFFIX: &'static str = "-initrd.efi";
}
