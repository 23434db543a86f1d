use crate::config::BootConfig;
use crate::error::{DeskutilError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static GENERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^system-(\d+)-link$").unwrap());

/// A system profile generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub number: u64,
    /// The `system-<N>-link` symlink.
    pub link: PathBuf,
    /// Where the link points, made absolute.
    pub target: PathBuf,
}

impl Generation {
    pub fn kernel_link(&self) -> PathBuf {
        self.target.join("kernel")
    }

    pub fn initrd_link(&self) -> PathBuf {
        self.target.join("initrd")
    }

    pub fn init_path(&self) -> PathBuf {
        self.target.join("init")
    }

    /// Contents of `kernel-params`, trimmed; empty when absent.
    pub fn kernel_params(&self) -> String {
        fs::read_to_string(self.target.join("kernel-params"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

fn read_link_absolute(link: &Path) -> Result<PathBuf> {
    let target = fs::read_link(link).map_err(|e| DeskutilError::io_with_path(e, link))?;
    Ok(match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target,
    })
}

/// The newest `limit` generations in `profile_dir`, newest first.
pub fn list_generations(profile_dir: &Path, limit: usize) -> Result<Vec<Generation>> {
    let entries = match fs::read_dir(profile_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DeskutilError::io_with_path(e, profile_dir)),
    };

    let mut found: Vec<(u64, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            let caps = GENERATION_RE.captures(name.to_str()?)?;
            let number = caps[1].parse::<u64>().ok()?;
            Some((number, e.path()))
        })
        .collect();
    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.truncate(limit);

    let mut generations = Vec::with_capacity(found.len());
    for (number, link) in found {
        match read_link_absolute(&link) {
            Ok(target) => generations.push(Generation {
                number,
                link,
                target,
            }),
            Err(e) => warn!("Skipping generation {}: {}", number, e),
        }
    }
    Ok(generations)
}

/// Boot file looked up on the ESP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootFileKind {
    Kernel,
    Initrd,
}

impl BootFileKind {
    pub fn suffix(self) -> &'static str {
        match self {
            BootFileKind::Kernel => BootConfig::KERNEL_SUFFIX,
            BootFileKind::Initrd => BootConfig::INITRD_SUFFIX,
        }
    }
}

/// Map a store symlink (`<gen>/kernel`, `<gen>/initrd`) to the copy the
/// bootloader installer placed on the ESP.
///
/// Returns an ESP-rooted path such as `/EFI/nixos/<hash>-linux-bzImage.efi`.
/// When no copy exists the store link itself is returned, which only boots if
/// the firmware can read the root filesystem.
pub fn resolve_esp_path(esp: &Path, store_link: &Path, kind: BootFileKind) -> String {
    match find_on_esp(esp, store_link, kind) {
        Ok(Some(path)) => return path,
        Ok(None) => {}
        Err(e) => warn!(
            "Could not resolve ESP path for {}: {}",
            store_link.display(),
            e
        ),
    }
    warn!(
        "Using store path for {:?}; not found in {}",
        kind,
        BootConfig::ESP_KERNEL_DIR
    );
    store_link.display().to_string()
}

fn find_on_esp(esp: &Path, store_link: &Path, kind: BootFileKind) -> Result<Option<String>> {
    let real = fs::read_link(store_link).map_err(|e| DeskutilError::io_with_path(e, store_link))?;
    let store_dir = real
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let hash = store_dir.split('-').next().unwrap_or_default();
    if hash.is_empty() {
        return Ok(None);
    }

    let kernel_dir = esp.join(BootConfig::ESP_KERNEL_DIR);
    let entries = match fs::read_dir(&kernel_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DeskutilError::io_with_path(e, &kernel_dir)),
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy())
                .is_some_and(|n| n.contains(hash) && n.ends_with(kind.suffix()))
        })
        .collect();
    matches.sort();

    Ok(matches.into_iter().next().and_then(|path| {
        let rel = path.strip_prefix(esp).ok()?;
        debug!("Resolved {} to {}", store_link.display(), rel.display());
        Some(format!("/{}", rel.display()))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_list_generations_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let profiles = temp_dir.path();
        for n in [1, 2, 10, 3, 9, 4, 5] {
            let target = profiles.join(format!("store-{}", n));
            fs::create_dir_all(&target).unwrap();
            symlink(&target, profiles.join(format!("system-{}-link", n))).unwrap();
        }
        symlink(profiles.join("store-1"), profiles.join("system")).unwrap();

        let gens = list_generations(profiles, 5).unwrap();
        let numbers: Vec<u64> = gens.iter().map(|g| g.number).collect();
        assert_eq!(numbers, vec![10, 9, 5, 4, 3]);
        assert_eq!(gens[0].target, profiles.join("store-10"));

        assert!(list_generations(&profiles.join("missing"), 5).unwrap().is_empty());
    }

    #[test]
    fn test_relative_link_target() {
        let temp_dir = TempDir::new().unwrap();
        let profiles = temp_dir.path();
        fs::create_dir_all(profiles.join("system-7")).unwrap();
        symlink("system-7", profiles.join("system-7-link")).unwrap();

        let gens = list_generations(profiles, 5).unwrap();
        assert_eq!(gens[0].target, profiles.join("system-7"));
    }

    #[test]
    fn test_resolve_esp_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let store = root.join("store").join("abc123-linux-zen-6.18");
        fs::create_dir_all(&store).unwrap();
        fs::write(store.join("bzImage"), b"k").unwrap();
        let link = root.join("kernel");
        symlink(store.join("bzImage"), &link).unwrap();

        let esp = root.join("boot");
        let nixos = esp.join("EFI").join("nixos");
        fs::create_dir_all(&nixos).unwrap();
        fs::write(nixos.join("abc123-linux-zen-6.18-bzImage.efi"), b"k").unwrap();

        assert_eq!(
            resolve_esp_path(&esp, &link, BootFileKind::Kernel),
            "/EFI/nixos/abc123-linux-zen-6.18-bzImage.efi"
        );
        assert_eq!(
            resolve_esp_path(&esp, &link, BootFileKind::Initrd),
            link.display().to_string()
        );
        assert_eq!(
            resolve_esp_path(&esp, &root.join("dangling"), BootFileKind::Kernel),
            root.join("dangling").display().to_string()
        );
    }
}
