//! Bootloader menu regeneration.
//!
//! Builds a rEFInd include file listing the most recent system generations,
//! pointing each entry at the kernel and initrd copies on the ESP.

mod generations;
mod menu;

pub use generations::{list_generations, resolve_esp_path, BootFileKind, Generation};
pub use menu::{kernel_options, render_menu, MenuEntry};

use crate::config::BootConfig;
use crate::error::Result;
use crate::metadata::atomic_write_string;
use std::path::PathBuf;
use tracing::info;

/// Inputs for [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntryConfig {
    pub profile_dir: PathBuf,
    /// ESP mount point.
    pub esp: PathBuf,
    /// Output file; defaults to a path under the ESP.
    pub output: Option<PathBuf>,
    pub icon: String,
    pub title: String,
    pub forced_options: String,
    pub limit: usize,
}

impl Default for BootEntryConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from(BootConfig::PROFILE_DIR),
            esp: PathBuf::from(BootConfig::ESP_MOUNT),
            output: None,
            icon: BootConfig::ICON_PATH.to_string(),
            title: BootConfig::MENU_TITLE.to_string(),
            forced_options: BootConfig::FORCED_OPTIONS.to_string(),
            limit: BootConfig::GENERATION_LIMIT,
        }
    }
}

impl BootEntryConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.esp.join(BootConfig::OUTPUT_RELATIVE))
    }
}

/// Menu entries for the configured generations, newest first.
pub fn collect_entries(config: &BootEntryConfig) -> Result<Vec<MenuEntry>> {
    let generations = list_generations(&config.profile_dir, config.limit)?;
    Ok(generations
        .iter()
        .map(|generation| MenuEntry {
            generation: generation.number,
            loader: resolve_esp_path(&config.esp, &generation.kernel_link(), BootFileKind::Kernel),
            initrd: resolve_esp_path(&config.esp, &generation.initrd_link(), BootFileKind::Initrd),
            options: kernel_options(
                &generation.init_path().display().to_string(),
                &generation.kernel_params(),
                &config.forced_options,
            ),
        })
        .collect())
}

/// Regenerate the menu include file.
///
/// Returns the written path, or `None` when there are no generations, in
/// which case any existing file is left alone.
pub fn generate(config: &BootEntryConfig) -> Result<Option<PathBuf>> {
    let entries = collect_entries(config)?;
    if entries.is_empty() {
        info!("No generations found in {}", config.profile_dir.display());
        return Ok(None);
    }

    let output = config.output_path();
    info!(
        "Generating {} for {} generations...",
        output.display(),
        entries.len()
    );
    atomic_write_string(&output, &render_menu(&config.title, &config.icon, &entries))?;
    Ok(Some(output))
}
