//! Platform abstraction layer.
//!
//! This module centralizes environment lookups and permission handling so the
//! rest of the crate never reads `$XDG_DATA_HOME` or calls `chmod` directly.
//!
//! - `paths` - XDG locations, template discovery, PATH lookups
//! - `permissions` - owner-only and executable modes

pub mod paths;
pub mod permissions;

// Re-export commonly used items
pub use paths::{
    command_exists, expand_home, require_command, resolve_template, template_candidates,
    xdg_data_home, PwaPaths,
};
pub use permissions::{harden_tree, set_executable, set_private_dir, set_private_file};
