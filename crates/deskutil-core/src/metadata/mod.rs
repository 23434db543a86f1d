//! Persistence helpers.
//!
//! Every file that other tools read concurrently (the PWA registry, site
//! manifests, boot menu includes) is written through these atomic helpers.

mod atomic;
mod nullable;

pub use atomic::{atomic_read_json, atomic_write_json, atomic_write_string};
pub use nullable::null_as_default;
