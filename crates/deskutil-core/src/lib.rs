//! Deskutil Core - Headless library for desktop sysadmin utilities.
//!
//! This crate provides the functionality behind the deskutil command-line
//! tools. It can be used programmatically without any of the binaries.
//!
//! - [`pwa`]: deploy, update and remove progressive web apps, each running
//!   in its own isolated browser profile
//! - [`games`]: scaffold and watch an emulator game library
//! - [`boot`]: regenerate the bootloader menu from system generations
//!
//! # Example
//!
//! ```rust,ignore
//! use deskutil_core::platform::{resolve_template, template_candidates, PwaPaths};
//! use deskutil_core::pwa::{DeployRequest, PwaDeployer};
//!
//! #[tokio::main]
//! async fn main() -> deskutil_core::Result<()> {
//!     let paths = PwaPaths::from_env()?;
//!     let template = resolve_template(None, &template_candidates(&paths))?;
//!
//!     let deployer = PwaDeployer::new(paths, template);
//!     let outcome = deployer
//!         .deploy(&DeployRequest::new("Example", "https://example.com"))
//!         .await?;
//!     println!("Site ID: {}", outcome.site_id());
//!
//!     Ok(())
//! }
//! ```

pub mod boot;
pub mod config;
pub mod error;
pub mod games;
pub mod metadata;
pub mod platform;
pub mod pwa;

// Re-export commonly used types
pub use error::{DeskutilError, Result};
pub use platform::PwaPaths;
pub use pwa::{DeployOutcome, DeployRequest, PwaDeployer, PwaRemover, RemovalReport};
