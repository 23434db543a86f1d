//! Error types for deskutil.
//!
//! A missing registry initializes empty; a corrupt one aborts with
//! [`DeskutilError::RegistryCorrupt`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the deskutil library.
#[derive(Debug, Error)]
pub enum DeskutilError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Registry at {path} is corrupt: {message}")]
    RegistryCorrupt { path: PathBuf, message: String },

    // Lookup errors
    #[error("No PWA found with Name='{name}'")]
    NotFound { name: String },

    // Dependency errors
    #[error("Required binary '{name}' is missing from PATH")]
    MissingDependency { name: String },

    #[error("Template profile not found (searched: {})", format_paths(.searched))]
    TemplateNotFound { searched: Vec<PathBuf> },

    // Validation errors
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Extension packages
    #[error("Archive error: {message}")]
    Archive { message: String },

    // File watching
    #[error("Watch error: {message}")]
    Watch { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for deskutil operations.
pub type Result<T> = std::result::Result<T, DeskutilError>;

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for DeskutilError {
    fn from(err: std::io::Error) -> Self {
        DeskutilError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for DeskutilError {
    fn from(err: serde_json::Error) -> Self {
        DeskutilError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<zip::result::ZipError> for DeskutilError {
    fn from(err: zip::result::ZipError) -> Self {
        DeskutilError::Archive {
            message: err.to_string(),
        }
    }
}

impl From<notify::Error> for DeskutilError {
    fn from(err: notify::Error) -> Self {
        DeskutilError::Watch {
            message: err.to_string(),
        }
    }
}

impl DeskutilError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DeskutilError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Errors caused by operator input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DeskutilError::NotFound { .. }
                | DeskutilError::Validation { .. }
                | DeskutilError::InvalidUrl { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeskutilError::NotFound {
            name: "GitHub".into(),
        };
        assert_eq!(err.to_string(), "No PWA found with Name='GitHub'");
    }

    #[test]
    fn test_template_not_found_lists_paths() {
        let err = DeskutilError::TemplateNotFound {
            searched: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        };
        assert_eq!(
            err.to_string(),
            "Template profile not found (searched: /a, /b)"
        );
    }

    #[test]
    fn test_user_errors() {
        assert!(DeskutilError::NotFound { name: "x".into() }.is_user_error());
        assert!(!DeskutilError::MissingDependency {
            name: "firefoxpwa".into()
        }
        .is_user_error());
    }
}
