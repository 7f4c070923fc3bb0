use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SceneFileError>;

/// Failures reported by a host application while listing, creating, or writing scene files.
#[derive(Error, Debug)]
pub enum HostError {
    /// The directory a scene should be written into does not exist yet.
    #[error("directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The host refused the operation for an application-specific reason.
    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

impl HostError {
    pub fn is_missing_directory(&self) -> bool {
        matches!(self, HostError::MissingDirectory(_))
    }
}

#[derive(Error, Debug)]
pub enum SceneFileError {
    /// The filename matches neither the `_v` grammar nor the `_` grammar.
    #[error("malformed scene name '{name}': {reason}")]
    MalformedSceneName { name: String, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("failed to save scene {}", .path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: HostError,
    },

    #[error("failed to list scenes under {}", .path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: HostError,
    },
}

impl SceneFileError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        SceneFileError::MalformedSceneName { name: name.to_string(), reason: reason.into() }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SceneFileError::InvalidField { field, reason: reason.into() }
    }
}
