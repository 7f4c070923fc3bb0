pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod scene_file;
pub mod scene_name;

pub use error::{HostError, Result, SceneFileError};
pub use host::{FileSystemHost, HostDocument, SceneHost};
pub use scene_file::{ScanMode, SceneFile, SceneFileFields, SceneFileForm};
pub use scene_name::SceneName;
