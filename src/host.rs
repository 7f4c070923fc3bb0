use crate::error::HostError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of the document currently open in the host application.
pub trait HostDocument {
    /// `true` when the open document has edits that are not on disk yet.
    fn is_document_modified(&self) -> bool;

    /// Path the open document was last loaded from or saved to. `None` for an untitled document.
    fn current_document_path(&self) -> Option<PathBuf>;
}

/// File operations the host performs on behalf of a [`crate::scene_file::SceneFile`].
pub trait SceneHost {
    /// Writes the open document to `path` and makes it the current document.
    ///
    /// Must report an absent parent directory as [`HostError::MissingDirectory`] and leave
    /// the current document untouched on any failure.
    fn save_as(&mut self, path: &Path) -> Result<(), HostError>;

    /// Bare filenames directly inside `dir`.
    fn list_directory(&self, dir: &Path) -> Result<Vec<String>, HostError>;

    /// Creates `dir` and any missing parents. Succeeds if it already exists.
    fn make_directories(&mut self, dir: &Path) -> Result<(), HostError>;
}

/// A host backed by the local filesystem, holding the open document's bytes in memory.
#[derive(Debug, Clone, Default)]
pub struct FileSystemHost {
    contents: Vec<u8>,
    current_path: Option<PathBuf>,
    modified: bool,
}

impl FileSystemHost {
    /// An untitled, unmodified document with no contents.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// An untitled document holding unsaved `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self { contents: contents.into(), current_path: None, modified: true }
    }

    /// Opens an existing scene file as the clean current document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let contents = fs::read(path)?;
        Ok(Self { contents, current_path: Some(path.to_path_buf()), modified: false })
    }
}

impl HostDocument for FileSystemHost {
    fn is_document_modified(&self) -> bool {
        self.modified
    }

    fn current_document_path(&self) -> Option<PathBuf> {
        self.current_path.clone()
    }
}

impl SceneHost for FileSystemHost {
    fn save_as(&mut self, path: &Path) -> Result<(), HostError> {
        let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
        if let Some(parent) = parent {
            if !parent.is_dir() {
                return Err(HostError::MissingDirectory(parent.to_path_buf()));
            }
        }
        fs::write(path, &self.contents).map_err(|err| match (err.kind(), parent) {
            (io::ErrorKind::NotFound, Some(parent)) => HostError::MissingDirectory(parent.to_path_buf()),
            _ => HostError::Io(err),
        })?;
        self.current_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    fn list_directory(&self, dir: &Path) -> Result<Vec<String>, HostError> {
        let entries = fs::read_dir(dir).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => HostError::MissingDirectory(dir.to_path_buf()),
            _ => HostError::Io(err),
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    fn make_directories(&mut self, dir: &Path) -> Result<(), HostError> {
        fs::create_dir_all(dir)?;
        Ok(())
    }
}
