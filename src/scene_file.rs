use crate::error::{HostError, Result, SceneFileError};
use crate::host::{HostDocument, SceneHost};
use crate::scene_name::{
    parse_version_token, validate_descriptor, validate_extension, validate_version, GrammarError, NameGrammar,
    SceneName,
};
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DESCRIPTOR: &str = "main";
pub const DEFAULT_VERSION: u32 = 1;
pub const DEFAULT_EXTENSION: &str = "ma";

/// How a directory listing is read when looking for the highest existing version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Every entry is parsed on its own with both grammars; entries matching neither are skipped.
    #[default]
    PerFile,
    /// The whole listing is read with the `_v` grammar. The first matching entry without a
    /// `_v` slot restarts the whole scan with the `_` grammar, and any unreadable version on a
    /// matching entry aborts the scan.
    LegacyBatch,
}

impl ScanMode {
    pub fn label(self) -> &'static str {
        match self {
            ScanMode::PerFile => "per_file",
            ScanMode::LegacyBatch => "legacy_batch",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "per_file" => Some(ScanMode::PerFile),
            "legacy_batch" => Some(ScanMode::LegacyBatch),
            _ => None,
        }
    }
}

/// Typed fields used to build a [`SceneFile`] explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SceneFileFields {
    pub directory: PathBuf,
    pub descriptor: String,
    pub version: u32,
    pub extension: String,
}

impl Default for SceneFileFields {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            descriptor: DEFAULT_DESCRIPTOR.to_string(),
            version: DEFAULT_VERSION,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Untyped text as typed into a save dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneFileForm {
    pub directory: String,
    pub descriptor: String,
    pub version: String,
    pub extension: String,
}

impl From<&SceneFile> for SceneFileForm {
    fn from(scene: &SceneFile) -> Self {
        Self {
            directory: scene.directory.display().to_string(),
            descriptor: scene.name.descriptor.clone(),
            version: scene.name.version.to_string(),
            extension: scene.name.extension.clone(),
        }
    }
}

/// A versioned scene file location: `{directory}/{descriptor}_v{version:03}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFile {
    directory: PathBuf,
    name: SceneName,
}

impl SceneFile {
    pub fn new(fields: SceneFileFields) -> Result<Self> {
        let extension = strip_leading_dot(&fields.extension);
        let name = SceneName::new(fields.descriptor, fields.version, extension);
        name.validate()?;
        Ok(Self { directory: fields.directory, name })
    }

    /// Builds a scene file for the host's open document.
    ///
    /// A clean document that already lives on disk wins over `fields`: its path is parsed and
    /// `fields` are ignored. Modified or untitled documents use `fields` as given.
    pub fn from_host<D: HostDocument + ?Sized>(host: &D, fields: SceneFileFields) -> Result<Self> {
        if host.is_document_modified() {
            return Self::new(fields);
        }
        let Some(current) = host.current_document_path() else {
            debug!("[smart_save] Untitled document; using explicit scene fields");
            return Self::new(fields);
        };
        Self::from_path(&current)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let (directory, name) = SceneName::parse_path(path)?;
        name.validate()?;
        Ok(Self { directory, name })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn descriptor(&self) -> &str {
        &self.name.descriptor
    }

    pub fn version(&self) -> u32 {
        self.name.version
    }

    pub fn extension(&self) -> &str {
        &self.name.extension
    }

    pub fn name(&self) -> &SceneName {
        &self.name
    }

    pub fn fields(&self) -> SceneFileFields {
        SceneFileFields {
            directory: self.directory.clone(),
            descriptor: self.name.descriptor.clone(),
            version: self.name.version,
            extension: self.name.extension.clone(),
        }
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
    }

    pub fn set_descriptor(&mut self, descriptor: impl Into<String>) -> Result<()> {
        let descriptor = descriptor.into();
        validate_descriptor(&descriptor)?;
        self.name.descriptor = descriptor;
        Ok(())
    }

    pub fn set_version(&mut self, version: u32) -> Result<()> {
        validate_version(version)?;
        self.name.version = version;
        Ok(())
    }

    /// Accepts `"ma"` as well as `".ma"`.
    pub fn set_extension(&mut self, extension: impl AsRef<str>) -> Result<()> {
        let extension = strip_leading_dot(extension.as_ref());
        validate_extension(extension)?;
        self.name.extension = extension.to_string();
        Ok(())
    }

    /// Copies dialog text into the typed fields. Nothing is changed unless every field is valid.
    pub fn populate(&mut self, form: &SceneFileForm) -> Result<()> {
        let descriptor = form.descriptor.trim();
        validate_descriptor(descriptor)?;
        let version_text = form.version.trim();
        let version = version_text.parse::<u32>().map_err(|_| {
            SceneFileError::InvalidField {
                field: "version",
                reason: format!("'{version_text}' is not a whole number"),
            }
        })?;
        validate_version(version)?;
        let extension = strip_leading_dot(form.extension.trim());
        validate_extension(extension)?;

        self.directory = PathBuf::from(form.directory.trim());
        self.name = SceneName::new(descriptor, version, extension);
        Ok(())
    }

    pub fn basename(&self) -> String {
        self.name.basename()
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(self.basename())
    }

    /// Saves the host document to [`Self::path`].
    ///
    /// A missing target directory is created once and the save retried; every other failure
    /// is returned as [`SceneFileError::SaveFailed`].
    pub fn save<H: SceneHost + ?Sized>(&self, host: &mut H) -> Result<PathBuf> {
        let path = self.path();
        match host.save_as(&path) {
            Ok(()) => {}
            Err(HostError::MissingDirectory(missing)) => {
                warn!(
                    "[smart_save] Missing directory {}. Creating {} and retrying.",
                    missing.display(),
                    self.directory.display()
                );
                if let Err(source) = host.make_directories(&self.directory) {
                    return Err(SceneFileError::SaveFailed { path, source });
                }
                if let Err(source) = host.save_as(&path) {
                    return Err(SceneFileError::SaveFailed { path, source });
                }
            }
            Err(source) => return Err(SceneFileError::SaveFailed { path, source }),
        }
        info!("[smart_save] Saved {}", path.display());
        Ok(path)
    }

    /// One past the highest version of this descriptor in `listing`, and never below
    /// `self.version() + 1`.
    pub fn next_version(&self, listing: &[String], mode: ScanMode) -> Result<u32> {
        let descriptor = self.descriptor();
        let floor = self.version();
        let top = match mode {
            ScanMode::PerFile => highest_version_per_file(listing, descriptor, floor),
            ScanMode::LegacyBatch => highest_version_batch(listing, descriptor, floor)?,
        };
        top.checked_add(1)
            .ok_or_else(|| SceneFileError::invalid("version", format!("no version after {top} fits in 32 bits")))
    }

    /// Lists the target directory, moves to the next free version and saves there.
    ///
    /// If the save fails the version is rolled back.
    pub fn increment_and_save<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        mode: ScanMode,
    ) -> Result<PathBuf> {
        let listing = self.existing_names(host)?;
        let next = self.next_version(&listing, mode)?;
        let previous = self.name.version;
        self.name.version = next;
        self.save(host).inspect_err(|_| self.name.version = previous)
    }

    /// Filenames currently in the target directory. A directory that does not exist yet is empty.
    pub fn existing_names<H: SceneHost + ?Sized>(&self, host: &H) -> Result<Vec<String>> {
        match host.list_directory(&self.directory) {
            Ok(names) => Ok(names),
            Err(HostError::MissingDirectory(_)) => Ok(Vec::new()),
            Err(source) => Err(SceneFileError::Listing { path: self.directory.clone(), source }),
        }
    }
}

fn strip_leading_dot(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

fn highest_version_per_file(listing: &[String], descriptor: &str, floor: u32) -> u32 {
    listing.iter().fold(floor, |top, entry| match SceneName::parse(entry) {
        Ok(name) if name.descriptor == descriptor => top.max(name.version),
        Ok(_) => top,
        Err(err) => {
            debug!("[smart_save] Skipping '{entry}': {err}");
            top
        }
    })
}

struct ScanFailure<'a> {
    entry: &'a str,
    error: GrammarError,
    /// Highest matching version read before the failing entry.
    top: u32,
}

fn highest_version_batch(listing: &[String], descriptor: &str, floor: u32) -> Result<u32> {
    let scanned = match scan_with_grammar(listing, descriptor, floor, NameGrammar::VersionToken) {
        Err(ScanFailure { entry, error: GrammarError::Miss(_), top }) => {
            debug!(
                "[smart_save] '{entry}' has no '_v' slot; rescanning listing as {} from version {top}",
                NameGrammar::Underscore.label()
            );
            scan_with_grammar(listing, descriptor, top, NameGrammar::Underscore)
        }
        other => other,
    };
    scanned.map_err(|failure| failure.error.into_scene_error(failure.entry))
}

fn scan_with_grammar<'a>(
    listing: &'a [String],
    descriptor: &str,
    floor: u32,
    grammar: NameGrammar,
) -> std::result::Result<u32, ScanFailure<'a>> {
    let mut top = floor;
    for entry in listing {
        let entry = entry.as_str();
        let head = entry.split_once(grammar.separator()).map_or(entry, |(head, _)| head);
        if head != descriptor {
            continue;
        }
        let Some((_, slot)) = grammar.split_descriptor(entry) else {
            return Err(ScanFailure { entry, error: GrammarError::Miss("no version slot"), top });
        };
        let version = parse_version_token(slot.split('.').next().unwrap_or_default())
            .map_err(|error| ScanFailure { entry, error, top })?;
        top = top.max(version);
    }
    Ok(top)
}
