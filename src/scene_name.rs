use crate::error::{Result, SceneFileError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator placed between the descriptor and the version number.
pub const VERSION_TOKEN: &str = "_v";
/// Versions are zero-padded to at least this many digits; wider numbers are written in full.
pub const VERSION_WIDTH: usize = 3;

/// The two naming grammars a scene filename can be read with.
///
/// `VersionToken` reads the canonical `ship_v001.ma` form. `Underscore` reads the older
/// `ship_001.ma` form and is only consulted when a name has no usable `_v` structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameGrammar {
    VersionToken,
    Underscore,
}

/// Why a single grammar could not read a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GrammarError {
    /// The name does not have the shape this grammar expects; another grammar may still apply.
    Miss(&'static str),
    /// The shape matched but the version slot is not an integer.
    BadVersion(String),
}

impl GrammarError {
    pub(crate) fn into_scene_error(self, name: &str) -> SceneFileError {
        match self {
            GrammarError::Miss(reason) => SceneFileError::malformed(name, reason),
            GrammarError::BadVersion(token) => {
                SceneFileError::malformed(name, format!("version token '{token}' is not an integer"))
            }
        }
    }
}

impl NameGrammar {
    pub fn separator(self) -> &'static str {
        match self {
            NameGrammar::VersionToken => VERSION_TOKEN,
            NameGrammar::Underscore => "_",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NameGrammar::VersionToken => "descriptor_v###.ext",
            NameGrammar::Underscore => "descriptor_###.ext",
        }
    }

    /// Splits `name` into its descriptor and the raw text of the version slot.
    ///
    /// This is all the directory scan needs: extensions are never compared there.
    pub(crate) fn split_descriptor(self, name: &str) -> Option<(&str, &str)> {
        let separator = self.separator();
        let (descriptor, rest) = name.split_once(separator)?;
        let slot = rest.split_once(separator).map_or(rest, |(head, _)| head);
        Some((descriptor, slot))
    }

    pub(crate) fn apply(self, name: &str) -> std::result::Result<SceneName, GrammarError> {
        let Some((descriptor, slot)) = self.split_descriptor(name) else {
            return Err(GrammarError::Miss(match self {
                NameGrammar::VersionToken => "no '_v' version token",
                NameGrammar::Underscore => "no '_' version separator",
            }));
        };
        let mut pieces = slot.split('.');
        let version = parse_version_token(pieces.next().unwrap_or_default())?;
        let Some(extension) = pieces.next() else {
            return Err(GrammarError::Miss("no '.' before the extension"));
        };
        Ok(SceneName { descriptor: descriptor.to_string(), version, extension: extension.to_string() })
    }
}

pub(crate) fn parse_version_token(token: &str) -> std::result::Result<u32, GrammarError> {
    token.trim().parse::<u32>().map_err(|_| GrammarError::BadVersion(token.to_string()))
}

/// The filename part of a versioned scene: `{descriptor}_v{version:03}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneName {
    pub descriptor: String,
    pub version: u32,
    pub extension: String,
}

impl SceneName {
    pub fn new(descriptor: impl Into<String>, version: u32, extension: impl Into<String>) -> Self {
        Self { descriptor: descriptor.into(), version, extension: extension.into() }
    }

    /// Reads a bare filename, trying the `_v` grammar first and the `_` grammar only when the
    /// first one cannot find the expected structure.
    pub fn parse(name: &str) -> Result<Self> {
        let parsed = match NameGrammar::VersionToken.apply(name) {
            Ok(parsed) => parsed,
            Err(GrammarError::Miss(_)) => {
                NameGrammar::Underscore.apply(name).map_err(|err| err.into_scene_error(name))?
            }
            Err(err) => return Err(err.into_scene_error(name)),
        };
        if parsed.descriptor.is_empty() {
            return Err(SceneFileError::malformed(name, "descriptor is empty"));
        }
        if parsed.extension.is_empty() {
            return Err(SceneFileError::malformed(name, "extension is empty"));
        }
        Ok(parsed)
    }

    /// Splits a full path into its parent directory and parsed filename.
    pub fn parse_path(path: &Path) -> Result<(PathBuf, Self)> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SceneFileError::malformed(&path.display().to_string(), "path has no filename"))?;
        let name = Self::parse(file_name)?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((directory, name))
    }

    pub fn basename(&self) -> String {
        self.to_string()
    }

    pub fn validate(&self) -> Result<()> {
        validate_descriptor(&self.descriptor)?;
        validate_version(self.version)?;
        validate_extension(&self.extension)
    }
}

impl fmt::Display for SceneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:0width$}.{}",
            self.descriptor,
            VERSION_TOKEN,
            self.version,
            self.extension,
            width = VERSION_WIDTH
        )
    }
}

pub fn validate_descriptor(descriptor: &str) -> Result<()> {
    if descriptor.is_empty() {
        return Err(SceneFileError::invalid("descriptor", "must not be empty"));
    }
    if descriptor.contains(VERSION_TOKEN) {
        return Err(SceneFileError::invalid(
            "descriptor",
            format!("'{descriptor}' contains the '{VERSION_TOKEN}' version token"),
        ));
    }
    if let Some(ch) = descriptor.chars().find(|&ch| matches!(ch, '.' | '/' | '\\') || ch.is_control()) {
        return Err(SceneFileError::invalid("descriptor", format!("'{descriptor}' contains {ch:?}")));
    }
    Ok(())
}

pub fn validate_version(version: u32) -> Result<()> {
    if version == 0 {
        return Err(SceneFileError::invalid("version", "must be at least 1"));
    }
    Ok(())
}

pub fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() {
        return Err(SceneFileError::invalid("extension", "must not be empty"));
    }
    if !extension.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(SceneFileError::invalid(
            "extension",
            format!("'{extension}' must only contain ASCII letters and digits"),
        ));
    }
    Ok(())
}
