use crate::scene_file::{ScanMode, SceneFileFields};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/smart_save.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SmartSaveConfig {
    #[serde(default)]
    pub defaults: SceneFileFields,
    #[serde(default)]
    pub scan_mode: ScanMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartSaveOverrides {
    pub directory: Option<PathBuf>,
    pub descriptor: Option<String>,
    pub version: Option<u32>,
    pub extension: Option<String>,
    pub scan_mode: Option<ScanMode>,
}

impl SmartSaveConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("[config] {} not found; using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SmartSaveOverrides) {
        if let Some(directory) = &overrides.directory {
            self.defaults.directory = directory.clone();
        }
        if let Some(descriptor) = &overrides.descriptor {
            self.defaults.descriptor = descriptor.clone();
        }
        if let Some(version) = overrides.version {
            self.defaults.version = version;
        }
        if let Some(extension) = &overrides.extension {
            self.defaults.extension = extension.clone();
        }
        if let Some(scan_mode) = overrides.scan_mode {
            self.scan_mode = scan_mode;
        }
    }

    pub fn scene_fields(&self) -> SceneFileFields {
        self.defaults.clone()
    }
}

impl SmartSaveOverrides {
    pub fn is_empty(&self) -> bool {
        self.directory.is_none()
            && self.descriptor.is_none()
            && self.version.is_none()
            && self.extension.is_none()
            && self.scan_mode.is_none()
    }

    /// `true` when any scene field (not just the scan mode) was given explicitly.
    pub fn names_scene(&self) -> bool {
        self.directory.is_some() || self.descriptor.is_some() || self.version.is_some() || self.extension.is_some()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.directory.is_some() {
            fields.push("dir");
        }
        if self.descriptor.is_some() {
            fields.push("descriptor");
        }
        if self.version.is_some() {
            fields.push("version");
        }
        if self.extension.is_some() {
            fields.push("ext");
        }
        if self.scan_mode.is_some() {
            fields.push("scan");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: SmartSaveConfig = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(cfg.scan_mode, ScanMode::PerFile);
        assert_eq!(cfg.scene_fields(), SceneFileFields::default());
    }

    #[test]
    fn loads_partial_defaults_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("smart_save.json");
        fs::write(&path, r#"{ "defaults": { "extension": "hip" }, "scan_mode": "legacy_batch" }"#)
            .expect("write config");
        let cfg = SmartSaveConfig::load(&path).expect("load config");
        assert_eq!(cfg.defaults.extension, "hip");
        assert_eq!(cfg.defaults.descriptor, "main");
        assert_eq!(cfg.scan_mode, ScanMode::LegacyBatch);
    }

    #[test]
    fn defaults_build_a_scene_file() {
        let cfg: SmartSaveConfig =
            serde_json::from_str(r#"{ "defaults": { "directory": "shots/010", "descriptor": "layout", "extension": ".mb" } }"#)
                .expect("parse config");
        let scene = crate::scene_file::SceneFile::new(cfg.scene_fields()).expect("scene from defaults");
        assert_eq!(scene.path(), PathBuf::from("shots/010/layout_v001.mb"));
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("smart_save.json");
        fs::write(&path, "{ not json").expect("write config");
        assert!(SmartSaveConfig::load(&path).is_err());
        let cfg = SmartSaveConfig::load_or_default(&path);
        assert_eq!(cfg.defaults.version, 1);
    }

    #[test]
    fn overrides_replace_selected_fields() {
        let mut cfg = SmartSaveConfig::default();
        let overrides = SmartSaveOverrides {
            descriptor: Some("ship".to_string()),
            version: Some(4),
            scan_mode: Some(ScanMode::LegacyBatch),
            ..SmartSaveOverrides::default()
        };
        cfg.apply_overrides(&overrides);
        let fields = cfg.scene_fields();
        assert_eq!(fields.descriptor, "ship");
        assert_eq!(fields.version, 4);
        assert_eq!(fields.extension, "ma");
        assert_eq!(cfg.scan_mode, ScanMode::LegacyBatch);
        assert_eq!(overrides.applied_fields(), vec!["descriptor", "version", "scan"]);
        assert!(overrides.names_scene());
        assert!(SmartSaveOverrides::default().is_empty());
    }
}
