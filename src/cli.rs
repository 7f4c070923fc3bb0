use crate::config::{SmartSaveOverrides, DEFAULT_CONFIG_PATH};
use crate::scene_file::ScanMode;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Increment,
    Next,
    Parse,
    Help,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "save" => Some(Command::Save),
            "increment" => Some(Command::Increment),
            "next" => Some(Command::Next),
            "parse" => Some(Command::Parse),
            "help" | "--help" | "-h" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub overrides: SmartSaveOverrides,
    pub config_path: PathBuf,
    /// Existing scene opened as the clean current document.
    pub open: Option<PathBuf>,
    /// Filename handed to `parse`.
    pub target: Option<String>,
}

impl CliArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        let mut parsed = CliArgs {
            command: Command::Help,
            overrides: SmartSaveOverrides::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            open: None,
            target: None,
        };
        let Some(raw_command) = iter.next() else {
            return Ok(parsed);
        };
        let command = raw_command.as_ref();
        parsed.command = Command::from_arg(command).ok_or_else(|| {
            anyhow!("Unknown command '{command}'. Use save, increment, next, parse or help.")
        })?;

        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                if parsed.command == Command::Parse && parsed.target.is_none() {
                    parsed.target = Some(flag.to_string());
                    continue;
                }
                bail!("Unexpected argument '{flag}'. Flags take the form --name <value>.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "dir" => parsed.overrides.directory = Some(PathBuf::from(value)),
                "descriptor" => parsed.overrides.descriptor = Some(value),
                "version" => {
                    parsed.overrides.version =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid version '{value}'"))?);
                }
                "ext" => parsed.overrides.extension = Some(value),
                "scan" => {
                    parsed.overrides.scan_mode = Some(ScanMode::from_label(&value).ok_or_else(|| {
                        anyhow!("Invalid scan mode '{value}'. Use per_file or legacy_batch.")
                    })?);
                }
                "config" => parsed.config_path = PathBuf::from(value),
                "from" => parsed.open = Some(PathBuf::from(value)),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --dir, --descriptor, --version, --ext, --scan, --config, --from."
                ),
            }
        }
        if parsed.command == Command::Parse && parsed.target.is_none() {
            bail!("parse requires a filename: smart_save parse <scene>");
        }
        Ok(parsed)
    }
}
