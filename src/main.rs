use anyhow::{Context, Result};
use kestrel_smart_save::cli::{CliArgs, Command};
use kestrel_smart_save::config::{SmartSaveConfig, SmartSaveOverrides};
use kestrel_smart_save::{FileSystemHost, SceneFile, SceneFileForm, SceneName};
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = match CliArgs::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            process::exit(2);
        }
    };
    if let Err(err) = run(args) {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Parse => cmd_parse(args.target.as_deref().unwrap_or_default()),
        Command::Save | Command::Increment | Command::Next => {
            let mut config = SmartSaveConfig::load_or_default(&args.config_path);
            config.apply_overrides(&args.overrides);
            if !args.overrides.is_empty() {
                log::debug!("[cli] Overrides applied: {}", args.overrides.applied_fields().join(", "));
            }
            let mut host = match args.open.as_deref() {
                Some(path) => FileSystemHost::open(path)
                    .with_context(|| format!("opening scene '{}'", path.display()))?,
                None => FileSystemHost::untitled(),
            };
            let mut scene = SceneFile::from_host(&host, config.scene_fields())?;
            if args.open.is_some() && args.overrides.names_scene() {
                apply_edits(&mut scene, &args.overrides)?;
            }
            match args.command {
                Command::Save => {
                    let path = scene.save(&mut host)?;
                    println!("Saved '{}'", path.display());
                }
                Command::Increment => {
                    let path = scene.increment_and_save(&mut host, config.scan_mode)?;
                    println!("Saved '{}' (version {})", path.display(), scene.version());
                }
                _ => {
                    let listing = scene.existing_names(&host)?;
                    let next = scene.next_version(&listing, config.scan_mode)?;
                    scene.set_version(next)?;
                    println!("{}", scene.path().display());
                }
            }
            Ok(())
        }
    }
}

/// Mirrors a save dialog: the fields start from the opened scene and explicit flags edit them.
fn apply_edits(scene: &mut SceneFile, overrides: &SmartSaveOverrides) -> Result<()> {
    let mut form = SceneFileForm::from(&*scene);
    if let Some(directory) = &overrides.directory {
        form.directory = directory.display().to_string();
    }
    if let Some(descriptor) = &overrides.descriptor {
        form.descriptor = descriptor.clone();
    }
    if let Some(version) = overrides.version {
        form.version = version.to_string();
    }
    if let Some(extension) = &overrides.extension {
        form.extension = extension.clone();
    }
    scene.populate(&form)?;
    Ok(())
}

fn cmd_parse(target: &str) -> Result<()> {
    let (directory, name) =
        SceneName::parse_path(Path::new(target)).with_context(|| format!("parsing '{target}'"))?;
    println!("{:<12} {}", "directory", directory.display());
    println!("{:<12} {}", "descriptor", name.descriptor);
    println!("{:<12} {}", "version", name.version);
    println!("{:<12} {}", "extension", name.extension);
    println!("{:<12} {}", "canonical", name.basename());
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Smart Save

Usage:
  smart_save save [flags]        Save the document as <dir>/<descriptor>_v<version>.<ext>
  smart_save increment [flags]   Save as one past the highest version already in <dir>
  smart_save next [flags]        Print the path `increment` would write, without saving
  smart_save parse <scene>       Show the fields read from a scene filename
  smart_save help                Show this message

Flags:
  --from <scene>        Open an existing scene; its name seeds the fields below
  --dir <path>          Target directory
  --descriptor <name>   Scene descriptor (default: main)
  --version <n>         Scene version (default: 1)
  --ext <ext>           Extension without dot (default: ma)
  --scan <mode>         per_file (default) or legacy_batch
  --config <path>       Config file (default: config/smart_save.json)
"
    );
}
