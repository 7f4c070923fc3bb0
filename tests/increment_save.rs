use kestrel_smart_save::{
    FileSystemHost, HostDocument, ScanMode, SceneFile, SceneFileError, SceneFileFields, SceneHost,
};
use std::fs;
use std::path::Path;

fn seed(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"scene").expect("seed scene file");
    }
}

fn fields(dir: &Path, descriptor: &str, version: u32) -> SceneFileFields {
    SceneFileFields {
        directory: dir.to_path_buf(),
        descriptor: descriptor.to_string(),
        version,
        extension: "ma".to_string(),
    }
}

#[test]
fn increment_and_save_writes_next_free_version() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    seed(temp_dir.path(), &["ship_v001.ma", "ship_v002.ma", "car_v005.ma", "notes.txt"]);

    let mut host = FileSystemHost::with_contents("ship payload");
    let mut scene = SceneFile::new(fields(temp_dir.path(), "ship", 1)).expect("scene");
    let path = scene.increment_and_save(&mut host, ScanMode::PerFile).expect("increment and save");

    assert_eq!(scene.version(), 3);
    assert_eq!(path, temp_dir.path().join("ship_v003.ma"));
    assert_eq!(fs::read(&path).expect("read saved scene"), b"ship payload");
    assert_eq!(host.current_document_path(), Some(path));
    assert!(!host.is_document_modified());
}

#[test]
fn repeated_increments_keep_climbing() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let mut host = FileSystemHost::with_contents("payload");
    let mut scene = SceneFile::new(fields(temp_dir.path(), "shot", 1)).expect("scene");

    scene.save(&mut host).expect("initial save");
    for expected in 2..=4 {
        scene.increment_and_save(&mut host, ScanMode::PerFile).expect("increment");
        assert_eq!(scene.version(), expected);
    }
    let mut names = host.list_directory(temp_dir.path()).expect("list");
    names.sort();
    assert_eq!(names, vec!["shot_v001.ma", "shot_v002.ma", "shot_v003.ma", "shot_v004.ma"]);
}

#[test]
fn save_creates_nested_directories() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let target_dir = temp_dir.path().join("episode01/seq010");
    let mut host = FileSystemHost::with_contents("payload");
    let scene = SceneFile::new(fields(&target_dir, "layout", 1)).expect("scene");

    let path = scene.save(&mut host).expect("save into missing directory");
    assert_eq!(path, target_dir.join("layout_v001.ma"));
    assert!(path.is_file());
}

#[test]
fn clean_document_drives_the_next_save() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    seed(temp_dir.path(), &["robot_v007.ma", "robot_v009.ma"]);

    let mut host = FileSystemHost::open(temp_dir.path().join("robot_v007.ma")).expect("open scene");
    let mut scene = SceneFile::from_host(&host, SceneFileFields::default()).expect("derive from host");
    assert_eq!(scene.descriptor(), "robot");
    assert_eq!(scene.version(), 7);
    assert_eq!(scene.directory(), temp_dir.path());

    let path = scene.increment_and_save(&mut host, ScanMode::PerFile).expect("increment");
    assert_eq!(path, temp_dir.path().join("robot_v010.ma"));
    assert_eq!(fs::read(&path).expect("read"), b"scene");
}

#[test]
fn failed_save_keeps_current_document() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    seed(temp_dir.path(), &["ship_v001.ma"]);
    // A regular file where the target directory should be makes directory creation fail.
    let blocker = temp_dir.path().join("blocked");
    fs::write(&blocker, b"").expect("blocker file");

    let original = temp_dir.path().join("ship_v001.ma");
    let mut host = FileSystemHost::open(&original).expect("open scene");
    let scene = SceneFile::new(fields(&blocker.join("inner"), "ship", 2)).expect("scene");

    let err = scene.save(&mut host).unwrap_err();
    assert!(matches!(err, SceneFileError::SaveFailed { .. }), "{err:?}");
    assert_eq!(host.current_document_path(), Some(original));
}

#[test]
fn legacy_batch_scan_matches_per_file_on_canonical_directories() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    seed(temp_dir.path(), &["ship_v001.ma", "ship_v006.ma", "car_v011.hip"]);
    let host = FileSystemHost::untitled();
    let scene = SceneFile::new(fields(temp_dir.path(), "ship", 1)).expect("scene");

    let listing = scene.existing_names(&host).expect("list");
    let per_file = scene.next_version(&listing, ScanMode::PerFile).expect("per file");
    let batch = scene.next_version(&listing, ScanMode::LegacyBatch).expect("batch");
    assert_eq!(per_file, 7);
    assert_eq!(batch, 7);
}
