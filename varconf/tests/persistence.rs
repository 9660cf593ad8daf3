//! File handling of the root controller.

use std::fs;

use varconf::{
    Config, ConfigOptions, Error,
    variable::{Container, IntVar, StringVar, Variable},
};

struct Small {
    name: StringVar,
    count: IntVar,
}

impl Small {
    fn new() -> Self {
        Self {
            name: StringVar::new("name", "small".to_string()),
            count: IntVar::new("count", 3),
        }
    }
}

impl Container for Small {
    fn variables(&self) -> Vec<&dyn Variable> {
        vec![&self.name, &self.count]
    }

    fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
        vec![&mut self.name, &mut self.count]
    }
}

fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[test]
fn test_missing_file_is_created() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = create_temp_dir();
    let path = dir.path().join("nested").join("dir").join("config.json");

    let mut config = Config::new(&path, Small::new()).unwrap();
    config.load().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\n\t\"name\": \"small\",\n\t\"count\": 3\n}\n"
    );
}

#[test]
fn test_missing_file_left_alone() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");

    let mut config = Config::new(&path, Small::new())
        .unwrap()
        .create_if_missing(false);
    config.load().unwrap();
    assert!(!path.exists());
    assert_eq!(config.count.get(), Some(3));
}

#[test]
fn test_blank_file_keeps_defaults() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");
    fs::write(&path, "\n").unwrap();

    let mut config = Config::new(&path, Small::new()).unwrap();
    config.load().unwrap();
    assert_eq!(config.name.get().as_deref(), Some("small"));
}

#[test]
fn test_invalid_json_reports_path() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");
    fs::write(&path, "{\"name\": ").unwrap();

    let mut config = Config::new(&path, Small::new()).unwrap();
    match config.load() {
        Err(Error::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_non_object_document() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");
    fs::write(&path, "42").unwrap();

    let mut config = Config::new(&path, Small::new()).unwrap();
    let err = config.load().unwrap_err();
    assert!(matches!(err, Error::NotAnObject { found: "number" }));
}

#[test]
fn test_backup_before_overwrite() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"count": 7}"#).unwrap();

    let mut config = Config::new(&path, Small::new()).unwrap().with_backup(true);
    config.load().unwrap();
    config.count.set(8);
    assert!(config.is_dirty());
    config.save().unwrap();
    assert!(!config.is_dirty());

    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("config.bk-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].ends_with(".json"));
    let previous = fs::read_to_string(dir.path().join(&backups[0])).unwrap();
    assert_eq!(previous, r#"{"count": 7}"#);
}

#[test]
fn test_options_from_json() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.json");
    let options: ConfigOptions = serde_json::from_str(r#"{"indent": ""}"#).unwrap();

    let mut config = Config::with_options(&path, Small::new(), options).unwrap();
    config.save().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"name":"small","count":3}"#
    );
}
