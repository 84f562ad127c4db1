use docfind_core::config::loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_full_config_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[index]
dir = "/tmp/docfind-test/index"
queue_capacity = 64
ready_timeout_ms = 250
max_highlights = 20
regex_size_limit = 4096

[logging]
level = "debug"
file_level = "trace"
file = "/tmp/docfind-test/docfind.log"

[[sources]]
type = "script"
root = "/srv/scripts"
extensions = ["js", "meta"]
tags = ["prod"]

[[sources]]
type = "note"
root = "/srv/notes"
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(cfg_path.as_path())).expect("should load");
    assert_eq!(rc.index.dir.display().to_string(), "/tmp/docfind-test/index");
    assert_eq!(rc.index.queue_capacity, 64);
    assert_eq!(rc.index.ready_timeout_ms, 250);
    assert_eq!(rc.index.max_highlights, 20);
    assert_eq!(rc.index.regex_size_limit, 4096);

    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file_level.as_deref(), Some("trace"));
    assert!(rc.logging.file.unwrap().ends_with("docfind.log"));

    assert_eq!(rc.sources.len(), 2);
    assert_eq!(rc.sources[0].content_type, "script");
    assert_eq!(rc.sources[0].extensions, vec!["js", "meta"]);
    assert_eq!(rc.sources[0].tags, vec!["prod"]);
    assert!(rc.sources[1].extensions.is_empty());
}

#[test]
fn load_expands_env_vars_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("docfind/config.toml");
    let root = tmp.path().join("content");
    let toml = format!(
        "version = 1\n[index]\ndir = \"{}/index\"\n[[sources]]\ntype = \"script\"\nroot = \"$DOCFIND_TEST_ROOT\"\n",
        tmp.path().display()
    );
    write_file(&cfg_path, &toml);

    // SAFETY: no other test in this binary reads or writes this variable.
    unsafe { std::env::set_var("DOCFIND_TEST_ROOT", &root) };
    let rc = ConfigLoader::load(Some(cfg_path.as_path())).expect("should load");
    unsafe { std::env::remove_var("DOCFIND_TEST_ROOT") };

    assert_eq!(rc.sources[0].root, root);
    assert_eq!(rc.index.dir, tmp.path().join("index"));
}

#[test]
fn load_minimal_config_uses_defaults_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    write_file(&cfg_path, "version = 1\n");

    let rc = ConfigLoader::load(Some(cfg_path.as_path())).expect("should load");
    assert!(rc.index.dir.ends_with("docfind/index"));
    assert_eq!(rc.index.queue_capacity, 10_000);
    assert!(rc.logging.file.is_none());
    assert!(rc.sources.is_empty());
}
