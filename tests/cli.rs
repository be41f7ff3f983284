//! End-to-end tests driving the `invoke-presets` binary against a throwaway
//! InvokeAI directory.

use assert_cmd::Command;
use predicates::prelude::*;
use presets::storage::schema::apply_schema;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let sandbox = Self { dir };
        std::fs::create_dir_all(sandbox.home()).unwrap();
        std::fs::create_dir_all(sandbox.db_path().parent().unwrap()).unwrap();
        let conn = Connection::open(sandbox.db_path()).unwrap();
        apply_schema(&conn).unwrap();
        sandbox
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    fn invoke_dir(&self) -> PathBuf {
        self.dir.path().join("invokeai")
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.dir.path().join("snapshots")
    }

    fn db_path(&self) -> PathBuf {
        self.invoke_dir().join("databases").join("invokeai.db")
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn preset_count(&self) -> i64 {
        let conn = Connection::open(self.db_path()).unwrap();
        conn.query_row("SELECT COUNT(*) FROM style_presets", [], |r| r.get(0))
            .unwrap()
    }

    /// Binary with an isolated HOME and no inherited configuration.
    fn bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("invoke-presets").unwrap();
        cmd.env("HOME", self.home())
            .env_remove("INVOKE_AI_DIR")
            .env_remove("SNAPSHOTS")
            .env_remove("INVOKE_PRESETS_CONFIG")
            .env_remove("INVOKE_PRESETS_SNAPSHOTS_DIR")
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path())
            .write_stdin("");
        cmd
    }

    fn cmd(&self) -> Command {
        let mut cmd = self.bare();
        cmd.arg("--invoke-dir")
            .arg(self.invoke_dir())
            .arg("--snapshots-dir")
            .arg(self.snapshots_dir())
            .arg("--max-snapshots")
            .arg("3");
        cmd
    }

    fn import(&self, file: &Path) {
        self.cmd()
            .args(["import", "--update", "all", "--file"])
            .arg(file)
            .assert()
            .success();
    }

    fn snapshot_names(&self) -> Vec<String> {
        let output = self
            .cmd()
            .args(["--json", "database", "list-snapshots"])
            .output()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        value["snapshots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    }
}

const PRESETS: &str = r#"[
  {"name": "Anime", "prompt": "anime artwork of {prompt}", "negative_prompt": "photo"},
  {"name": "Cinematic", "type": "user", "preset_data": {"positive_prompt": "cinematic still of {prompt}", "negative_prompt": "cartoon"}},
  {"prompt": "nameless"}
]"#;

#[test]
fn unknown_command_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn invalid_option_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["list", "--bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn list_empty_table() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No presets found for user"));
}

#[test]
fn about_version() {
    let sandbox = Sandbox::new();
    sandbox
        .bare()
        .args(["about", "--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Invoke Presets CLI version: {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn create_and_list_snapshots() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["database", "create-snapshot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot created"));

    sandbox
        .cmd()
        .args(["database", "list-snapshots"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database Snapshots"))
        .stdout(predicate::str::is_match(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap());
}

#[test]
fn retention_keeps_newest_snapshots() {
    let sandbox = Sandbox::new();
    for _ in 0..4 {
        sandbox
            .cmd()
            .args(["database", "create-snapshot"])
            .assert()
            .success();
    }
    assert_eq!(sandbox.snapshot_names().len(), 3);
}

#[test]
fn import_then_list() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("presets.json", PRESETS);

    sandbox
        .cmd()
        .args(["import", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping invalid preset: Unknown"))
        .stdout(predicate::str::contains(
            "Created 2 new presets and updated 0 existing presets",
        ));

    assert_eq!(sandbox.preset_count(), 2);
    assert_eq!(sandbox.snapshot_names().len(), 1);

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available presets"))
        .stdout(predicate::str::contains("Cinematic"))
        .stdout(predicate::str::contains("Page 1 of 1"));
}

#[test]
fn import_project_presets() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("presets.json", PRESETS);

    sandbox
        .cmd()
        .args(["import", "--project", "--file"])
        .arg(&file)
        .assert()
        .success();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("No presets found for user"));
    sandbox
        .cmd()
        .args(["list", "--projects"])
        .assert()
        .stdout(predicate::str::contains("Anime"));
}

#[test]
fn import_invalid_document() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("bad.json", r#"{"name": "Anime"}"#);

    sandbox
        .cmd()
        .args(["import", "--file"])
        .arg(&file)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Expected a list of presets"));
    assert!(sandbox.snapshot_names().is_empty());
}

#[test]
fn export_all() {
    let sandbox = Sandbox::new();
    sandbox.import(&sandbox.write("presets.json", PRESETS));

    sandbox
        .cmd()
        .args(["export", "--all", "--output", "backup"])
        .assert()
        .success();

    let exported = std::fs::read_to_string(sandbox.dir.path().join("backup.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["preset_data"]["positive_prompt"], "anime artwork of {prompt}");
}

#[test]
fn delete_from_file() {
    let sandbox = Sandbox::new();
    sandbox.import(&sandbox.write("presets.json", PRESETS));
    let names = sandbox.write("names.json", r#"["Anime", "Ghost"]"#);

    sandbox
        .cmd()
        .args(["--dry-run", "delete", "--from-file"])
        .arg(&names)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would delete 1 presets"));
    assert_eq!(sandbox.preset_count(), 2);

    sandbox
        .cmd()
        .args(["--yes", "delete", "--from-file"])
        .arg(&names)
        .assert()
        .success()
        .stdout(predicate::str::contains("Preset not found: Ghost"))
        .stdout(predicate::str::contains("Successfully deleted 1 presets."));
    assert_eq!(sandbox.preset_count(), 1);
}

#[test]
fn delete_cancelled_without_confirmation() {
    let sandbox = Sandbox::new();
    sandbox.import(&sandbox.write("presets.json", PRESETS));
    let names = sandbox.write("names.json", r#"["Anime"]"#);

    sandbox
        .cmd()
        .args(["delete", "--from-file"])
        .arg(&names)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deletion cancelled."));
    assert_eq!(sandbox.preset_count(), 2);
}

#[test]
fn restore_snapshot_by_name() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .args(["--json", "database", "create-snapshot"])
        .output()
        .unwrap();
    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let name = created["record"]["name"].as_str().unwrap().to_string();

    sandbox.import(&sandbox.write("presets.json", PRESETS));
    assert_eq!(sandbox.preset_count(), 2);

    sandbox
        .cmd()
        .args(["--yes", "database", "restore-snapshot", &name])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database restored"));

    assert_eq!(sandbox.preset_count(), 0);
    assert!(!sandbox.invoke_dir().join("databases").join("invokeai.db.backup").exists());
}

#[test]
fn restore_unknown_snapshot() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--json", "--yes", "database", "restore-snapshot", "ghost.db"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SNAPSHOT_NOT_FOUND"));
}

#[test]
fn delete_unknown_snapshot_is_not_an_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--yes", "database", "delete-snapshot", "ghost.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot not found: ghost.db"));
}

#[test]
fn missing_database() {
    let sandbox = Sandbox::new();
    std::fs::remove_file(sandbox.db_path()).unwrap();
    sandbox
        .cmd()
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Database not found"));
}

#[test]
fn missing_config_is_reported() {
    let sandbox = Sandbox::new();
    sandbox
        .bare()
        .arg("list")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn config_file_is_used() {
    let sandbox = Sandbox::new();
    let config = sandbox.home().join(".config").join("invoke-presets");
    std::fs::create_dir_all(&config).unwrap();
    std::fs::write(
        config.join("config.json"),
        serde_json::json!({
            "invoke_ai_dir": sandbox.invoke_dir(),
            "max_snapshots": 2,
            "snapshots_dir": sandbox.snapshots_dir(),
        })
        .to_string(),
    )
    .unwrap();

    sandbox
        .bare()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No presets found for user"));
}
