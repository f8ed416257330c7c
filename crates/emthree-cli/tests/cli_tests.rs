//! Smoke tests that drive the built `emthree` binary.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Isolated config home whose registry URL is never reachable.
struct TestContext {
    temp_dir: TempDir,
    home: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let home = temp_dir.path().join("config");
        std::fs::create_dir_all(&home).expect("failed to create config home");

        let config = format!(
            "mod_dir = {:?}\ndata_dir = {:?}\napi_url = \"http://127.0.0.1:9/v2/\"\nsite_url = \"http://127.0.0.1:9\"\n",
            temp_dir.path().join("mods"),
            temp_dir.path().join("data"),
        );
        std::fs::write(home.join("config.toml"), config).expect("failed to write config");

        Self { temp_dir, home }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_emthree"));
        cmd.env("EMTHREE_HOME", &self.home);
        cmd.env_remove("EMTHREE_GAME_VERSION");
        cmd.env_remove("EMTHREE_LOADER");
        cmd
    }

    fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("data").join("modlist.json")
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.cmd().arg("--help").output().expect("failed to run emthree");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("init"));
    assert!(stdout.contains("add"));
    assert!(stdout.contains("list"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .arg("--version")
        .output()
        .expect("failed to run emthree");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_without_manifest() {
    let ctx = TestContext::new();
    let output = ctx.cmd().arg("list").output().expect("failed to run emthree");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No mods in the manifest"));
}

#[test]
fn test_list_with_manifest() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.manifest_path().parent().unwrap()).unwrap();
    std::fs::write(
        ctx.manifest_path(),
        r#"[{"name": "sodium", "project_id": "AANobbMI", "version": "0.6.0",
             "version_id": "abc", "file": "sodium.jar", "dependencies": []}]"#,
    )
    .unwrap();

    let output = ctx.cmd().arg("list").output().expect("failed to run emthree");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sodium"));
    assert!(stdout.contains("NOT INSTALLED"));
}

#[test]
fn test_init_rejects_invalid_list() {
    let ctx = TestContext::new();
    let list = ctx.temp_dir.path().join("mods.txt");
    std::fs::write(&list, "sodium\nbad name\n").unwrap();

    let output = ctx
        .cmd()
        .args(["init", "--yes", "--userlist"])
        .arg(&list)
        .output()
        .expect("failed to run emthree");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(!ctx.manifest_path().exists());
}

#[test]
fn test_init_without_list_or_manifest() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["init", "--yes"])
        .output()
        .expect("failed to run emthree");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No package list"));
}

#[test]
fn test_bad_config_is_reported() {
    let ctx = TestContext::new();
    std::fs::write(ctx.home.join("config.toml"), "workers = 0\n").unwrap();

    let output = ctx.cmd().arg("list").output().expect("failed to run emthree");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("workers"));
}
