#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub fn test_config() -> TempDir {
    tempfile::Builder::new()
        .prefix("gvit-config")
        .tempdir()
        .expect("tempdir")
}

pub fn gvit(config_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("gvit");
    cmd.env("GVIT_CONFIG_DIR", config_dir);
    cmd
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn record_path(config_dir: &Path, key: &str) -> PathBuf {
    config_dir.join("envs").join(format!("{key}.toml"))
}

/// Writes a registry record the way gvit itself would, without going
/// through a full provisioning run.
pub fn write_record(config_dir: &Path, key: &str, repo: &Path, backend: &str) {
    let envs = config_dir.join("envs");
    fs::create_dir_all(&envs).expect("envs dir");
    let contents = format!(
        r#"[environment]
name = "{key}"
backend = "{backend}"
path = "{env_path}"
python = "3.11"
created_at = "2026-01-01T00:00:00Z"

[repository]
path = "{repo}"
url = ""

[deps]
base = "requirements.txt"

[deps.installed]
base_hash = "0123456789abcdef"
installed_at = "2026-01-01T00:00:00Z"
"#,
        env_path = repo.join(".venv").display(),
        repo = repo.display(),
    );
    fs::write(envs.join(format!("{key}.toml")), contents).expect("write record");
}

pub fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

pub fn git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Initializes a git repository with committable identity settings.
pub fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "dev@example.com"]);
    git(dir, &["config", "user.name", "dev"]);
}
