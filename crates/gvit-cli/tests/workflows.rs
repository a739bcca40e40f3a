use std::fs;
use std::path::Path;

mod common;

use common::{git, git_available, gvit, init_repo, parse_json, test_config};

fn write_untracked_record(config_dir: &Path, key: &str, repo: &Path) {
    let envs = config_dir.join("envs");
    fs::create_dir_all(&envs).expect("envs dir");
    let contents = format!(
        r#"[environment]
name = "{key}"
backend = "venv"
path = "{env_path}"
python = "3.11"
created_at = "2026-01-01T00:00:00Z"

[repository]
path = "{repo}"
url = ""

[deps]
base = "requirements.txt"
"#,
        env_path = repo.join(".venv").display(),
        repo = repo.display(),
    );
    fs::write(envs.join(format!("{key}.toml")), contents).expect("write record");
}

/// Creates an origin repository with one commit and a working clone of it.
fn origin_and_clone(parent: &Path, with_requirements: bool) -> std::path::PathBuf {
    let origin = parent.join("origin");
    fs::create_dir_all(&origin).expect("mkdir");
    init_repo(&origin);
    fs::write(origin.join("README.md"), "# demo\n").expect("write");
    if with_requirements {
        fs::write(origin.join("requirements.txt"), "foo==1.0\n").expect("write");
    }
    git(&origin, &["add", "."]);
    git(&origin, &["commit", "-q", "-m", "initial"]);

    let work = parent.join("work");
    git(
        parent,
        &[
            "clone",
            "-q",
            origin.to_str().unwrap(),
            work.to_str().unwrap(),
        ],
    );
    work.canonicalize().expect("canonicalize")
}

#[test]
fn pull_without_tracked_environment_still_pulls() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let work = origin_and_clone(parent.path(), false);

    let assert = gvit(config.path())
        .args(["--json", "pull", work.to_str().unwrap()])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["tracked"], false);
}

#[test]
fn pull_reports_up_to_date_when_nothing_is_tracked_or_present() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let work = origin_and_clone(parent.path(), false);
    // tracked group whose file neither exists nor was ever fingerprinted:
    // excluded from the drift comparison
    write_untracked_record(config.path(), "work", &work);

    let assert = gvit(config.path())
        .args(["--json", "pull", work.to_str().unwrap()])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["tracked"], true);
    assert!(payload["message"].as_str().unwrap().contains("up to date"));
}

#[test]
fn pull_reinstalls_drifted_groups_and_drops_failed_ones() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let work = origin_and_clone(parent.path(), true);
    // stored fingerprint cannot match the cloned requirements.txt
    common::write_record(config.path(), "work", &work, "venv");

    let assert = gvit(config.path())
        .args(["--json", "pull", work.to_str().unwrap()])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let drift: Vec<&str> = payload["details"]["drift"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|value| value.as_str())
        .collect();
    assert_eq!(drift, vec!["base"]);
    // the reinstall went through a .venv that does not exist, so the group
    // failed and must be dropped from the re-saved record
    assert_eq!(payload["details"]["groups"]["base"], false);

    let assert = gvit(config.path())
        .args(["--json", "envs", "show", "work"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert!(payload["details"]["deps"].get("base").is_none());
}

#[test]
fn pull_no_deps_skips_the_dependency_check() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let work = origin_and_clone(parent.path(), true);
    common::write_record(config.path(), "work", &work, "venv");

    let assert = gvit(config.path())
        .args(["--json", "pull", work.to_str().unwrap(), "--no-deps"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["checked"], false);
}

#[test]
fn commit_drift_gate_fails_closed_outside_a_tty() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let repo = parent.path().join("repo");
    fs::create_dir_all(&repo).expect("mkdir");
    init_repo(&repo);
    fs::write(repo.join("requirements.txt"), "foo==2.0\n").expect("write");
    let repo = repo.canonicalize().expect("canonicalize");
    common::write_record(config.path(), "repo", &repo, "venv");

    let assert = gvit(config.path())
        .args(["--json", "commit", "-t", repo.to_str().unwrap()])
        .assert()
        .code(1);
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "user-error");
    assert!(payload["message"].as_str().unwrap().contains("drift"));
}

#[test]
fn commit_skip_validation_delegates_to_git() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let repo = parent.path().join("repo");
    fs::create_dir_all(&repo).expect("mkdir");
    init_repo(&repo);
    fs::write(repo.join("README.md"), "# demo\n").expect("write");
    git(&repo, &["add", "."]);

    gvit(config.path())
        .args([
            "commit",
            "-t",
            repo.to_str().unwrap(),
            "--skip-validation",
            "--",
            "-q",
            "-m",
            "initial",
        ])
        .assert()
        .success();
}

#[test]
fn commit_with_nothing_staged_surfaces_gits_failure() {
    if !git_available() {
        eprintln!("skipping workflow test (git not found)");
        return;
    }
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let repo = parent.path().join("repo");
    fs::create_dir_all(&repo).expect("mkdir");
    init_repo(&repo);

    gvit(config.path())
        .args([
            "commit",
            "-t",
            repo.to_str().unwrap(),
            "--skip-validation",
            "--",
            "-m",
            "empty",
        ])
        .assert()
        .code(1);
}
