use std::fs;

mod common;

use common::{gvit, parse_json, record_path, test_config, write_record};

#[test]
fn list_reports_empty_registry() {
    let config = test_config();
    let assert = gvit(config.path())
        .args(["--json", "envs", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["environments"].as_array().unwrap().len(), 0);
}

#[test]
fn list_shows_tracked_environments() {
    let config = test_config();
    let repo = tempfile::tempdir().expect("tempdir");
    write_record(config.path(), "demo", repo.path(), "venv");

    let assert = gvit(config.path())
        .args(["--json", "envs", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let environments = payload["details"]["environments"].as_array().unwrap();
    assert_eq!(environments.len(), 1);
    assert_eq!(environments[0]["name"], "demo");
    assert_eq!(environments[0]["backend"], "venv");
    assert!(environments[0]["activation_command"]
        .as_str()
        .unwrap()
        .contains("activate"));
}

#[test]
fn corrupt_record_is_skipped_by_list_but_fails_show() {
    let config = test_config();
    let repo = tempfile::tempdir().expect("tempdir");
    write_record(config.path(), "demo", repo.path(), "venv");
    let envs = config.path().join("envs");
    fs::write(envs.join("broken.toml"), "not [valid\ntoml").expect("write");

    let assert = gvit(config.path())
        .args(["--json", "envs", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["environments"].as_array().unwrap().len(), 1);
    let skipped = payload["details"]["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["name"], "broken");

    gvit(config.path())
        .args(["envs", "show", "broken"])
        .assert()
        .code(1);
}

#[test]
fn show_prints_the_record_file() {
    let config = test_config();
    let repo = tempfile::tempdir().expect("tempdir");
    write_record(config.path(), "demo", repo.path(), "venv");

    let assert = gvit(config.path())
        .args(["--json", "envs", "show", "demo"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["name"], "demo");
    assert!(payload["message"].as_str().unwrap().contains("[environment]"));
}

#[test]
fn show_unknown_environment_is_a_user_error() {
    let config = test_config();
    gvit(config.path())
        .args(["envs", "show", "ghost"])
        .assert()
        .code(1);
}

#[test]
fn delete_unknown_environment_is_a_user_error() {
    let config = test_config();
    gvit(config.path())
        .args(["envs", "delete", "ghost"])
        .assert()
        .code(1);
}

#[test]
fn delete_removes_registry_entry_when_backend_is_gone() {
    let config = test_config();
    let repo = tempfile::tempdir().expect("tempdir");
    // the record points at a .venv that never existed; only the registry
    // entry should need removing
    write_record(config.path(), "demo", repo.path(), "venv");

    gvit(config.path())
        .args(["envs", "delete", "demo"])
        .assert()
        .success();
    assert!(!record_path(config.path(), "demo").exists());
}

#[test]
fn prune_dry_run_deletes_nothing() {
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let gone = parent.path().join("deleted-checkout");
    fs::create_dir_all(&gone).expect("mkdir");
    write_record(config.path(), "orphan", &gone, "venv");
    fs::remove_dir_all(&gone).expect("rmdir");

    let assert = gvit(config.path())
        .args(["--json", "envs", "prune", "--dry-run"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let orphaned = payload["details"]["orphaned"].as_array().unwrap();
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0]["name"], "orphan");
    // zero deletions: the record must survive the dry run
    assert!(record_path(config.path(), "orphan").exists());

    let assert = gvit(config.path())
        .args(["--json", "envs", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["environments"].as_array().unwrap().len(), 1);
}

#[test]
fn prune_without_confirmation_fails_closed() {
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let gone = parent.path().join("deleted-checkout");
    fs::create_dir_all(&gone).expect("mkdir");
    write_record(config.path(), "orphan", &gone, "venv");
    fs::remove_dir_all(&gone).expect("rmdir");

    // stdin is not a tty here, so the confirmation must abort
    gvit(config.path())
        .args(["envs", "prune"])
        .assert()
        .code(1);
    assert!(record_path(config.path(), "orphan").exists());
}

#[test]
fn prune_yes_removes_orphaned_records() {
    let config = test_config();
    let parent = tempfile::tempdir().expect("tempdir");
    let gone = parent.path().join("deleted-checkout");
    fs::create_dir_all(&gone).expect("mkdir");
    write_record(config.path(), "orphan", &gone, "venv");
    fs::remove_dir_all(&gone).expect("rmdir");
    let alive = tempfile::tempdir().expect("tempdir");
    write_record(config.path(), "alive", alive.path(), "venv");

    let assert = gvit(config.path())
        .args(["--json", "envs", "prune", "--yes"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["pruned"].as_array().unwrap().len(), 1);
    assert!(!record_path(config.path(), "orphan").exists());
    assert!(record_path(config.path(), "alive").exists());
}

#[test]
fn prune_reports_clean_registry() {
    let config = test_config();
    let repo = tempfile::tempdir().expect("tempdir");
    write_record(config.path(), "alive", repo.path(), "venv");

    let assert = gvit(config.path())
        .args(["--json", "envs", "prune"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["orphaned"].as_array().unwrap().len(), 0);
}
