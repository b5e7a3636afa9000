//! E2E CLI tests for the guest-list workflow:
//! init -> import -> list/next -> submit -> add/update.
//!
//! Each test runs the `rsvp` binary as a subprocess in an isolated temp
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the rsvp binary, rooted in `dir`.
fn rsvp_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rsvp"));
    cmd.current_dir(dir);
    // Suppress tracing output that goes to stderr
    cmd.env("RSVP_LOG", "error");
    cmd.env_remove("RSVP_FORMAT");
    cmd
}

fn init_project(dir: &Path) {
    rsvp_cmd(dir).args(["init"]).assert().success();
}

fn write_csv(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write csv");
    path.display().to_string()
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = rsvp_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn list_guests(dir: &Path, event: &str) -> Vec<Value> {
    run_json(dir, &["list", "--event", event])
        .as_array()
        .expect("list returns an array")
        .clone()
}

fn groups(guests: &[Value]) -> Vec<i64> {
    guests
        .iter()
        .map(|g| g["group_id"].as_i64().expect("group_id"))
        .collect()
}

const FAMILY_CSV: &str = "Prefix,First Name,Last Name,Plus One,Extends\n\
    Mr,John,Smith,0,\n\
    Mrs,Jane,Smith,1,y\n\
    dr,Lee,Chan,0,n\n";

// ---------------------------------------------------------------------------
// Init & import
// ---------------------------------------------------------------------------

#[test]
fn init_creates_project_directory() {
    let dir = TempDir::new().expect("temp dir");
    rsvp_cmd(dir.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    assert!(dir.path().join(".rsvp/config.toml").is_file());

    rsvp_cmd(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_require_an_initialized_project() {
    let dir = TempDir::new().expect("temp dir");
    let output = rsvp_cmd(dir.path())
        .args(["next", "--event", "1", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error on stderr");
    assert_eq!(err["error"]["error_code"], "E1001");
    assert!(
        err["error"]["suggestion"]
            .as_str()
            .is_some_and(|s| s.contains("rsvp init"))
    );
}

#[test]
fn import_groups_rows_by_extends_flag() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);

    let report = run_json(dir.path(), &["import", "--event", "1", &csv]);
    assert_eq!(report["header_skipped"], true);
    assert_eq!(report["invitations_opened"], 2);

    let guests = list_guests(dir.path(), "1");
    assert_eq!(groups(&guests), vec![1, 1, 2]);
    assert_eq!(guests[0]["prefix"], "Mr.");
    assert_eq!(guests[2]["prefix"], "dr.");
    assert!(guests.iter().all(|g| g["status"] == "not-responded"));

    let next = run_json(dir.path(), &["next", "--event", "1"]);
    assert_eq!(next["next_group_id"], 3);
    let other = run_json(dir.path(), &["next", "--event", "2"]);
    assert_eq!(other["next_group_id"], 1);
}

#[test]
fn import_from_stdin_continues_numbering() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);
    run_json(dir.path(), &["import", "--event", "1", &csv]);

    rsvp_cmd(dir.path())
        .args(["import", "--event", "1", "--header", "absent", "-"])
        .write_stdin(",Ann,Lee,0,\n,Bo,Lee,0,yes\n")
        .assert()
        .success();

    let guests = list_guests(dir.path(), "1");
    assert_eq!(groups(&guests), vec![1, 1, 2, 3, 3]);
}

#[test]
fn import_honors_config_delimiter() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    std::fs::write(
        dir.path().join(".rsvp/config.toml"),
        "[ingest]\nheader = \"absent\"\ndelimiter = \";\"\n",
    )
    .expect("write config");
    let csv = write_csv(dir.path(), "guests.csv", "Ms;Kim;Park;2;\n");

    run_json(dir.path(), &["import", "--event", "4", &csv]);
    let guests = list_guests(dir.path(), "4");
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0]["prefix"], "Ms.");
    assert_eq!(guests[0]["plus_one_count"], 2);
}

#[test]
fn import_rejects_short_rows_and_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "bad.csv", ",Ann,Lee,0,\noops\n");

    let output = rsvp_cmd(dir.path())
        .args(["import", "--event", "1", &csv, "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2003");
    assert!(list_guests(dir.path(), "1").is_empty());
}

// ---------------------------------------------------------------------------
// Submit (reconcile)
// ---------------------------------------------------------------------------

#[test]
fn submit_updates_creates_and_deletes_by_omission() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);
    run_json(dir.path(), &["import", "--event", "1", &csv]);

    let guests = list_guests(dir.path(), "1");
    let john = guests[0]["id"].as_i64().expect("id");

    let payload = format!(
        r#"[{{"id": {john}, "first_name": "Jonathan", "status": "attending"}},
            {{"first_name": "Baby", "last_name": "Smith"}}]"#
    );
    let output = rsvp_cmd(dir.path())
        .args(["submit", "--event", "1", "--json"])
        .write_stdin(payload)
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "submit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let live: Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(live.as_array().map(Vec::len), Some(2));

    let after = list_guests(dir.path(), "1");
    let names: Vec<&str> = after
        .iter()
        .map(|g| g["first_name"].as_str().expect("first_name"))
        .collect();
    assert_eq!(names, vec!["Jonathan", "Baby", "Lee"]);
    assert_eq!(groups(&after), vec![1, 1, 2]);
    assert_eq!(after[0]["status"], "attending");
}

#[test]
fn submit_with_mixed_groups_fails_without_writing() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);
    run_json(dir.path(), &["import", "--event", "1", &csv]);

    let output = rsvp_cmd(dir.path())
        .args(["submit", "--event", "1", "--json"])
        .write_stdin(r#"[{"first_name": "X", "group_id": 1}, {"first_name": "Y", "group_id": "2"}]"#)
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2002");
    assert_eq!(list_guests(dir.path(), "1").len(), 3);
}

#[test]
fn submit_without_event_is_missing_event() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    rsvp_cmd(dir.path())
        .args(["submit"])
        .write_stdin(r#"[{"first_name": "Ann"}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn submit_takes_event_from_first_guest() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    rsvp_cmd(dir.path())
        .args(["submit"])
        .write_stdin(r#"[{"event": 7, "first_name": "Ann"}, {"first_name": "Bo"}]"#)
        .assert()
        .success();
    assert_eq!(groups(&list_guests(dir.path(), "7")), vec![1, 1]);
}

// ---------------------------------------------------------------------------
// Single guests & views
// ---------------------------------------------------------------------------

#[test]
fn add_then_update_one_guest() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    let added = run_json(
        dir.path(),
        &["add", "--event", "2", "--prefix", " mrs ", "--first", "Ann", "--last", "Lee"],
    );
    assert_eq!(added["prefix"], "mrs.");
    assert_eq!(added["group_id"], 1);
    let id = added["id"].as_i64().expect("id").to_string();

    let joined = run_json(dir.path(), &["add", "--event", "2", "--group", "1", "--first", "Bo"]);
    assert_eq!(joined["group_id"], 1);

    let updated = run_json(dir.path(), &["update", &id, "--status", "attending"]);
    assert_eq!(updated["status"], "attending");
    assert_eq!(updated["first_name"], "Ann");

    let output = rsvp_cmd(dir.path())
        .args(["update", "999", "--first", "Nobody", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2004");
}

#[test]
fn public_list_omits_status() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);
    run_json(dir.path(), &["import", "--event", "1", &csv]);

    let public = run_json(dir.path(), &["list", "--event", "1", "--group", "1", "--public"]);
    let public = public.as_array().expect("array");
    assert_eq!(public.len(), 2);
    assert!(public.iter().all(|g| g.get("status").is_none()));
    assert!(public.iter().all(|g| g["event"] == 1));
}

#[test]
fn list_without_event_covers_every_event() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let csv = write_csv(dir.path(), "guests.csv", FAMILY_CSV);
    run_json(dir.path(), &["import", "--event", "1", &csv]);
    run_json(dir.path(), &["import", "--event", "2", &csv]);

    let all = run_json(dir.path(), &["list"]);
    assert_eq!(all.as_array().map(Vec::len), Some(6));

    rsvp_cmd(dir.path())
        .args(["list", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mrs. Jane Smith"));
}
