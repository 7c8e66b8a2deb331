//! Integration tests for the `schoolbus` CLI binary.
//!
//! Every test runs against an isolated HOME and a throwaway dataset file,
//! which starts out as the built-in demo data.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn dataset(&self) -> PathBuf {
        self.dir.path().join("dataset.json")
    }

    /// `schoolbus` with env isolation, without a dataset flag.
    fn bare(&self) -> assert_cmd::Command {
        let home = self.dir.path();
        let mut cmd = cargo_bin_cmd!("schoolbus");
        cmd.env("HOME", home)
            .env("XDG_CONFIG_HOME", home.join("config"))
            .env("XDG_DATA_HOME", home.join("data"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("SCHOOLBUS_CONFIG")
            .env_remove("SCHOOLBUS_PROFILE")
            .env_remove("SCHOOLBUS_DEFAULT_PROFILE")
            .env_remove("SCHOOLBUS_API_URL")
            .env_remove("SCHOOLBUS_API_TOKEN")
            .env_remove("SCHOOLBUS_DATA")
            .env_remove("SCHOOLBUS_OUTPUT")
            .env_remove("SCHOOLBUS_INSECURE")
            .env_remove("SCHOOLBUS_TIMEOUT")
            .env_remove("SCHOOLBUS_PER_PAGE");
        cmd
    }

    /// `schoolbus --data <sandbox>/dataset.json`.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = self.bare();
        cmd.arg("--data").arg(self.dataset());
        cmd
    }
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let sandbox = Sandbox::new();
    let output = sandbox.bare().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        stdout_of(&output),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_entity_pages() {
    Sandbox::new().bare().arg("--help").assert().success().stdout(
        predicate::str::contains("buses")
            .and(predicate::str::contains("parents"))
            .and(predicate::str::contains("students"))
            .and(predicate::str::contains("establishments"))
            .and(predicate::str::contains("trips")),
    );
}

#[test]
fn completions_zsh() {
    Sandbox::new()
        .bare()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn invalid_output_format_is_rejected() {
    Sandbox::new()
        .cmd()
        .args(["--output", "xml", "buses", "list"])
        .assert()
        .code(2);
}

// ── Listing ─────────────────────────────────────────────────────────

#[test]
fn demo_buses_fit_one_default_page() {
    Sandbox::new()
        .cmd()
        .args(["buses", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1234-A-6")
                .and(predicate::str::contains("Collège Belorado"))
                .and(predicate::str::contains("Page 1 of 1 (7 results)")),
        );
}

#[test]
fn out_of_range_page_snaps_to_last() {
    Sandbox::new()
        .cmd()
        .args(["--per-page", "3", "buses", "list", "--page", "9"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1357-W-6").and(predicate::str::contains("Page 3 of 3")),
        );
}

#[test]
fn search_matches_through_establishment_name() {
    let output = Sandbox::new()
        .cmd()
        .args(["-o", "plain", "buses", "list", "--search", "elo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "1\n2\n3\n4");
}

#[test]
fn establishment_without_buses_shows_no_results() {
    Sandbox::new()
        .cmd()
        .args(["buses", "list", "--establishment", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results"));
}

#[test]
fn json_listing_is_flat_and_enriched() {
    let output = Sandbox::new()
        .cmd()
        .args(["-o", "json", "buses", "list", "-s", "1357"])
        .output()
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["id"], 7);
    assert_eq!(rows[0]["establishmentName"], "École Al Amal");
    assert_eq!(rows[0]["driverName"], "Non attribué");
}

// ── Get ─────────────────────────────────────────────────────────────

#[test]
fn get_missing_record_exits_not_found() {
    Sandbox::new()
        .cmd()
        .args(["buses", "get", "99"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

// ── Mutations ───────────────────────────────────────────────────────

#[test]
fn created_bus_is_persisted() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-o", "plain", "buses", "create"])
        .args(["--plate", "4242-B-6", "--make", "Volvo", "--capacity", "44"])
        .assert()
        .success()
        .stdout("8\n")
        .stderr(predicate::str::contains("Created bus 8"));

    let dataset = read_json(&sandbox.dataset());
    assert_eq!(dataset["buses"].as_array().unwrap().len(), 8);

    sandbox
        .cmd()
        .args(["buses", "get", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4242-B-6"));
}

#[test]
fn blank_plate_is_a_usage_error_and_writes_nothing() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["buses", "create", "--plate", " ", "--make", "Volvo", "--capacity", "44"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("plateNumber"));
    assert!(!sandbox.dataset().exists());
}

#[test]
fn delete_requires_yes_when_not_interactive() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["buses", "delete", "7"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
    assert!(!sandbox.dataset().exists());
}

#[test]
fn deleting_missing_record_is_not_found_even_without_yes() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["buses", "delete", "99"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
    assert!(!sandbox.dataset().exists());
}

#[test]
fn deleting_last_row_moves_to_previous_page() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--yes", "buses", "delete", "7"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["--per-page", "3", "buses", "list", "--page", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 2 of 2 (6 results)"));
}

#[test]
fn parent_created_with_students_gets_links() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["parents", "create", "--first-name", "Amina", "--last-name", "Lahlou"])
        .args(["--email", "amina@example.ma", "--students", "10,11"])
        .assert()
        .success();

    let output = sandbox
        .cmd()
        .args(["-o", "json", "parents", "get", "5"])
        .output()
        .unwrap();
    let parent: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parent["studentIds"], serde_json::json!([10, 11]));
    assert_eq!(parent["studentNames"], "Sara Lahlou, Ayoub Lahlou");
}

#[test]
fn archived_student_cannot_be_updated() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-y", "students", "delete", "5"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["students", "update", "5", "--grade", "CM2"])
        .assert()
        .code(4);

    let dataset = read_json(&sandbox.dataset());
    let student = dataset["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == 5)
        .unwrap();
    assert!(!student["deletedAt"].is_null());
}

#[test]
fn create_from_file() {
    let sandbox = Sandbox::new();
    let payload = sandbox.dir.path().join("route.json");
    std::fs::write(
        &payload,
        r#"{"name": "Circuit Est", "establishmentId": 3, "stops": ["Agdal", "Hay Riad"]}"#,
    )
    .unwrap();

    sandbox
        .cmd()
        .args(["routes", "create", "--from-file"])
        .arg(&payload)
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["routes", "get", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Circuit Est").and(predicate::str::contains("2. Hay Riad")));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn unknown_profile_is_reported() {
    Sandbox::new()
        .cmd()
        .args(["--profile", "nope", "buses", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn config_show_without_file_succeeds() {
    Sandbox::new().bare().args(["config", "show"]).assert().success();
}

#[test]
fn config_use_switches_default_profile() {
    let sandbox = Sandbox::new();
    let config_file = sandbox.dir.path().join("schoolbus.toml");
    std::fs::write(
        &config_file,
        format!(
            "default_profile = \"a\"\n\n[profiles.a]\nbackend = \"local\"\n\n\
             [profiles.b]\nbackend = \"local\"\ndataset = \"{}\"\n",
            sandbox.dataset().display()
        ),
    )
    .unwrap();

    sandbox
        .bare()
        .env("SCHOOLBUS_CONFIG", &config_file)
        .args(["config", "use", "b"])
        .assert()
        .success();

    sandbox
        .bare()
        .env("SCHOOLBUS_CONFIG", &config_file)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b *"));

    // Profile `b` points at the sandbox dataset.
    sandbox
        .bare()
        .env("SCHOOLBUS_CONFIG", &config_file)
        .args(["-y", "trips", "delete", "1"])
        .assert()
        .success();
    assert!(sandbox.dataset().exists());
}

#[test]
fn broken_config_fails_instead_of_falling_back() {
    let sandbox = Sandbox::new();
    let config_file = sandbox.dir.path().join("schoolbus.toml");
    let body = "default_profile = \"prod\"\n\n[profiles.prod]\nbackend = \"remote\"\n\
                api_url = \"https://api.example.ma/v1\"\nitems_per_page = \"ten\"\n";
    std::fs::write(&config_file, body).unwrap();

    sandbox
        .bare()
        .env("SCHOOLBUS_CONFIG", &config_file)
        .args(["buses", "create", "--plate", "9999-Z-9", "--make", "Volvo", "--capacity", "40"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("items_per_page"));

    assert!(!sandbox.dir.path().join("data").exists());
    assert_eq!(std::fs::read_to_string(&config_file).unwrap(), body);
}

#[test]
fn config_use_leaves_broken_config_alone() {
    let sandbox = Sandbox::new();
    let config_file = sandbox.dir.path().join("schoolbus.toml");
    let body = "[profiles.a]\nbackend = \"local\"\ntimeout = \"soon\"\n";
    std::fs::write(&config_file, body).unwrap();

    sandbox
        .bare()
        .env("SCHOOLBUS_CONFIG", &config_file)
        .args(["config", "use", "a"])
        .assert()
        .failure();

    assert_eq!(std::fs::read_to_string(&config_file).unwrap(), body);
}
