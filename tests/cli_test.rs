//! E2E tests for the wattvault CLI.
//!
//! Runs the compiled binary and verifies:
//! - Help, version, and quickstart output
//! - Argument validation exit codes
//! - A full collect-then-stats round against a mock server

use std::path::PathBuf;

use assert_cmd::Command;
use chrono::{Duration as ChronoDuration, Utc};
use predicates::prelude::*;

use wattvault::test_utils::{TestDir, consumption_page_json, hourly_nodes};

// =============================================================================
// Test Helpers
// =============================================================================

/// Get the wattvault binary command.
/// Handles custom build directory by checking env var or falling back to specific path.
fn wattvault_cmd() -> Command {
    // Try standard cargo_bin first
    if let Ok(cmd) = Command::cargo_bin("wattvault") {
        return cmd;
    }

    // Fallback to hardcoded path seen in environment
    let path = PathBuf::from("/tmp/cargo-target/debug/wattvault");
    if path.exists() {
        return Command::new(path);
    }

    panic!("Could not find wattvault binary");
}

/// A command isolated from ambient wattvault environment variables.
fn isolated_cmd() -> Command {
    let mut cmd = wattvault_cmd();
    cmd.env_remove("WATTVAULT_TOKEN")
        .env_remove("WATTVAULT_HOME_ID")
        .env_remove("WATTVAULT_DB")
        .env_remove("WATTVAULT_CONFIG");
    cmd
}

// =============================================================================
// Help and Quickstart
// =============================================================================

#[test]
fn help_lists_commands() {
    isolated_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("collect"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn no_args_prints_quickstart() {
    isolated_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"))
        .stdout(predicate::str::contains("wattvault collect"));
}

#[test]
fn version_flag_reports_name() {
    isolated_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wattvault"));
}

// =============================================================================
// Argument Validation
// =============================================================================

#[test]
fn collect_requires_a_token() {
    isolated_cmd().arg("collect").assert().code(2);
}

#[test]
fn collect_rejects_bad_since() {
    let dir = TestDir::new();

    isolated_cmd()
        .arg("collect")
        .arg("--token")
        .arg("test-token")
        .arg("--db-path")
        .arg(dir.db_path())
        .arg("--since")
        .arg("not-a-date")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn collect_rejects_unknown_resolution() {
    let dir = TestDir::new();

    isolated_cmd()
        .arg("collect")
        .arg("--token")
        .arg("test-token")
        .arg("--db-path")
        .arg(dir.db_path())
        .arg("--resolution")
        .arg("quarterly")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("resolution"));
}

// =============================================================================
// Stats
// =============================================================================

#[test]
fn stats_reports_empty_store() {
    let dir = TestDir::new();

    isolated_cmd()
        .arg("stats")
        .arg("--db-path")
        .arg(dir.db_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:  0"))
        .stdout(predicate::str::contains("store is empty"));
}

// =============================================================================
// Full Round Trips
// =============================================================================

#[test]
fn collect_then_stats_against_mock_server() {
    // The binary is synchronous from the test's point of view; the mock
    // server needs a runtime that stays alive alongside it.
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let server = rt.block_on(async {
        let server = wiremock::MockServer::start().await;
        let start = Utc::now() - ChronoDuration::hours(3);
        let page = consumption_page_json(&hourly_nodes(start, 3, 1.0), false, None);
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(&page))
            .mount(&server)
            .await;
        server
    });

    let dir = TestDir::new();
    let config_path = dir.create_file(
        "config.toml",
        &format!("api_url = \"{}\"\npage_delay_ms = 0\n", server.uri()),
    );

    isolated_cmd()
        .env("WATTVAULT_TOKEN", "test-token")
        .arg("collect")
        .arg("--home-id")
        .arg("home-1")
        .arg("--db-path")
        .arg(dir.db_path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 3 of 3"));

    isolated_cmd()
        .arg("stats")
        .arg("--db-path")
        .arg(dir.db_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:  3"))
        .stdout(predicate::str::contains("kWh"));
}

#[test]
fn collect_exits_with_transport_code_when_source_is_down() {
    let dir = TestDir::new();
    let config_path = dir.create_file(
        "config.toml",
        "api_url = \"http://127.0.0.1:9\"\npage_delay_ms = 0\n\n\
         [retry]\nmax_attempts = 2\nbackoff_base_ms = 0\nflat_delay_ms = 0\n",
    );

    isolated_cmd()
        .env("WATTVAULT_TOKEN", "test-token")
        .arg("collect")
        .arg("--home-id")
        .arg("home-1")
        .arg("--db-path")
        .arg(dir.db_path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}
