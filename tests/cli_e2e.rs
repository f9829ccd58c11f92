//! End-to-end CLI tests for the meir-downloader binary.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::fixtures::{AJAX_PATH, grid_body, lesson_card, rabbis_select};
use support::socket_guard::start_mock_server_or_skip;

fn meir() -> Command {
    let mut cmd = Command::cargo_bin("meir-downloader").unwrap();
    // Keep a developer's config file out of the test run.
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-meir-config")
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    meir()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("meirtv.com"))
        .stdout(predicate::str::contains("download"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    meir()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("meir-downloader"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    meir().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    meir()
        .args(["rabbis", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_bad_base_url() {
    meir()
        .args(["--base-url", "ftp://meirtv.com", "rabbis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp://meirtv.com"));
}

#[test]
fn test_binary_rejects_missing_explicit_config() {
    meir()
        .args(["--config", "/nonexistent/meir.toml", "rabbis"])
        .assert()
        .failure();
}

#[test]
fn test_download_without_selection_fails() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some(server) = runtime.block_on(start_mock_server_or_skip()) else {
        return;
    };
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path(AJAX_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(grid_body(&[], &lesson_card("801", "9001", "Opening", 1))),
            )
            .mount(&server),
    );

    let temp_dir = tempfile::TempDir::new().unwrap();
    meir()
        .args(["--base-url", &server.uri(), "--download-dir"])
        .arg(temp_dir.path())
        .arg("download")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--lesson"));
}

#[test]
fn test_rabbis_json_output() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some(server) = runtime.block_on(start_mock_server_or_skip()) else {
        return;
    };
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path(AJAX_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(grid_body(&[("1", rabbis_select())], "")),
            )
            .mount(&server),
    );

    meir()
        .args(["-q", "--base-url", &server.uri(), "rabbis", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Rav Levi""#))
        .stdout(predicate::str::contains(r#""count": 34"#));
}

#[test]
fn test_lessons_table_output_with_search() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Some(server) = runtime.block_on(start_mock_server_or_skip()) else {
        return;
    };
    let posts = [
        lesson_card("801", "9001", "Opening", 1),
        lesson_card("802", "9002", "Closing", 2),
    ]
    .join("");
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path(AJAX_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body(&[], &posts)))
            .mount(&server),
    );

    meir()
        .args(["-q", "--base-url", &server.uri(), "lessons", "--search", "closing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("002"))
        .stdout(predicate::str::contains("Closing"))
        .stdout(predicate::str::contains("Opening").not());
}
