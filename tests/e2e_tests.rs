//! End-to-end tests against a mock reachability API
//!
//! The binary talks to a wiremock server through `--endpoint`, with an
//! explicit `--token` so no credentials are discovered.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const PARENT: &str = "projects/p/locations/global/connectivityTests";

fn test_name(id: &str) -> String {
    format!("{}/{}", PARENT, id)
}

fn operation_name(id: &str) -> String {
    format!("projects/p/locations/global/operations/op-{}", id)
}

fn done_operation(id: &str, result: &str) -> Value {
    json!({
        "name": operation_name(id),
        "done": true,
        "response": {
            "name": test_name(id),
            "reachabilityDetails": {
                "result": result,
                "verifyTime": "2024-05-01T10:00:00Z"
            }
        }
    })
}

async fn mount_list(server: &MockServer, ids: &[&str]) {
    let resources: Vec<Value> = ids.iter().map(|id| json!({ "name": test_name(id) })).collect();
    Mock::given(method("GET"))
        .and(path(format!("/v1beta1/{}", PARENT)))
        .and(header("authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resources": resources })))
        .mount(server)
        .await;
}

/// Rerun returns a pending operation, the first poll reports `result`
async fn mount_rerun(server: &MockServer, id: &str, result: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta1/{}:rerun", test_name(id))))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": operation_name(id),
            "done": false
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1beta1/{}", operation_name(id))))
        .respond_with(ResponseTemplate::new(200).set_body_json(done_operation(id, result)))
        .mount(server)
        .await;
}

fn base_args(server: &MockServer) -> Vec<String> {
    vec![
        "--project".into(),
        "p".into(),
        "--endpoint".into(),
        format!("{}/v1beta1", server.uri()),
        "--token".into(),
        "e2e-token".into(),
        "--poll-interval-ms".into(),
        "10".into(),
    ]
}

/// Run the binary with `args` and extra environment, off the async runtime
async fn run_with_env(args: Vec<String>, envs: &[(&str, &str)]) -> Output {
    let envs: Vec<(String, String)> = envs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        Command::cargo_bin("reachability-rerun")
            .unwrap()
            .current_dir(dir.path())
            .env_remove("REACHABILITY_TESTS")
            .env_remove("REACHABILITY_LOCATION")
            .env_remove("POLL_TIMEOUT_SECONDS")
            .env_remove("ENABLE_COLOR")
            .env_remove("NO_COLOR")
            .env_remove("FORCE_COLOR")
            .envs(envs)
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

/// Run the binary against `server` without colors
async fn run(server: &MockServer, extra: &[&str]) -> Output {
    let mut args = base_args(server);
    args.push("--no-color".into());
    args.extend(extra.iter().map(|s| s.to_string()));
    run_with_env(args, &[]).await
}

#[tokio::test]
async fn test_all_tests_reachable() {
    let server = MockServer::start().await;
    mount_list(&server, &["web", "db"]).await;
    mount_rerun(&server, "web", "REACHABLE").await;
    mount_rerun(&server, "db", "REACHABLE").await;

    let output = run(&server, &[]).await;

    output.clone().assert().success();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("{}\tREACHABLE\t\n", test_name("web"))));
    assert!(stdout.contains(&format!("{}\tREACHABLE\t\n", test_name("db"))));
}

#[tokio::test]
async fn test_unreachable_test_fails_run() {
    let server = MockServer::start().await;
    mount_list(&server, &["web", "db"]).await;
    mount_rerun(&server, "web", "REACHABLE").await;
    mount_rerun(&server, "db", "UNREACHABLE").await;

    let output = run(&server, &[]).await;

    output
        .assert()
        .code(1)
        .stdout(predicate::str::contains(format!("{}\tREACHABLE\t", test_name("web"))))
        .stdout(predicate::str::contains("UNREACHABLE").not())
        .stderr(predicate::str::contains(format!("{}\tUNREACHABLE\t", test_name("db"))));
}

#[tokio::test]
async fn test_explicit_tests_skip_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta1/{}", PARENT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    mount_rerun(&server, "web", "AMBIGUOUS").await;

    let output = run(&server, &["--tests", "web"]).await;

    output
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!("{}\tAMBIGUOUS\t", test_name("web"))));
}

#[tokio::test]
async fn test_verbose_summary() {
    let server = MockServer::start().await;
    mount_list(&server, &["web"]).await;
    mount_rerun(&server, "web", "REACHABLE").await;

    run(&server, &["-v"])
        .await
        .assert()
        .success()
        .stderr(predicate::str::contains("Summary"))
        .stderr(predicate::str::contains("Passed:   1"));
}

async fn single_test_server() -> MockServer {
    let server = MockServer::start().await;
    mount_list(&server, &["web"]).await;
    mount_rerun(&server, "web", "REACHABLE").await;
    server
}

#[tokio::test]
async fn test_verbose_echoes_response_bodies() {
    let server = single_test_server().await;
    let verbose = run(&server, &["-v"]).await;
    verbose.clone().assert().success();
    let stderr = String::from_utf8_lossy(&verbose.stderr);
    assert!(stderr.contains(&format!("\"name\":\"{}\"", operation_name("web"))), "{}", stderr);
    assert!(stderr.contains("\"reachabilityDetails\""), "{}", stderr);

    let server = single_test_server().await;
    let quiet = run(&server, &[]).await;
    quiet.clone().assert().success();
    let stderr = String::from_utf8_lossy(&quiet.stderr);
    assert!(!stderr.contains("reachabilityDetails"), "{}", stderr);
    assert!(!stderr.contains(&operation_name("web")), "{}", stderr);
}

#[tokio::test]
async fn test_unknown_result_printed_verbatim() {
    let server = MockServer::start().await;
    mount_rerun(&server, "web", "PARTIALLY_REACHABLE").await;

    run(&server, &["--tests", "web"])
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!("{}\tPARTIALLY_REACHABLE\t", test_name("web"))));
}

#[tokio::test]
async fn test_ci_environment_keeps_plain_result_lines() {
    let server = MockServer::start().await;
    mount_rerun(&server, "web", "REACHABLE").await;

    let mut args = base_args(&server);
    args.extend(["--tests".to_string(), "web".to_string()]);
    let output = run_with_env(args, &[("CI", "true")]).await;

    output.clone().assert().success();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("{}\tREACHABLE\t\n", test_name("web"))
    );
}

#[tokio::test]
async fn test_api_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta1/{}", PARENT)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    run(&server, &[])
        .await
        .assert()
        .code(2)
        .stderr(predicate::str::contains("status code = 403"))
        .stderr(predicate::str::contains("The caller does not have permission"));
}

#[tokio::test]
async fn test_failed_operation_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta1/{}:rerun", test_name("web"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": operation_name("web"),
            "done": true,
            "error": {"code": 9, "message": "test is being updated"}
        })))
        .mount(&server)
        .await;

    run(&server, &["--tests", "web"])
        .await
        .assert()
        .code(2)
        .stderr(predicate::str::contains("code 9: test is being updated"));
}

#[tokio::test]
async fn test_poll_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta1/{}:rerun", test_name("slow"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": operation_name("slow"),
            "done": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta1/{}", operation_name("slow"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": operation_name("slow"),
            "done": false
        })))
        .mount(&server)
        .await;

    run(&server, &["--tests", "slow", "--poll-timeout", "1"])
        .await
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not done after 1s"));
}

#[tokio::test]
async fn test_empty_location_succeeds() {
    let server = MockServer::start().await;
    mount_list(&server, &[]).await;

    run(&server, &[])
        .await
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
