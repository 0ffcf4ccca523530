//! End-to-end startup tests: spawn the real binary and poke it over HTTP.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a config pointing every path into the test's temp directory
fn test_config(port: u16, dir: &std::path::Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"

[reports]
staging_dir = "{}"
output_dir = "{}"
"#,
        port,
        dir.join("opsdesk.db").display(),
        dir.join("tmp").display(),
        dir.join("out").display(),
    )
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_opsdesk"))
        .env("OPSDESK_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Helper to start a server for testing
async fn start_test_server() -> (u16, tokio::process::Child, TempDir) {
    let port = get_available_port();
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("tmp")).unwrap();

    let config_content = test_config(port, temp_dir.path());

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    (port, server, temp_dir)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (port, mut server, _temp_dir) = start_test_server().await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_reports_paths() {
    let (port, mut server, temp_dir) = start_test_server().await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(
        json["reports"]["staging_dir"],
        temp_dir.path().join("tmp").display().to_string()
    );
    assert_eq!(json["server"]["port"], port);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_report_status_starts_idle() {
    let (port, mut server, _temp_dir) = start_test_server().await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/v1/reports", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["states"]["accounts"], "idle");
    assert_eq!(json["states"]["yearly"], "idle");
    assert_eq!(json["states"]["fs"], "idle");
    assert_eq!(json["metrics"]["runs"], 0);
    assert!(json["metrics"]["last_run"].is_null());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_trigger_and_poll_full_run() {
    let (port, mut server, temp_dir) = start_test_server().await;
    std::fs::write(
        temp_dir.path().join("tmp").join("txns.csv"),
        "2024-01-05,Cash,invoice,1000,0\n2024-02-09,Cash,rent,0,300\n",
    )
    .unwrap();

    let client = Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/api/v1/reports/generate", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 202);
    let ack: Value = response.json().await.unwrap();
    assert_eq!(ack["status"], "processing");

    // Poll until the deferred run completes
    let mut runs = 0;
    for _ in 0..100 {
        let status: Value = client
            .get(format!("http://127.0.0.1:{}/api/v1/reports", port))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        runs = status["metrics"]["runs"].as_u64().unwrap_or(0);
        if runs == 1 {
            break;
        }
        // Poll window must outlive the status cache TTL
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(runs, 1);

    let accounts = std::fs::read_to_string(temp_dir.path().join("out").join("accounts.csv"))
        .expect("accounts report not written");
    assert_eq!(accounts, "Account,Balance\nCash,700.00\n");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (port, mut server, _temp_dir) = start_test_server().await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let text = response.text().await.unwrap();
    assert!(text.contains("# HELP"));

    server.kill().await.ok();
}
