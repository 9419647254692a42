//! Startup tests that run the compiled binary
//!
//! These check the fail-fast contract: without a store the process exits
//! before opening its listener, and with one it serves the API.
//!
//! Run with: cargo test --test startup_tests
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

const BINARY: &str = env!("CARGO_BIN_EXE_tally");

/// Reserve a free port by binding and releasing it
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn server_command(port: u16) -> Command {
    let mut command = Command::new(BINARY);
    command
        .arg("serve")
        .env_remove("COUNTER_STORE_URL")
        .env("PORT", port.to_string())
        .env("RUST_LOG", "tally=info")
        .stdout(Stdio::null());
    command
}

/// Kills the server process when dropped
struct ServerProcess(Child);

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn test_missing_store_url_exits_before_listening() {
    let port = free_port();
    let output = server_command(port)
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to run tally");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("COUNTER_STORE_URL"), "stderr: {}", stderr);
    assert!(!stderr.contains("Server running"), "stderr: {}", stderr);
}

#[test]
fn test_unsupported_store_scheme_exits() {
    let output = server_command(free_port())
        .env("COUNTER_STORE_URL", "mongodb://localhost:27017/demo")
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to run tally");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported store URL scheme"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_memory_store_serves_api() {
    let port = free_port();
    let child = server_command(port)
        .env("COUNTER_STORE_URL", "memory://")
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start tally");
    let _server = ServerProcess(child);

    let base_url = format!("http://127.0.0.1:{}", port);
    let http = reqwest::Client::new();

    // Wait for the listener
    let mut ready = false;
    for _ in 0..100 {
        if http
            .get(format!("{}/health", base_url))
            .send()
            .await
            .is_ok()
        {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(ready, "server did not start within 10 seconds");

    let value: serde_json::Value = http
        .post(format!("{}/api/counter/increment", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(value["value"], 1);
}
