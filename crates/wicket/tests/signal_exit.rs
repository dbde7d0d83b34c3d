//! Runs the `wicket` binary and stops it with real signals.

#![cfg(unix)]

use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn spawn_wicket(dir: &Path, address: &str) -> Child {
    Command::new(env!("CARGO_BIN_EXE_wicket"))
        .current_dir(dir)
        .args(["--address", address, "--log-file"])
        .arg(dir.join("server_log.log"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

fn wait_until_listening(child: &mut Child, address: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while TcpStream::connect(address).is_err() {
        if let Some(status) = child.try_wait().unwrap() {
            panic!("wicket exited before listening: {status}");
        }
        assert!(Instant::now() < deadline, "wicket never listened on {address}");
        thread::sleep(Duration::from_millis(20));
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("wicket did not exit within {timeout:?}");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .args([signal, &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

fn stops_cleanly_on(signal: &str) {
    let dir = TempDir::new().unwrap();
    let address = format!("127.0.0.1:{}", free_port());
    let mut child = spawn_wicket(dir.path(), &address);
    wait_until_listening(&mut child, &address);

    send_signal(&child, signal);

    let status = wait_with_timeout(&mut child, Duration::from_secs(10));
    assert!(status.success(), "{signal} gave {status}");
    assert!(TcpStream::connect(&address).is_err());
}

#[test]
fn sigterm_exits_with_success() {
    stops_cleanly_on("-TERM");
}

#[test]
fn sigint_exits_with_success() {
    stops_cleanly_on("-INT");
}

#[test]
fn bind_failure_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = occupied.local_addr().unwrap().to_string();

    let mut child = spawn_wicket(dir.path(), &address);
    let status = wait_with_timeout(&mut child, Duration::from_secs(10));
    assert_eq!(status.code(), Some(1));
}
