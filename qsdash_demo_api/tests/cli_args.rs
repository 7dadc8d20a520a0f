//! CLI arg parsing tests for qsdash_demo_api (server)
use std::net::TcpStream;
use std::process::Command;
use std::time::{Duration, Instant};

fn wait_for_port(port: u16) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn port_short_and_long() {
    let exe = env!("CARGO_BIN_EXE_qsdash_demo_api");

    // Use unlikely ports to avoid conflicts.
    for args in [["--port", "9555"], ["-p", "9556"]] {
        let port: u16 = args[1].parse().unwrap();
        let mut child = Command::new(exe).args(args).spawn().expect("spawn demo api");
        let up = wait_for_port(port);
        let _ = child.kill();
        let _ = child.wait();
        assert!(up, "demo api did not listen on {port}");
    }
}

#[test]
fn help_and_bad_port() {
    let out = assert_cmd::Command::cargo_bin("qsdash_demo_api")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("--port") && text.contains("-p"), "{text}");

    assert_cmd::Command::cargo_bin("qsdash_demo_api")
        .unwrap()
        .args(["--port", "not-a-port"])
        .assert()
        .failure();
}
