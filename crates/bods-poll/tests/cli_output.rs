//! Integration tests for CLI output behavior
//!
//! The default behavior is quiet (no logs). Use -v/--verbose to enable logs.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread::JoinHandle;

/// Serve one canned JSON response and return the request line it received.
/// Any request body is read before replying.
fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("Failed to accept connection");
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
        request_line.trim_end().to_string()
    });

    (base_url, handle)
}

/// Run bods-poll with an isolated home and working directory.
fn run_bods_poll(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bods-poll"))
        .args(args)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .output()
        .expect("Failed to execute 'bods-poll'")
}

#[test]
fn test_watch_success_stdout_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = serve_once(r#"{"progress": 100, "status": "success"}"#);

    let output = run_bods_poll(dir.path(), &["watch", "7", "--base-url", &base_url]);

    assert!(
        output.status.success(),
        "bods-poll watch failed with exit code {:?}. stderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(server.join().unwrap(), "GET /dataset/7/progress/ HTTP/1.1");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // stdout should not contain JSON log lines
    assert!(
        !stdout.contains(r#""event":"#),
        "stdout should not contain JSON logs, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Draft (view: /dataset/7/update/review)"),
        "expected the draft badge with a view link, got: {}",
        stdout
    );

    // Default mode is quiet: nothing below ERROR on stderr
    assert!(
        !stderr.contains(r#""level":"INFO""#),
        "Default mode should not emit INFO logs, got: {}",
        stderr
    );
}

#[test]
fn test_watch_json_format_emits_terminal_line() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = serve_once(r#"{"progress": 100, "status": "success"}"#);

    let output = run_bods_poll(
        dir.path(),
        &["watch", "7", "--base-url", &base_url, "--format", "json"],
    );
    assert!(output.status.success());
    server.join().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("every stdout line should be JSON"))
        .collect();

    let terminal = lines
        .iter()
        .find(|line| line["type"] == "terminal")
        .expect("expected a terminal line");
    assert_eq!(terminal["status"], "succeeded");
    assert_eq!(terminal["session"], "dataset-7");
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = serve_once(r#"{"progress": 0, "status": "error"}"#);

    let output = run_bods_poll(dir.path(), &["-v", "watch", "7", "--base-url", &base_url]);
    server.join().unwrap();

    // A failed dataset is reported through the exit code
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Error"), "expected the error badge, got: {}", stdout);
    assert!(!stdout.contains(r#""event":"#));
    assert!(
        stderr.contains(r#""event":"core.poll.session_started""#),
        "verbose mode should log to stderr, got: {}",
        stderr
    );
}

#[test]
fn test_invalid_dataset_id_fails_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_bods_poll(
        dir.path(),
        &["watch", "abc", "--base-url", "http://127.0.0.1:9"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid dataset id 'abc'"),
        "expected an invalid id message, got: {}",
        stderr
    );
}

#[test]
fn test_broken_config_falls_back_to_defaults_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".bods")).unwrap();
    std::fs::write(dir.path().join(".bods/config.toml"), "[poll\ninterval_ms = ").unwrap();

    let output = run_bods_poll(
        dir.path(),
        &["watch", "abc", "--base-url", "http://127.0.0.1:9"],
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Warning: Could not load config"),
        "expected a config warning, got: {}",
        stderr
    );
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_bods_poll(dir.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["watch", "list", "dqs", "suppress", "session-timeout"] {
        assert!(stdout.contains(subcommand), "missing '{}' in help", subcommand);
    }
}

#[test]
fn test_suppress_all_on_page_sends_one_request() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = serve_once("{}");
    let page_url = format!("{}/org/1/dataset/timetable/2/report/3/check/?page=2", base_url);

    let output = run_bods_poll(
        dir.path(),
        &[
            "suppress",
            "--page-url",
            &page_url,
            "--cookie",
            "csrftoken=tok",
            "--check",
            "Missing journey code",
            "--all",
        ],
    );

    assert!(
        output.status.success(),
        "bods-poll suppress failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        server.join().unwrap(),
        "POST /org/1/dataset/timetable/2/report/3/suppress-observation/ HTTP/1.1"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Restore all observations"), "got: {}", stdout);
}

fn write_short_timeout_config(dir: &Path) {
    std::fs::create_dir_all(dir.join(".bods")).unwrap();
    std::fs::write(
        dir.join(".bods/config.toml"),
        "[session_timeout]\ntimeout_secs = 2\nwarning_secs = 1\n",
    )
    .unwrap();
}

#[test]
fn test_session_timeout_runs_without_cookie() {
    let dir = tempfile::tempdir().unwrap();
    write_short_timeout_config(dir.path());

    let output = run_bods_poll(
        dir.path(),
        &["session-timeout", "--base-url", "http://127.0.0.1:9"],
    );

    assert!(
        output.status.success(),
        "bods-poll session-timeout failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Session expired, redirecting to http://127.0.0.1:9/account/logout/"),
        "expected the expiry line, got: {}",
        stdout
    );
}

#[test]
fn test_session_timeout_json_format() {
    let dir = tempfile::tempdir().unwrap();
    write_short_timeout_config(dir.path());

    let output = run_bods_poll(
        dir.path(),
        &[
            "session-timeout",
            "--base-url",
            "http://127.0.0.1:9",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("every stdout line should be JSON"))
        .collect();
    let expired = lines
        .iter()
        .find(|line| line["type"] == "expired")
        .expect("expected an expired line");
    assert_eq!(expired["logout_url"], "http://127.0.0.1:9/account/logout/");
}
