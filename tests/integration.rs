use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn contacts_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("contacts");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/contacts.sqlite"

[server]
bind = "127.0.0.1:5055"

[logging]
filter = "warn"
"#,
        root.display()
    );

    let config_path = config_dir.join("contacts.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_contacts(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = contacts_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run contacts binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_contacts(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("contacts.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_contacts(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_contacts(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty_database() {
    let (_tmp, config_path) = setup_test_env();

    run_contacts(&config_path, &["init"]);
    let (stdout, stderr, success) = run_contacts(&config_path, &["list"]);
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("0 contact(s)"));
}

#[test]
fn test_list_accepts_filters() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_contacts(
        &config_path,
        &["list", "--search", "ann", "--category", "Work"],
    );
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("0 contact(s)"));
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[server]\nbind = \"nowhere\"\n").unwrap();

    let (_, stderr, success) = run_contacts(&bad, &["init"]);
    assert!(!success);
    assert!(stderr.contains("server.bind"));
}
