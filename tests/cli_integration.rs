//! Integration tests for the RotaVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passphrases are supplied through the `ROTAVAULT_*` environment
//! variables so no test ever touches an interactive prompt.

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the rotavault binary.
fn rotavault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("rotavault").expect("binary should exist")
}

/// Write a config with minimum-cost Argon2 params into the test cwd so
/// the CLI tests don't spend seconds per key derivation.
fn write_fast_config(tmp: &TempDir) {
    std::fs::write(
        tmp.path().join(".rotavault.toml"),
        "argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n",
    )
    .unwrap();
}

/// Helper: initialize a store with passphrase "oldpass123" in `tmp`.
fn init_store(tmp: &TempDir) {
    rotavault()
        .arg("init")
        .current_dir(tmp.path())
        .env("ROTAVAULT_NEW_PASSPHRASE", "oldpass123")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created store 'main'"));
}

#[test]
fn help_flag_shows_usage() {
    rotavault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Encrypted credential store with master-passphrase rotation",
        ))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("enroll"))
        .stdout(predicate::str::contains("rotate"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("unlock"));
}

#[test]
fn version_flag_shows_version() {
    rotavault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rotavault"));
}

#[test]
fn no_args_shows_help() {
    // Running with no subcommand should show an error or help.
    rotavault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn invalid_store_name_rejected() {
    rotavault()
        .args(["--name", "UPPER", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn show_on_missing_store_fails() {
    let tmp = TempDir::new().unwrap();

    rotavault()
        .args(["show", "prod-db-password"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn init_creates_store_file() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    assert!(tmp.path().join(".rotavault/main.store").exists());
}

#[test]
fn init_refuses_second_run() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .arg("init")
        .current_dir(tmp.path())
        .env("ROTAVAULT_NEW_PASSPHRASE", "otherpass")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_weak_passphrase() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);

    rotavault()
        .arg("init")
        .current_dir(tmp.path())
        .env("ROTAVAULT_NEW_PASSPHRASE", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));
}

#[test]
fn add_show_list_roundtrip() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .args(["add", "prod-db-password", "hunter2"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .success();

    // `show` prints the raw value so it can be piped.
    rotavault()
        .args(["show", "prod-db-password"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));

    rotavault()
        .arg("list")
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .success()
        .stdout(predicate::str::contains("prod-db-password"));
}

#[test]
fn show_with_wrong_passphrase_fails() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .args(["add", "prod-db-password", "hunter2"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .success();

    rotavault()
        .args(["show", "prod-db-password"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "wrongpass1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passphrase"));
}

#[test]
fn rotate_switches_the_passphrase() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    for (label, value) in [("db-password", "hunter2"), ("api-key", "sk-12345")] {
        rotavault()
            .args(["add", label, value])
            .current_dir(tmp.path())
            .env("ROTAVAULT_PASSPHRASE", "oldpass123")
            .assert()
            .success();
    }

    rotavault()
        .args(["rotate", "--yes"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .env("ROTAVAULT_NEW_PASSPHRASE", "newpass456")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation complete"));

    // Every record is readable under the new passphrase...
    rotavault()
        .args(["show", "api-key"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "newpass456")
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-12345"));

    // ...and the old one is dead.
    rotavault()
        .args(["show", "api-key"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passphrase"));

    // The guard and maintenance marker are gone.
    assert!(!tmp.path().join(".rotavault/main.lock").exists());
    assert!(!tmp.path().join(".rotavault/main.maintenance").exists());
}

#[test]
fn rotate_to_same_passphrase_fails() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .args(["rotate", "--yes"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .env("ROTAVAULT_NEW_PASSPHRASE", "oldpass123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to rotate"));
}

#[test]
fn rotate_with_wrong_old_passphrase_fails() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .args(["rotate", "--yes"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "wrongpass1")
        .env("ROTAVAULT_NEW_PASSPHRASE", "newpass456")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passphrase"));
}

#[test]
fn enroll_marks_vault_in_status_after_rotation() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .args(["enroll", "alice"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .env("ROTAVAULT_LOGIN_PASSWORD", "alice-login-pw")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enrolled user 'alice'"));

    // Status needs no passphrase.
    rotavault()
        .arg("status")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 user vault(s) (0 stale)"));

    rotavault()
        .args(["rotate", "--yes"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .env("ROTAVAULT_NEW_PASSPHRASE", "newpass456")
        .assert()
        .success()
        .stderr(predicate::str::contains("marked stale"));

    rotavault()
        .arg("status")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 user vault(s) (1 stale)"));
}

#[test]
fn status_reports_lock_and_maintenance() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .arg("status")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation lock: free"))
        .stdout(predicate::str::contains("Maintenance mode: off"));
}

#[test]
fn unlock_on_free_lock_is_a_noop() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    rotavault()
        .arg("unlock")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already free"));
}

#[test]
fn unlock_refuses_fresh_lock_without_force() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    // Plant a fresh lock as a concurrent rotation would.
    std::fs::write(
        tmp.path().join(".rotavault/main.lock"),
        format!(
            "{{\"holder\":\"cli:999\",\"acquired_at\":\"{}\"}}",
            chrono::Utc::now().to_rfc3339()
        ),
    )
    .unwrap();

    rotavault()
        .arg("unlock")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not yet stale"));

    rotavault()
        .args(["unlock", "--force"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared rotation lock"));

    assert!(!tmp.path().join(".rotavault/main.lock").exists());
}

#[test]
fn unlock_clears_corrupt_lock_file() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    // A crash between lock creation and write leaves an empty file; it
    // must still be clearable.
    std::fs::write(tmp.path().join(".rotavault/main.lock"), b"").unwrap();

    rotavault()
        .arg("unlock")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cleared rotation lock held by 'unknown'",
        ));

    assert!(!tmp.path().join(".rotavault/main.lock").exists());
}

#[test]
fn rotate_refused_while_lock_held() {
    let tmp = TempDir::new().unwrap();
    write_fast_config(&tmp);
    init_store(&tmp);

    std::fs::write(
        tmp.path().join(".rotavault/main.lock"),
        format!(
            "{{\"holder\":\"cli:999\",\"acquired_at\":\"{}\"}}",
            chrono::Utc::now().to_rfc3339()
        ),
    )
    .unwrap();

    rotavault()
        .args(["rotate", "--yes"])
        .current_dir(tmp.path())
        .env("ROTAVAULT_PASSPHRASE", "oldpass123")
        .env("ROTAVAULT_NEW_PASSPHRASE", "newpass456")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in progress"));
}

#[test]
fn completions_generates_script() {
    rotavault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotavault"));
}

#[test]
fn completions_rejects_unknown_shell() {
    rotavault()
        .args(["completions", "tcsh"])
        .assert()
        .failure();
}
