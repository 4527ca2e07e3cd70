//! Integration tests for the CalmJournal CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Codes are supplied through the `CALMJOURNAL_*` env vars so nothing
//! waits on an interactive prompt.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: a Command pointing at the calmjournal binary, run inside `dir`
/// with no codes inherited from the environment.
fn calmjournal(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("calmjournal").expect("binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("CALMJOURNAL_PIN")
        .env_remove("CALMJOURNAL_NEW_PIN")
        .env_remove("CALMJOURNAL_IMPORT_PIN")
        .env_remove("RUST_LOG");
    cmd
}

fn add(dir: &TempDir, text: &str) {
    calmjournal(dir)
        .args(["add", text])
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success();
}

fn protect(dir: &TempDir, pin: &str) {
    calmjournal(dir)
        .arg("protect")
        .env("CALMJOURNAL_PIN", pin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Your journal is now protected."));
}

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Calm Code"))
        .stdout(predicate::str::contains("protect"))
        .stdout(predicate::str::contains("unprotect"))
        .stdout(predicate::str::contains("change-code"))
        .stdout(predicate::str::contains("autolock"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn status_of_fresh_directory_is_unprotected() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unprotected"))
        .stdout(predicate::str::contains("Entries:   0"));
}

#[test]
fn add_then_list_plain_journal() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .args(["add", "Fixed the bike", "--tag", "errands"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Win saved."));

    tmp.child("journal.json")
        .assert(predicate::str::contains("Fixed the bike"));

    calmjournal(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed the bike"))
        .stdout(predicate::str::contains("errands"));
}

#[test]
fn protect_encrypts_the_file() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Baked bread");
    protect(&tmp, "1234");

    let journal = tmp.child("journal.json");
    journal.assert(predicate::str::contains("Baked bread").not());
    journal.assert(predicate::str::contains("\"isLocked\": true"));
    journal.assert(predicate::str::contains(
        "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4",
    ));

    calmjournal(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("locked"));
}

#[test]
fn protect_rejects_malformed_code() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .arg("protect")
        .env("CALMJOURNAL_PIN", "12")
        .assert()
        .failure()
        .stderr(predicate::str::contains("4 digits"));
    tmp.child("journal.json").assert(predicate::path::missing());
}

#[test]
fn list_with_right_and_wrong_code() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Read a chapter");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .arg("list")
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read a chapter"));

    calmjournal(&tmp)
        .arg("list")
        .env("CALMJOURNAL_PIN", "0000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect code"));

    // Still encrypted on disk after reading.
    tmp.child("journal.json")
        .assert(predicate::str::contains("Read a chapter").not());
}

#[test]
fn change_code_then_old_code_fails() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Meditated");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .arg("change-code")
        .env("CALMJOURNAL_PIN", "1234")
        .env("CALMJOURNAL_NEW_PIN", "5678")
        .assert()
        .success();

    calmjournal(&tmp)
        .arg("list")
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .failure();

    calmjournal(&tmp)
        .arg("list")
        .env("CALMJOURNAL_PIN", "5678")
        .assert()
        .success()
        .stdout(predicate::str::contains("Meditated"));
}

#[test]
fn unprotect_restores_plaintext_file() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Watered plants");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .arg("unprotect")
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success()
        .stdout(predicate::str::contains("Privacy protection removed."));

    tmp.child("journal.json")
        .assert(predicate::str::contains("Watered plants"));
}

#[test]
fn autolock_requires_protection() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .args(["autolock", "on"])
        .assert()
        .failure();

    protect(&tmp, "1234");
    calmjournal(&tmp)
        .args(["autolock", "on", "--minutes", "2"])
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success();
    tmp.child("journal.json")
        .assert(predicate::str::contains("\"autoLockMinutes\": 2"));
}

#[test]
fn encrypted_backup_imports_with_its_own_code() {
    let source = TempDir::new().unwrap();
    add(&source, "Sent the letter");
    protect(&source, "9999");
    calmjournal(&source)
        .args(["export", "--output", "backup.json", "--no-readable"])
        .assert()
        .success();
    source
        .child("backup.json")
        .assert(predicate::str::contains("\"encrypted\": true"));

    let target = TempDir::new().unwrap();
    add(&target, "Local win");
    let backup = source.child("backup.json");

    calmjournal(&target)
        .args(["import", backup.path().to_str().unwrap()])
        .env("CALMJOURNAL_IMPORT_PIN", "9999")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported and decrypted 1 entries!"));

    calmjournal(&target)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sent the letter"))
        .stdout(predicate::str::contains("Local win"));
}

#[test]
fn encrypted_import_with_wrong_code_changes_nothing() {
    let source = TempDir::new().unwrap();
    add(&source, "Secret win");
    protect(&source, "9999");
    calmjournal(&source)
        .args(["export", "--output", "backup.json", "--no-readable"])
        .assert()
        .success();

    let target = TempDir::new().unwrap();
    add(&target, "Local win");
    let before = std::fs::read_to_string(target.child("journal.json").path()).unwrap();

    calmjournal(&target)
        .args(["import", source.child("backup.json").path().to_str().unwrap()])
        .env("CALMJOURNAL_IMPORT_PIN", "1111")
        .assert()
        .failure();

    let after = std::fs::read_to_string(target.child("journal.json").path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn export_writes_readable_copy() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Finished the puzzle");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .args(["export", "--output", "out.json"])
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success();

    tmp.child("out.json")
        .assert(predicate::str::contains("Finished the puzzle").not());
    tmp.child("out-readable.txt")
        .assert(predicate::str::contains("Finished the puzzle"))
        .assert(predicate::str::contains("Status: Decrypted for reading"));
}

#[cfg(unix)]
#[test]
fn readable_export_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    add(&tmp, "Private thought");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .args(["export", "--output", "out.json"])
        .env("CALMJOURNAL_PIN", "1234")
        .assert()
        .success();

    let mode = std::fs::metadata(tmp.child("out-readable.txt").path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn export_refuses_to_overwrite_journal() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Something");
    calmjournal(&tmp)
        .args(["export", "--output", "journal.json"])
        .assert()
        .failure();
}

#[test]
fn reset_backs_up_and_starts_fresh() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Forgotten win");
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .args(["reset", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started a fresh journal."));

    calmjournal(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unprotected"))
        .stdout(predicate::str::contains("Entries:   0"));

    let backups: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("calmjournal-encrypted-backup-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn file_flag_selects_journal() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .args(["--file", "other.json", "add", "Elsewhere"])
        .assert()
        .success();
    tmp.child("other.json").assert(predicate::path::exists());
    tmp.child("journal.json").assert(predicate::path::missing());
}

#[test]
fn config_file_sets_journal_name() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".calmjournal.toml")
        .write_str("journal_file = \"wins.json\"\n")
        .unwrap();
    add(&tmp, "Configured");
    tmp.child("wins.json").assert(predicate::path::exists());
}

#[test]
fn session_reads_commands_from_stdin() {
    let tmp = TempDir::new().unwrap();
    protect(&tmp, "1234");

    calmjournal(&tmp)
        .arg("session")
        .env("CALMJOURNAL_PIN", "1234")
        .write_stdin("add Typed in a session\nlist\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Typed in a session"));

    tmp.child("journal.json")
        .assert(predicate::str::contains("Typed in a session").not());
}

#[test]
fn completions_generate_script() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("calmjournal"));
}

#[test]
fn version_shows_name() {
    let tmp = TempDir::new().unwrap();
    calmjournal(&tmp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("calmjournal"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_lists_lock_events() {
    let tmp = TempDir::new().unwrap();
    add(&tmp, "Audited");
    protect(&tmp, "1234");
    calmjournal(&tmp)
        .arg("list")
        .env("CALMJOURNAL_PIN", "0000")
        .assert()
        .failure();

    calmjournal(&tmp)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("protect"))
        .stdout(predicate::str::contains("unlock-failed"));
}
