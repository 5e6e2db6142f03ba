// Tests for the run pipeline
// End-to-end scenarios against on-disk and in-memory ledgers

use std::fs;
use std::path::{Path, PathBuf};

use digest_tool::config::{RunConfig, RunOptions};
use digest_tool::hash::{run, run_with_store, DigestToolError, MemoryLedgerStore, Status};

const MD5_ABC: &str = "900150983CD24FB0D6963F7D28E17F72";
const SHA1_ABC: &str = "A9993E364706816ABA3E25717850C26C9CD0D89D";

fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config(algorithm: &str, ledger: &Path, files: Vec<PathBuf>) -> RunConfig {
    RunConfig::new(algorithm, ledger, files, RunOptions::default()).unwrap()
}

fn lines(outcome: &digest_tool::hash::RunOutcome) -> Vec<String> {
    outcome.report.results.iter().map(|r| r.line(false)).collect()
}

#[test]
fn test_identical_files_collide_and_ledger_stays_empty() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");
    let b = create_test_file(dir.path(), "fileB.txt", b"abc");
    let store = MemoryLedgerStore::new(Some(""));

    let outcome = run_with_store(&config("MD5", Path::new("ledger.txt"), vec![a, b]), &store).unwrap();

    assert_eq!(
        lines(&outcome),
        vec![
            format!("fileA.txt MD5 {} COLLISION", MD5_ABC),
            format!("fileB.txt MD5 {} COLLISION", MD5_ABC),
        ]
    );
    assert_eq!(store.writes(), 0);
    assert_eq!(store.content().as_deref(), Some(""));
    assert!(!outcome.report.ledger_written);
}

#[test]
fn test_single_file_against_empty_ledger_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = create_test_file(dir.path(), "DigestListFile.txt", b"");
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");

    let outcome = run(&config("SHA1", &ledger, vec![a])).unwrap();

    assert_eq!(outcome.report.results[0].status, Status::NotFound);
    assert!(outcome.report.ledger_written);
    assert_eq!(
        fs::read_to_string(&ledger).unwrap(),
        format!("fileA.txt SHA1 {}\n", SHA1_ABC)
    );
    assert_eq!(outcome.ledger_before, "");
    assert_eq!(outcome.ledger_after, fs::read_to_string(&ledger).unwrap());
}

#[test]
fn test_second_run_is_ok_and_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");
    let b = create_test_file(dir.path(), "fileB.txt", b"xyz");
    let store = MemoryLedgerStore::new(Some(""));
    let cfg = config("SHA-256", Path::new("ledger.txt"), vec![a, b]);

    run_with_store(&cfg, &store).unwrap();
    let after_first = store.content();
    assert_eq!(store.writes(), 1);

    let outcome = run_with_store(&cfg, &store).unwrap();
    assert!(outcome.report.results.iter().all(|r| r.status == Status::Ok));
    assert_eq!(store.writes(), 1);
    assert_eq!(store.content(), after_first);
}

#[test]
fn test_unchanged_file_is_ok_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let original = format!("fileA.txt SHA1 {}\n", SHA1_ABC);
    let ledger = create_test_file(dir.path(), "ledger.txt", original.as_bytes());
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");
    let modified_before = fs::metadata(&ledger).unwrap().modified().unwrap();

    let outcome = run(&config("SHA1", &ledger, vec![a])).unwrap();

    assert_eq!(lines(&outcome), vec![format!("fileA.txt SHA1 {} OK", SHA1_ABC)]);
    assert_eq!(fs::read_to_string(&ledger).unwrap(), original);
    assert_eq!(fs::metadata(&ledger).unwrap().modified().unwrap(), modified_before);
}

#[test]
fn test_changed_file_is_not_ok_and_keeps_old_digest() {
    let dir = tempfile::tempdir().unwrap();
    let original = format!("fileA.txt SHA1 {}\n", SHA1_ABC);
    let ledger = create_test_file(dir.path(), "ledger.txt", original.as_bytes());
    let a = create_test_file(dir.path(), "fileA.txt", b"abcd");

    let outcome = run(&config("SHA1", &ledger, vec![a])).unwrap();

    assert_eq!(outcome.report.results[0].status, Status::NotOk);
    assert_ne!(outcome.report.results[0].digest_hex, SHA1_ABC);
    assert_eq!(fs::read_to_string(&ledger).unwrap(), original);
}

#[test]
fn test_collisions_are_reported_before_reconciled_files() {
    let dir = tempfile::tempdir().unwrap();
    let c = create_test_file(dir.path(), "c.txt", b"unique");
    let a = create_test_file(dir.path(), "a.txt", b"abc");
    let b = create_test_file(dir.path(), "b.txt", b"abc");
    let store = MemoryLedgerStore::new(Some(""));

    let outcome = run_with_store(&config("MD5", Path::new("l.txt"), vec![c, a, b]), &store).unwrap();

    let statuses: Vec<(&str, Status)> = outcome
        .report
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("a.txt", Status::Collision),
            ("b.txt", Status::Collision),
            ("c.txt", Status::NotFound),
        ]
    );
    let content = store.content().unwrap();
    assert!(content.starts_with("c.txt MD5 "));
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_digest_recorded_for_another_file_collides() {
    let dir = tempfile::tempdir().unwrap();
    let renamed = create_test_file(dir.path(), "copy.txt", b"abc");
    let text = format!("fileA.txt MD5 {}\n", MD5_ABC);
    let store = MemoryLedgerStore::new(Some(text.as_str()));

    let outcome = run_with_store(&config("md5", Path::new("l.txt"), vec![renamed]), &store).unwrap();

    assert_eq!(lines(&outcome), vec![format!("copy.txt MD5 {} COLLISION", MD5_ABC)]);
    assert_eq!(store.writes(), 0);
}

#[test]
fn test_missing_ledger_fails_unless_create() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");
    let ledger = dir.path().join("sub").join("ledger.txt");

    let err = run(&config("MD5", &ledger, vec![a.clone()])).unwrap_err();
    assert!(matches!(err, DigestToolError::FileNotFound { .. }));
    assert!(!ledger.exists());

    let options = RunOptions {
        create_missing: true,
        ..RunOptions::default()
    };
    let cfg = RunConfig::new("MD5", &ledger, vec![a], options).unwrap();
    run(&cfg).unwrap();
    assert_eq!(
        fs::read_to_string(&ledger).unwrap(),
        format!("fileA.txt MD5 {}\n", MD5_ABC)
    );
}

#[test]
fn test_malformed_ledger_aborts_without_touching_it() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = create_test_file(dir.path(), "ledger.txt", b"fileA.txt SHA1\n");
    let a = create_test_file(dir.path(), "fileB.txt", b"abc");

    let err = run(&config("SHA1", &ledger, vec![a])).unwrap_err();
    assert!(matches!(err, DigestToolError::MalformedLedgerRecord { line: 1, .. }));
    assert_eq!(fs::read_to_string(&ledger).unwrap(), "fileA.txt SHA1\n");
}

#[test]
fn test_unreadable_batch_file_aborts_before_ledger_change() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");
    let missing = dir.path().join("missing.txt");
    let store = MemoryLedgerStore::new(Some(""));

    let err = run_with_store(&config("MD5", Path::new("l.txt"), vec![a, missing]), &store).unwrap_err();
    assert!(matches!(err, DigestToolError::FileNotFound { .. }));
    assert_eq!(store.writes(), 0);
}

#[test]
fn test_new_algorithm_extends_existing_record() {
    let dir = tempfile::tempdir().unwrap();
    let original = format!("fileA.txt SHA1 {}\n", SHA1_ABC);
    let ledger = create_test_file(dir.path(), "ledger.txt", original.as_bytes());
    let a = create_test_file(dir.path(), "fileA.txt", b"abc");

    let outcome = run(&config("MD5", &ledger, vec![a])).unwrap();

    assert_eq!(outcome.report.results[0].status, Status::NotFound);
    assert_eq!(
        fs::read_to_string(&ledger).unwrap(),
        format!("fileA.txt SHA1 {} MD5 {}\n", SHA1_ABC, MD5_ABC)
    );
}

#[test]
fn test_same_basename_twice_records_two_entries() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("one")).unwrap();
    fs::create_dir(dir.path().join("two")).unwrap();
    let first = create_test_file(&dir.path().join("one"), "fileA.txt", b"abc");
    let second = create_test_file(&dir.path().join("two"), "fileA.txt", b"abcd");
    let store = MemoryLedgerStore::new(Some(""));

    let outcome = run_with_store(&config("MD5", Path::new("l.txt"), vec![first, second]), &store).unwrap();

    let statuses: Vec<Status> = outcome.report.results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::NotFound, Status::NotFound]);
    let content = store.content().unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.starts_with(&format!("fileA.txt MD5 {}\nfileA.txt MD5 ", MD5_ABC)));
}
