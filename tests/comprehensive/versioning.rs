//! Schema-version enforcement end to end.

use crate::common::{read_json, VersionedSettings, CURRENT_VERSION};
use settle::{Error, FluentExt, Persisted, Version, VersioningResultAction};
use std::fs;
use tempfile::TempDir;

fn write_versioned(path: &std::path::Path, version: Version, threshold: u32) {
    let doc = VersionedSettings { version, threshold };
    fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

fn host_at(
    path: &std::path::Path,
    action: VersioningResultAction,
) -> Persisted<VersionedSettings> {
    Persisted::new(VersionedSettings::default())
        .with_file_name(path)
        .unwrap()
        .with_versioning(CURRENT_VERSION, action)
        .unwrap()
}

#[test]
fn test_outdated_file_is_renamed_with_its_own_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    write_versioned(&path, Version::new(1, 0, 0, 0), 55);

    let mut host = host_at(&path, VersioningResultAction::RenameAndLoadDefault);
    host.load().unwrap();

    assert_eq!(host.doc().threshold, 100);
    assert_eq!(host.doc().version, CURRENT_VERSION);

    let rescued: VersionedSettings = read_json(&dir.path().join("app.1.0.0.0.json"));
    assert_eq!(rescued.threshold, 55);
    let fresh: VersionedSettings = read_json(&path);
    assert_eq!(fresh.version, CURRENT_VERSION);
}

#[test]
fn test_rename_ladder_grows_counters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");

    for _ in 0..3 {
        write_versioned(&path, Version::new(1, 0, 0, 0), 55);
        let mut host = host_at(&path, VersioningResultAction::RenameAndLoadDefault);
        host.load().unwrap();
    }

    assert!(dir.path().join("app.1.0.0.0.json").exists());
    assert!(dir.path().join("app.1.0.0.0-2.json").exists());
    assert!(dir.path().join("app.1.0.0.0-3.json").exists());
}

#[test]
fn test_throw_surfaces_both_versions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    write_versioned(&path, Version::new(9, 9, 0, 0), 55);

    let mut host = host_at(&path, VersioningResultAction::Throw);
    match host.load() {
        Err(Error::InvalidVersion { actual, expected }) => {
            assert_eq!(actual, Version::new(9, 9, 0, 0));
            assert_eq!(expected, CURRENT_VERSION);
        }
        other => panic!("expected InvalidVersion, got {other:?}"),
    }
    // the mismatched file stays on disk exactly as it was
    let untouched: VersionedSettings = read_json(&path);
    assert_eq!(untouched.version, Version::new(9, 9, 0, 0));
    assert_eq!(untouched.threshold, 55);
}

#[test]
fn test_policy_can_tolerate_revision_drift() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    write_versioned(&path, Version::new(2, 1, 7, 3), 55);

    let mut host = Persisted::new(VersionedSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_versioning_policy(
            CURRENT_VERSION,
            VersioningResultAction::Throw,
            |loaded, expected| loaded.major == expected.major && loaded.minor == expected.minor,
        )
        .unwrap();
    host.load().unwrap();
    assert_eq!(host.doc().threshold, 55);
}

#[test]
fn test_version_survives_the_document_body_as_string() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    Persisted::new(VersionedSettings::default())
        .with_file_name(&path)
        .unwrap()
        .save_now()
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"2.1.0.0\""));
}

#[test]
fn test_recovery_and_versioning_compose() {
    // corrupt file: recovery rescues it, versioning stamps the rebuilt
    // document with the enforced version
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "garbage").unwrap();

    let mut host = Persisted::new(VersionedSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_recovery(settle::RecoveryAction::RenameAndLoadDefault)
        .unwrap()
        .with_versioning(CURRENT_VERSION, VersioningResultAction::Throw)
        .unwrap();
    host.load().unwrap();

    assert_eq!(host.doc().version, CURRENT_VERSION);
    // the recovery rescue carries the document's version in its name
    assert!(dir.path().join("app.2.1.0.0.json").exists());
}
