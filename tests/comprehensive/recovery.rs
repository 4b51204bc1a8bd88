//! Corruption recovery through the rename-aside ladder.

use crate::common::{read_json, CasualSettings};
use settle::{Error, FluentExt, Persisted, RecoveryAction};
use std::fs;
use tempfile::TempDir;

fn host_at(path: &std::path::Path, action: RecoveryAction) -> Persisted<CasualSettings> {
    Persisted::new(CasualSettings::default())
        .with_file_name(path)
        .unwrap()
        .with_recovery(action)
        .unwrap()
}

#[test]
fn test_corrupt_file_is_rescued_and_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "{\"greeting\": \"hi\", ").unwrap();

    let mut host = host_at(&path, RecoveryAction::RenameAndLoadDefault);
    host.load().unwrap();

    assert_eq!(*host.doc(), CasualSettings::default());
    // original bytes preserved under the first ladder slot
    assert_eq!(
        fs::read_to_string(dir.path().join("app.1.json")).unwrap(),
        "{\"greeting\": \"hi\", "
    );
    // fresh file written in place
    let on_disk: CasualSettings = read_json(&path);
    assert_eq!(on_disk, CasualSettings::default());
}

#[test]
fn test_repeated_corruption_walks_the_ladder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");

    for round in 1..=3u32 {
        fs::write(&path, format!("broken #{round}")).unwrap();
        let mut host = host_at(&path, RecoveryAction::RenameAndLoadDefault);
        host.load().unwrap();
    }

    for round in 1..=3u32 {
        let sibling = dir.path().join(format!("app.{round}.json"));
        assert_eq!(
            fs::read_to_string(&sibling).unwrap(),
            format!("broken #{round}")
        );
    }
}

#[test]
fn test_recovered_fires_on_rescue() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "not json").unwrap();

    let mut host = host_at(&path, RecoveryAction::LoadDefault);
    let recovered = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = recovered.clone();
    host.hooks()
        .on_recovered(move |_| flag.store(true, std::sync::atomic::Ordering::SeqCst));

    host.load().unwrap();
    assert!(recovered.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn test_throw_leaves_file_for_inspection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "not json").unwrap();

    let mut host = host_at(&path, RecoveryAction::Throw);
    assert!(matches!(host.load(), Err(Error::Recovery { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[test]
fn test_closure_recovery_without_module() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "not json").unwrap();

    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(&path).unwrap();
    host.hooks().on_trying_recover(|_, error, outcome| {
        assert!(error.is_some());
        outcome.mark_handled();
        Ok(())
    });
    host.load().unwrap();
    assert_eq!(host.doc().greeting, "hello");
}
