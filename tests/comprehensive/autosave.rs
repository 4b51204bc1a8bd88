//! Change-driven autosaving and suspension.

use crate::common::{read_json, Prefs};
use settle::{
    AutosaveExt, AutosaveModule, AutosavingState, Error, FluentExt, Observe, Persisted,
    RecoveryAction,
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn prefs_at(path: &Path) -> (settle::Autosaved<Prefs>, Arc<AtomicUsize>) {
    let saves = Arc::new(AtomicUsize::new(0));
    let counter = saves.clone();
    let mut host = Persisted::new(Prefs::default())
        .with_file_name(path)
        .unwrap();
    host.hooks().on_after_save(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (host.with_autosave().unwrap(), saves)
}

#[test]
fn test_tracked_change_saves_immediately() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    prefs.edit(|p| *p.theme = "dark".to_string()).unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 1);
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.theme, "dark");
}

#[test]
fn test_untracked_field_never_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    prefs.edit(|p| p.session_note = "ephemeral".to_string()).unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 0);
    assert!(!path.exists());
}

#[test]
fn test_replacing_a_tracked_member_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    prefs
        .edit(|p| p.theme = Observe::new("solarized".to_string()))
        .unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 1);
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.theme, "solarized");
}

#[test]
fn test_tracked_container_entries_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    prefs
        .edit(|p| p.favorites.push(Observe::new("home".to_string())))
        .unwrap();
    // the pushed entry is wired during the rebind pass, which itself
    // registers as a change
    assert_eq!(saves.load(Ordering::SeqCst), 1);

    prefs.edit(|p| p.favorites[0].push_str("page")).unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 2);
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.favorites[0], "homepage");
}

#[test]
fn test_suspension_coalesces_to_one_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    {
        let mut scope = prefs.suspend();
        scope.edit(|p| *p.volume = 10).unwrap();
        scope.edit(|p| *p.volume = 20).unwrap();
        scope.edit(|p| *p.theme = "dark".to_string()).unwrap();
        assert_eq!(saves.load(Ordering::SeqCst), 0);
        assert_eq!(scope.state(), AutosavingState::SuspendedChanged);
    }

    assert_eq!(saves.load(Ordering::SeqCst), 1);
    assert_eq!(prefs.state(), AutosavingState::Running);
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.volume, 20);
    assert_eq!(*on_disk.theme, "dark");
}

#[test]
fn test_clean_suspension_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, saves) = prefs_at(&path);

    {
        let mut scope = prefs.suspend();
        scope.edit(|p| p.session_note = "no tracked change".to_string()).unwrap();
        scope.resume().unwrap();
    }
    assert_eq!(saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_autosave_state_visible_through_socket() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    let (mut prefs, _saves) = prefs_at(&path);

    {
        let module = prefs.host().socket().get::<AutosaveModule>().unwrap();
        assert_eq!(module.state(), AutosavingState::Running);
    }
    let scope = prefs.suspend();
    let module = scope.host().socket().get::<AutosaveModule>().unwrap();
    assert!(module.is_suspended());
}

#[test]
fn test_load_then_edit_persists_both_ways() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    {
        let (mut prefs, _) = prefs_at(&path);
        prefs.edit(|p| *p.volume = 44).unwrap();
    }

    let (mut prefs, _) = prefs_at(&path);
    prefs.load().unwrap();
    assert_eq!(*prefs.get().volume, 44);

    prefs.edit(|p| *p.volume += 1).unwrap();
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.volume, 45);
}

#[test]
fn test_autosave_composes_with_recovery() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, "garbage").unwrap();

    let mut prefs = Persisted::new(Prefs::default())
        .with_file_name(&path)
        .unwrap()
        .with_recovery(RecoveryAction::RenameAndLoadDefault)
        .unwrap()
        .with_autosave()
        .unwrap();
    prefs.load().unwrap();

    prefs.edit(|p| *p.volume = 7).unwrap();
    let on_disk: Prefs = read_json(&path);
    assert_eq!(*on_disk.volume, 7);
    assert!(dir.path().join("prefs.1.json").exists());
}

#[test]
fn test_edit_without_path_surfaces_save_error() {
    let mut prefs = Persisted::new(Prefs::default()).with_autosave().unwrap();
    let err = prefs.edit(|p| *p.volume = 1).unwrap_err();
    assert!(matches!(err, Error::PathResolution(_)));
}
