//! Load/save pipeline behavior through the public surface.

use crate::common::{read_json, CasualSettings};
use settle::{Error, FluentExt, Persisted, Shared};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_first_load_bootstraps_file_from_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");

    let host = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .load_now()
        .unwrap();

    assert_eq!(host.doc().greeting, "hello");
    let on_disk: CasualSettings = read_json(&path);
    assert_eq!(on_disk, CasualSettings::default());
}

#[test]
fn test_bootstrap_reports_after_load_false() {
    let dir = TempDir::new().unwrap();
    let seen = Arc::new(AtomicUsize::new(usize::MAX));
    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(dir.path().join("app.json")).unwrap();
    let flag = seen.clone();
    host.hooks()
        .on_after_load(move |_, ok| flag.store(usize::from(ok), Ordering::SeqCst));
    host.load().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    // second load reads the bootstrapped file
    host.load().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_save_and_reload_preserves_mutations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");

    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(&path).unwrap();
    host.doc_mut().greeting = "bonjour".to_string();
    host.doc_mut().retries = 9;
    host.save().unwrap();

    let mut fresh = Persisted::new(CasualSettings::default());
    fresh.set_file_name(&path).unwrap();
    fresh.load().unwrap();
    assert_eq!(fresh.doc().greeting, "bonjour");
    assert_eq!(fresh.doc().retries, 9);
}

#[test]
fn test_save_truncates_longer_previous_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "x".repeat(4096)).unwrap();

    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(&path).unwrap();
    host.save().unwrap();

    let on_disk: CasualSettings = read_json(&path);
    assert_eq!(on_disk, CasualSettings::default());
}

#[test]
fn test_empty_file_is_corruption_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "").unwrap();

    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(&path).unwrap();
    assert!(matches!(host.load(), Err(Error::Corruption { .. })));
}

#[test]
fn test_unresolvable_document_errors() {
    let mut host = Persisted::new(CasualSettings::default());
    assert!(matches!(host.load(), Err(Error::PathResolution(_))));
    assert!(matches!(host.save(), Err(Error::PathResolution(_))));
}

#[test]
fn test_explicit_path_becomes_the_resolved_path() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let mut host = Persisted::new(CasualSettings::default());
    host.save_to(&first).unwrap();
    assert_eq!(host.path().unwrap(), first.as_path());

    host.doc_mut().retries = 1;
    host.save_to(&second).unwrap();
    assert_eq!(host.path().unwrap(), second.as_path());

    // plain save now targets the second file
    host.doc_mut().retries = 2;
    host.save().unwrap();
    let on_disk: CasualSettings = read_json(&second);
    assert_eq!(on_disk.retries, 2);
    let untouched: CasualSettings = read_json(&first);
    assert_eq!(untouched.retries, 3);
}

#[test]
fn test_shared_handle_serializes_concurrent_updates() {
    let dir = TempDir::new().unwrap();
    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(dir.path().join("shared.json")).unwrap();
    host.doc_mut().retries = 0;
    host.save().unwrap();
    let shared = Shared::new(host);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    shared.update(|doc| doc.retries += 1).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    shared.load().unwrap();
    assert_eq!(shared.read(|doc| doc.retries), 40);
}

#[test]
fn test_configure_hook_attaches_modules_lazily() {
    let dir = TempDir::new().unwrap();
    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(dir.path().join("app.json")).unwrap();
    host.hooks().on_configure(|host| {
        host.attach(settle::Base64Module)?;
        Ok(())
    });
    assert!(host.socket().is_empty());

    host.save().unwrap();
    assert!(host.socket().is_attached::<settle::Base64Module>());
    let raw = fs::read_to_string(dir.path().join("app.json")).unwrap();
    assert!(!raw.contains("greeting"));
}
