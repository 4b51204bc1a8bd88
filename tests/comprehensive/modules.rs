//! Payload transform modules and socket behavior.

use crate::common::CasualSettings;
use settle::{Base64Module, CipherModule, Error, FluentExt, Module, Persisted};
use std::any::Any;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_base64_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encoded.json");

    let mut host = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_base64()
        .unwrap();
    host.doc_mut().greeting = "encoded".to_string();
    host.save().unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains('{'));

    let fresh = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_base64()
        .unwrap()
        .load_now()
        .unwrap();
    assert_eq!(fresh.doc().greeting, "encoded");
}

#[test]
fn test_encrypted_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.json");

    let mut host = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter2")
        .unwrap();
    host.doc_mut().retries = 12;
    host.save().unwrap();

    let fresh = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter2")
        .unwrap()
        .load_now()
        .unwrap();
    assert_eq!(fresh.doc().retries, 12);
}

#[test]
fn test_wrong_password_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.json");

    Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter2")
        .unwrap()
        .save_now()
        .unwrap();

    let mut fresh = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter3")
        .unwrap();
    assert!(matches!(fresh.load(), Err(Error::InvalidPassword)));
}

#[test]
fn test_cipher_then_base64_layering() {
    // attach order: cipher first, base64 second; the file is base64 text
    // of ciphertext, and decrypt undoes the layers in reverse
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layered.json");

    let mut host = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter2")
        .unwrap()
        .with_base64()
        .unwrap();
    host.doc_mut().greeting = "layered".to_string();
    host.save().unwrap();

    let raw = fs::read(&path).unwrap();
    assert!(raw.iter().all(|b| b.is_ascii()));

    let fresh = Persisted::new(CasualSettings::default())
        .with_file_name(&path)
        .unwrap()
        .with_encryption("hunter2")
        .unwrap()
        .with_base64()
        .unwrap()
        .load_now()
        .unwrap();
    assert_eq!(fresh.doc().greeting, "layered");
}

/// Counts pipeline traffic; used to verify re-entrant dispatch.
#[derive(Default)]
struct ProbeModule {
    saves: Arc<AtomicUsize>,
}

impl Module<CasualSettings> for ProbeModule {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn after_save(&mut self, _host: &mut Persisted<CasualSettings>, _path: &Path) {
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_sibling_modules_observe_reentrant_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, "garbage").unwrap();

    let saves = Arc::new(AtomicUsize::new(0));
    let mut host = Persisted::new(CasualSettings::default());
    host.set_file_name(&path).unwrap();
    host.attach(ProbeModule {
        saves: saves.clone(),
    })
    .unwrap();
    host.attach(settle::RecoveryModule::new(
        settle::RecoveryAction::LoadDefaultAndSave,
    ))
    .unwrap();

    // the recovery module saves re-entrantly from inside the load; the
    // probe module observes that nested save
    host.load().unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 1);

    host.save().unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 2);
}

#[test]
fn test_socket_lookup_and_detach() {
    let mut host = Persisted::new(CasualSettings::default())
        .with_base64()
        .unwrap();
    assert!(host.socket().is_attached::<Base64Module>());
    assert_eq!(host.socket().names(), vec!["base64"]);
    assert!(host.socket().get::<CipherModule>().is_err());

    host.detach::<Base64Module>().unwrap();
    assert!(host.socket().is_empty());
    assert!(matches!(
        host.detach::<Base64Module>(),
        Err(Error::Modularity(_))
    ));
}

#[test]
fn test_disposed_host_rejects_modules() {
    let mut host = Persisted::new(CasualSettings::default())
        .with_base64()
        .unwrap();
    host.dispose();
    assert!(host.socket().is_disposed());
    assert!(host.socket().is_empty());
    assert!(matches!(
        host.attach(Base64Module),
        Err(Error::Modularity(_))
    ));
}
