//! The module trait: pluggable behavior bound to one host
//!
//! A module implements default-no-op methods, one per pipeline point, and
//! overrides the points it cares about; the vtable is its subscription set.
//! Handlers receive the host by mutable reference for the duration of the
//! call only; a module never stores a handle to its document, so a kept
//! module cannot keep a dropped host alive.
//!
//! While a module's handler runs, its own socket slot is empty. A handler
//! driving `load_default`/`save` re-entrantly therefore cannot re-enter
//! itself, though sibling modules do observe the nested pipeline.

use crate::host::Persisted;
use crate::hooks::RecoverOutcome;
use crate::Document;
use settle_core::{Error, Result};
use std::any::Any;
use std::path::{Path, PathBuf};

/// Pluggable behavior attached to a [`Persisted`] host via its socket.
///
/// `as_any`/`as_any_mut` enable typed lookup through
/// [`crate::ModuleSocket::get`]; implement them as `self` returns.
#[allow(unused_variables)]
pub trait Module<T: Document>: Any + Send {
    /// Stable, human-readable module name for diagnostics.
    fn name(&self) -> &'static str;

    /// Upcast for typed socket queries.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed socket queries.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Called while attaching, before the module enters the socket.
    /// Failing here aborts the attach (capability validation lives here).
    fn on_attach(&mut self, host: &mut Persisted<T>) -> Result<()> {
        Ok(())
    }

    /// Called while detaching, after the module left the socket.
    fn on_detach(&mut self, host: &mut Persisted<T>) {}

    /// `before_load`: the resolved target path, still retargetable.
    fn before_load(&mut self, host: &mut Persisted<T>, path: &mut PathBuf) {}

    /// `decrypt` transform over the raw file bytes. Modules fire in
    /// reverse attach order here.
    fn decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    /// `after_decrypt` over the plaintext bytes.
    fn after_decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    /// `before_deserialize` over the decoded text.
    fn before_deserialize(&mut self, text: &mut String) {}

    /// `trying_recover`: the persisted content was empty or unparsable.
    /// A module that repairs the document marks the outcome handled.
    fn trying_recover(
        &mut self,
        host: &mut Persisted<T>,
        path: &Path,
        error: Option<&Error>,
        outcome: &mut RecoverOutcome,
    ) -> Result<()> {
        Ok(())
    }

    /// `recovered`: the document was defaulted or repaired successfully.
    fn recovered(&mut self, host: &mut Persisted<T>) {}

    /// `after_deserialize`: the document was populated from disk.
    fn after_deserialize(&mut self, host: &mut Persisted<T>) {}

    /// `after_load`: the load sequence finished; `success` reports whether
    /// a persisted document was actually read.
    fn after_load(&mut self, host: &mut Persisted<T>, success: bool) -> Result<()> {
        Ok(())
    }

    /// `before_save`: the resolved target path, still retargetable.
    fn before_save(&mut self, host: &mut Persisted<T>, path: &mut PathBuf) {}

    /// `before_serialize` over the document about to be serialized.
    fn before_serialize(&mut self, doc: &mut T) {}

    /// `after_serialize` over the serialized text.
    fn after_serialize(&mut self, text: &mut String) {}

    /// `encrypt` transform over the outgoing bytes, in attach order.
    fn encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    /// `after_encrypt` over the ciphertext bytes.
    fn after_encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    /// `after_save`: the bytes reached disk at `path`.
    fn after_save(&mut self, host: &mut Persisted<T>, path: &Path) {}
}
