//! Closure subscribers for the load/save pipeline
//!
//! Every named pipeline point accepts any number of closure subscribers in
//! addition to attached modules. Subscribers fire in subscription order with
//! one exception: `decrypt` subscribers are prepended instead of appended,
//! so the last-registered transform is the first applied on decrypt. That
//! mirrors the encrypt order exactly and lets layered transforms ("encrypt
//! then base64-encode") undo themselves in reverse.
//!
//! Points that can meaningfully transform in-flight state receive it by
//! mutable reference (the target path, the byte buffer, the serialized
//! text); the rest observe the document.

use crate::host::Persisted;
use crate::Document;
use settle_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Outcome flags threaded through `trying_recover` subscribers.
///
/// `recovered` means the document is usable again; `handled` stops later
/// recovery subscribers from re-processing the same failure. Modules set
/// both on success.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecoverOutcome {
    /// The document was repaired and the load may complete
    pub recovered: bool,
    /// No further recovery subscriber should act on this failure
    pub handled: bool,
}

impl RecoverOutcome {
    /// Mark the failure as both recovered and handled.
    pub fn mark_handled(&mut self) {
        self.recovered = true;
        self.handled = true;
    }
}

pub(crate) type PathHook = Box<dyn FnMut(&mut PathBuf) + Send>;
pub(crate) type BytesHook = Box<dyn FnMut(&mut Vec<u8>) -> Result<()> + Send>;
pub(crate) type TextHook = Box<dyn FnMut(&mut String) + Send>;
pub(crate) type DocHook<T> = Box<dyn FnMut(&T) + Send>;
pub(crate) type DocMutHook<T> = Box<dyn FnMut(&mut T) + Send>;
pub(crate) type LoadedHook<T> = Box<dyn FnMut(&T, bool) + Send>;
pub(crate) type SavedHook<T> = Box<dyn FnMut(&T, &Path) + Send>;
pub(crate) type RecoverHook =
    Box<dyn FnMut(&Path, Option<&Error>, &mut RecoverOutcome) -> Result<()> + Send>;
pub(crate) type ConfigureHook<T> = Box<dyn FnOnce(&mut Persisted<T>) -> Result<()> + Send>;

/// Registry of closure subscribers, one ordered list per pipeline point.
pub struct Hooks<T: Document> {
    pub(crate) configure: Vec<ConfigureHook<T>>,
    pub(crate) before_load: Vec<PathHook>,
    pub(crate) decrypt: Vec<BytesHook>,
    pub(crate) after_decrypt: Vec<BytesHook>,
    pub(crate) before_deserialize: Vec<TextHook>,
    pub(crate) trying_recover: Vec<RecoverHook>,
    pub(crate) recovered: Vec<DocHook<T>>,
    pub(crate) after_deserialize: Vec<DocHook<T>>,
    pub(crate) after_load: Vec<LoadedHook<T>>,
    pub(crate) before_save: Vec<PathHook>,
    pub(crate) before_serialize: Vec<DocMutHook<T>>,
    pub(crate) after_serialize: Vec<TextHook>,
    pub(crate) encrypt: Vec<BytesHook>,
    pub(crate) after_encrypt: Vec<BytesHook>,
    pub(crate) after_save: Vec<SavedHook<T>>,
}

impl<T: Document> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            configure: Vec::new(),
            before_load: Vec::new(),
            decrypt: Vec::new(),
            after_decrypt: Vec::new(),
            before_deserialize: Vec::new(),
            trying_recover: Vec::new(),
            recovered: Vec::new(),
            after_deserialize: Vec::new(),
            after_load: Vec::new(),
            before_save: Vec::new(),
            before_serialize: Vec::new(),
            after_serialize: Vec::new(),
            encrypt: Vec::new(),
            after_encrypt: Vec::new(),
            after_save: Vec::new(),
        }
    }
}

impl<T: Document> Hooks<T> {
    /// Subscribe to `configure`; fires exactly once, before the first
    /// load/save, and may attach modules.
    pub fn on_configure(
        &mut self,
        f: impl FnOnce(&mut Persisted<T>) -> Result<()> + Send + 'static,
    ) {
        self.configure.push(Box::new(f));
    }

    /// Subscribe to `before_load`; may retarget the load path.
    pub fn on_before_load(&mut self, f: impl FnMut(&mut PathBuf) + Send + 'static) {
        self.before_load.push(Box::new(f));
    }

    /// Subscribe a decrypt transform. Prepended: the transform registered
    /// last runs first on decrypt.
    pub fn on_decrypt(&mut self, f: impl FnMut(&mut Vec<u8>) -> Result<()> + Send + 'static) {
        self.decrypt.insert(0, Box::new(f));
    }

    /// Subscribe to `after_decrypt`.
    pub fn on_after_decrypt(&mut self, f: impl FnMut(&mut Vec<u8>) -> Result<()> + Send + 'static) {
        self.after_decrypt.push(Box::new(f));
    }

    /// Subscribe to `before_deserialize`; may rewrite the in-flight text.
    pub fn on_before_deserialize(&mut self, f: impl FnMut(&mut String) + Send + 'static) {
        self.before_deserialize.push(Box::new(f));
    }

    /// Subscribe to `trying_recover`; fires only when the persisted content
    /// is empty or unparsable.
    pub fn on_trying_recover(
        &mut self,
        f: impl FnMut(&Path, Option<&Error>, &mut RecoverOutcome) -> Result<()> + Send + 'static,
    ) {
        self.trying_recover.push(Box::new(f));
    }

    /// Subscribe to `recovered`; fires after a document was defaulted or
    /// repaired.
    pub fn on_recovered(&mut self, f: impl FnMut(&T) + Send + 'static) {
        self.recovered.push(Box::new(f));
    }

    /// Subscribe to `after_deserialize`.
    pub fn on_after_deserialize(&mut self, f: impl FnMut(&T) + Send + 'static) {
        self.after_deserialize.push(Box::new(f));
    }

    /// Subscribe to `after_load`; the flag reports whether a persisted
    /// document was actually read.
    pub fn on_after_load(&mut self, f: impl FnMut(&T, bool) + Send + 'static) {
        self.after_load.push(Box::new(f));
    }

    /// Subscribe to `before_save`; may retarget the save path.
    pub fn on_before_save(&mut self, f: impl FnMut(&mut PathBuf) + Send + 'static) {
        self.before_save.push(Box::new(f));
    }

    /// Subscribe to `before_serialize`; may adjust the document right
    /// before it is serialized.
    pub fn on_before_serialize(&mut self, f: impl FnMut(&mut T) + Send + 'static) {
        self.before_serialize.push(Box::new(f));
    }

    /// Subscribe to `after_serialize`; may rewrite the serialized text.
    pub fn on_after_serialize(&mut self, f: impl FnMut(&mut String) + Send + 'static) {
        self.after_serialize.push(Box::new(f));
    }

    /// Subscribe an encrypt transform; fires in subscription order.
    pub fn on_encrypt(&mut self, f: impl FnMut(&mut Vec<u8>) -> Result<()> + Send + 'static) {
        self.encrypt.push(Box::new(f));
    }

    /// Subscribe to `after_encrypt`.
    pub fn on_after_encrypt(&mut self, f: impl FnMut(&mut Vec<u8>) -> Result<()> + Send + 'static) {
        self.after_encrypt.push(Box::new(f));
    }

    /// Subscribe to `after_save`.
    pub fn on_after_save(&mut self, f: impl FnMut(&T, &Path) + Send + 'static) {
        self.after_save.push(Box::new(f));
    }
}
