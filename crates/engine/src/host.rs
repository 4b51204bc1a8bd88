//! The persistence host: load/save orchestration for one document
//!
//! [`Persisted`] owns a user document, the closure hook registry, and the
//! module socket, and drives the pipeline in a fixed total order:
//!
//! - load: `before_load` -> read bytes -> `decrypt` (reverse order) ->
//!   `after_decrypt` -> empty check -> `before_deserialize` -> populate ->
//!   (`trying_recover` on failure) -> `after_deserialize` ->
//!   `after_load(success)`
//! - save: `before_save` -> open -> `before_serialize` -> serialize ->
//!   `after_serialize` -> `encrypt` -> `after_encrypt` -> truncate+write ->
//!   `after_save`
//!
//! A missing file on load fires `after_load(false)` and immediately saves
//! the in-memory defaults (first-run bootstrap). Population replaces the
//! document value but never the host state, so the resolved path and the
//! attached modules survive every load.
//!
//! ## Dispatch mechanics
//!
//! Module handlers receive `&mut Persisted<T>`. To make that borrow legal
//! the dispatcher takes the module out of its socket slot for the duration
//! of the call and restores it afterwards. A handler can therefore drive
//! `load_default`/`save` re-entrantly; sibling modules see the nested
//! pipeline, the running module does not see itself.

use crate::document::short_type_name;
use crate::hooks::{Hooks, RecoverOutcome};
use crate::module::Module;
use crate::socket::ModuleSocket;
use crate::Document;
use settle_core::{paths, Error, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fire one closure-hook list, preserving subscriptions added re-entrantly
/// by a callback.
macro_rules! fire_closures {
    ($host:expr, $field:ident, |$f:ident| $call:expr) => {{
        let mut subs = mem::take(&mut $host.hooks.$field);
        for $f in subs.iter_mut() {
            $call;
        }
        let newly = mem::replace(&mut $host.hooks.$field, subs);
        $host.hooks.$field.extend(newly);
    }};
}

/// Like `fire_closures!` for fallible hooks; the list is restored before
/// the first error propagates.
macro_rules! try_fire_closures {
    ($host:expr, $field:ident, |$f:ident| $call:expr) => {{
        let mut subs = mem::take(&mut $host.hooks.$field);
        let mut result: Result<()> = Ok(());
        for $f in subs.iter_mut() {
            if let Err(e) = $call {
                result = Err(e);
                break;
            }
        }
        let newly = mem::replace(&mut $host.hooks.$field, subs);
        $host.hooks.$field.extend(newly);
        result
    }};
}

/// Host wrapping one settings document with persistence behavior.
pub struct Persisted<T: Document> {
    doc: T,
    path: Option<PathBuf>,
    configured: bool,
    defaults: Box<dyn Fn() -> T + Send>,
    pub(crate) hooks: Hooks<T>,
    pub(crate) socket: ModuleSocket<T>,
}

impl<T: Document + Default> Persisted<T> {
    /// Wrap a document, using `T::default()` as the defaults factory for
    /// recovery and versioning rebuilds.
    pub fn new(doc: T) -> Self {
        Self::with_factory(doc, T::default)
    }
}

impl<T: Document> Persisted<T> {
    /// Wrap a document with an explicit defaults factory. The factory
    /// stands in for constructor arguments: recovery and versioning call
    /// it whenever they rebuild a default instance.
    pub fn with_factory(doc: T, defaults: impl Fn() -> T + Send + 'static) -> Self {
        Self {
            doc,
            path: None,
            configured: false,
            defaults: Box::new(defaults),
            hooks: Hooks::default(),
            socket: ModuleSocket::default(),
        }
    }

    /// Construct the document itself from the defaults factory.
    pub fn from_factory(defaults: impl Fn() -> T + Send + 'static) -> Self {
        let doc = defaults();
        Self::with_factory(doc, defaults)
    }

    /// Shared access to the document.
    pub fn doc(&self) -> &T {
        &self.doc
    }

    /// Mutable access to the document. Plain mutation does not persist;
    /// call [`Persisted::save`] or use the autosave wrapper.
    pub fn doc_mut(&mut self) -> &mut T {
        &mut self.doc
    }

    /// The resolved on-disk location, once a load/save established one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The closure hook registry.
    pub fn hooks(&mut self) -> &mut Hooks<T> {
        &mut self.hooks
    }

    /// The module socket (queries only; attach/detach live on the host).
    pub fn socket(&self) -> &ModuleSocket<T> {
        &self.socket
    }

    /// Mutable module socket access for in-place module reconfiguration.
    pub fn socket_mut(&mut self) -> &mut ModuleSocket<T> {
        &mut self.socket
    }

    /// Replace the defaults factory.
    pub fn set_defaults(&mut self, defaults: impl Fn() -> T + Send + 'static) {
        self.defaults = Box::new(defaults);
    }

    /// Resolve and pin the target file name ahead of the first load/save.
    ///
    /// # Errors
    ///
    /// Path resolution failures for empty or unusable names.
    pub fn set_file_name(&mut self, name: impl AsRef<Path>) -> Result<()> {
        self.path = Some(paths::resolve(name)?);
        Ok(())
    }

    pub(crate) fn set_resolved_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    // ========================================================================
    // Module lifecycle
    // ========================================================================

    /// Attach a module. Its `on_attach` validation runs first; a failure
    /// there leaves the socket untouched.
    ///
    /// # Errors
    ///
    /// The module's own validation error, or [`Error::Modularity`] when the
    /// socket is disposed.
    pub fn attach(&mut self, module: impl Module<T>) -> Result<()> {
        self.attach_boxed(Box::new(module))
    }

    /// Boxed form of [`Persisted::attach`].
    pub fn attach_boxed(&mut self, mut module: Box<dyn Module<T>>) -> Result<()> {
        if self.socket.is_disposed() {
            return Err(Error::Modularity(
                "cannot attach, the module socket is disposed".to_string(),
            ));
        }
        let type_id = module.as_any().type_id();
        if self
            .socket
            .slots
            .iter()
            .flatten()
            .any(|m| m.as_any().type_id() == type_id)
        {
            return Err(Error::Modularity(format!(
                "module {} is already attached",
                module.name()
            )));
        }
        module.on_attach(self)?;
        debug!(module = module.name(), "attaching module");
        self.socket.push(module)
    }

    /// Detach the first attached module of type `M`.
    ///
    /// # Errors
    ///
    /// [`Error::Modularity`] when no module of that type is attached.
    pub fn detach<M: Module<T>>(&mut self) -> Result<()> {
        let idx = self.socket.position::<M>().ok_or_else(|| {
            Error::Modularity(format!(
                "module of type {} is not attached",
                short_type_name::<M>()
            ))
        })?;
        if let Some(mut module) = self.socket.slots[idx].take() {
            debug!(module = module.name(), "detaching module");
            module.on_detach(self);
        }
        Ok(())
    }

    /// Detach and drop every attached module and close the socket.
    /// Idempotent: disposing twice is a no-op.
    pub fn dispose(&mut self) {
        if self.socket.is_disposed() {
            return;
        }
        self.socket.mark_disposed();
        for i in 0..self.socket.slots.len() {
            if let Some(mut module) = self.socket.slots[i].take() {
                module.on_detach(self);
            }
        }
    }

    // ========================================================================
    // Configure
    // ========================================================================

    /// Run the one-shot `configure` point now.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when configure already ran (explicitly or through
    /// a prior load/save).
    pub fn configure(&mut self) -> Result<()> {
        if self.configured {
            return Err(Error::Config(
                "configure may only run once per document".to_string(),
            ));
        }
        self.run_configure()
    }

    pub(crate) fn ensure_configured(&mut self) -> Result<()> {
        if self.configured {
            return Ok(());
        }
        self.run_configure()
    }

    fn run_configure(&mut self) -> Result<()> {
        self.configured = true;
        // Configure callbacks may register further configure callbacks;
        // keep draining until the list stays empty.
        loop {
            let subs = mem::take(&mut self.hooks.configure);
            if subs.is_empty() {
                return Ok(());
            }
            for f in subs {
                f(self)?;
            }
        }
    }

    // ========================================================================
    // Save
    // ========================================================================

    /// Persist the document to its resolved location.
    ///
    /// # Errors
    ///
    /// Path resolution, serialization, transform, or I/O failures; hook
    /// subscriber errors propagate unswallowed.
    pub fn save(&mut self) -> Result<()> {
        self.save_inner(None)
    }

    /// Persist the document to an explicit location, which becomes the new
    /// resolved location.
    pub fn save_to(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let target = paths::resolve(name)?;
        self.save_inner(Some(target))
    }

    fn save_inner(&mut self, explicit: Option<PathBuf>) -> Result<()> {
        // configure first: a configure callback may pin the file name
        self.ensure_configured()?;
        let mut path = match explicit {
            Some(p) => p,
            None => self.resolve_target()?,
        };
        self.fire_before_save(&mut path)?;

        self.fire_before_serialize();
        let mut text = self.to_json()?;
        self.fire_after_serialize(&mut text);
        let mut data = text.into_bytes();
        self.fire_encrypt(&mut data)?;
        self.fire_after_encrypt(&mut data)?;

        // The file is touched only once the payload is ready; a serialize
        // or transform failure must not leave an empty file behind, which
        // the next load would mistake for corruption.
        let mut file = OpenOptions::new()
            .read(false)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        file.set_len(0).map_err(|e| Error::io(&path, e))?;
        file.write_all(&data).map_err(|e| Error::io(&path, e))?;
        drop(file);
        self.path = Some(path.clone());
        debug!(path = %path.display(), bytes = data.len(), "saved settings document");

        self.fire_after_save(&path);
        Ok(())
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Load the document from its resolved location, bootstrapping the
    /// file from in-memory defaults when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Path resolution or I/O failures; [`Error::Corruption`] for empty or
    /// unparsable content no recovery module handled; versioning errors
    /// under the `Throw` action.
    pub fn load(&mut self) -> Result<()> {
        self.load_inner(None)
    }

    /// Load from an explicit location, which becomes the new resolved
    /// location.
    pub fn load_from(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let target = paths::resolve(name)?;
        self.load_inner(Some(target))
    }

    fn load_inner(&mut self, explicit: Option<PathBuf>) -> Result<()> {
        self.ensure_configured()?;
        let mut path = match explicit {
            Some(p) => p,
            None => self.resolve_target()?,
        };
        self.fire_before_load(&mut path)?;

        if !path.exists() {
            debug!(path = %path.display(), "settings file absent, bootstrapping defaults");
            self.fire_after_load(false)?;
            self.path = Some(path);
            return self.save();
        }

        let mut data = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        self.fire_decrypt(&mut data)?;
        self.fire_after_decrypt(&mut data)?;

        let mut text = String::from_utf8_lossy(&data).into_owned();
        if text.trim().is_empty() {
            warn!(path = %path.display(), "settings file is empty");
            let recovered = self.fire_trying_recover(&path, None)?;
            if !recovered {
                return Err(Error::corruption(&path, "the settings file is empty", None));
            }
            self.fire_recovered();
            self.fire_after_load(false)?;
            self.path = Some(path);
            return Ok(());
        }

        self.fire_before_deserialize(&mut text);
        if let Err(parse) = self.populate(&text) {
            warn!(path = %path.display(), error = %parse, "settings file failed to parse");
            let corruption = Error::corruption(
                &path,
                "unable to parse the settings document",
                Some(Box::new(parse)),
            );
            let recovered = self.fire_trying_recover(&path, Some(&corruption))?;
            if !recovered {
                return Err(corruption);
            }
            self.fire_recovered();
            self.fire_after_load(false)?;
            self.path = Some(path);
            return Ok(());
        }

        self.fire_after_deserialize();
        self.path = Some(path);
        self.fire_after_load(true)?;
        Ok(())
    }

    /// Rebuild the document from the defaults factory, through the same
    /// population codepath disk loads use, then fire `recovered` and
    /// `after_load(true)`.
    ///
    /// # Errors
    ///
    /// Serialization failures of the freshly built default instance.
    pub fn load_default(&mut self) -> Result<()> {
        let fresh = (self.defaults)();
        let text =
            serde_json::to_string_pretty(&fresh).map_err(|e| Error::Serialization(e.to_string()))?;
        self.populate(&text)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.fire_recovered();
        self.fire_after_load(true)?;
        Ok(())
    }

    /// Serialize the current document to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] when the document cannot be serialized.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.doc).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub(crate) fn populate(&mut self, text: &str) -> std::result::Result<(), serde_json::Error> {
        self.doc = serde_json::from_str(text)?;
        Ok(())
    }

    fn resolve_target(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let declared = self.doc.file_name();
        if declared.trim().is_empty() {
            return Err(Error::PathResolution(
                "the document declares no file name and none was configured".to_string(),
            ));
        }
        paths::resolve(declared)
    }

    // ========================================================================
    // Pipeline dispatch
    // ========================================================================

    fn for_each_module(
        &mut self,
        reverse: bool,
        mut f: impl FnMut(&mut Box<dyn Module<T>>, &mut Self) -> Result<()>,
    ) -> Result<()> {
        let len = self.socket.slots.len();
        let order: Vec<usize> = if reverse {
            (0..len).rev().collect()
        } else {
            (0..len).collect()
        };
        for i in order {
            let Some(mut module) = self.socket.slots[i].take() else {
                continue;
            };
            let result = f(&mut module, self);
            if !self.socket.is_disposed()
                && i < self.socket.slots.len()
                && self.socket.slots[i].is_none()
            {
                self.socket.slots[i] = Some(module);
            }
            result?;
        }
        Ok(())
    }

    fn fire_before_load(&mut self, path: &mut PathBuf) -> Result<()> {
        self.for_each_module(false, |m, host| {
            m.before_load(host, path);
            Ok(())
        })?;
        fire_closures!(self, before_load, |f| f(path));
        Ok(())
    }

    fn fire_decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        // Exact inverse of the encrypt order: closure transforms (already
        // stored in reverse subscription order) undo the outer layers,
        // modules in reverse attach order undo the inner ones.
        try_fire_closures!(self, decrypt, |f| f(data))?;
        self.for_each_module(true, |m, _| m.decrypt(data))
    }

    fn fire_after_decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        self.for_each_module(false, |m, _| m.after_decrypt(data))?;
        try_fire_closures!(self, after_decrypt, |f| f(data))
    }

    fn fire_before_deserialize(&mut self, text: &mut String) {
        let _ = self.for_each_module(false, |m, _| {
            m.before_deserialize(text);
            Ok(())
        });
        fire_closures!(self, before_deserialize, |f| f(text));
    }

    fn fire_trying_recover(&mut self, path: &Path, error: Option<&Error>) -> Result<bool> {
        let mut outcome = RecoverOutcome::default();
        self.for_each_module(false, |m, host| {
            m.trying_recover(host, path, error, &mut outcome)
        })?;
        try_fire_closures!(self, trying_recover, |f| f(path, error, &mut outcome))?;
        Ok(outcome.recovered)
    }

    fn fire_recovered(&mut self) {
        let _ = self.for_each_module(false, |m, host| {
            m.recovered(host);
            Ok(())
        });
        fire_closures!(self, recovered, |f| f(&self.doc));
    }

    fn fire_after_deserialize(&mut self) {
        let _ = self.for_each_module(false, |m, host| {
            m.after_deserialize(host);
            Ok(())
        });
        fire_closures!(self, after_deserialize, |f| f(&self.doc));
    }

    fn fire_after_load(&mut self, success: bool) -> Result<()> {
        self.for_each_module(false, |m, host| m.after_load(host, success))?;
        fire_closures!(self, after_load, |f| f(&self.doc, success));
        Ok(())
    }

    fn fire_before_save(&mut self, path: &mut PathBuf) -> Result<()> {
        self.for_each_module(false, |m, host| {
            m.before_save(host, path);
            Ok(())
        })?;
        fire_closures!(self, before_save, |f| f(path));
        Ok(())
    }

    fn fire_before_serialize(&mut self) {
        let _ = self.for_each_module(false, |m, host| {
            m.before_serialize(&mut host.doc);
            Ok(())
        });
        fire_closures!(self, before_serialize, |f| f(&mut self.doc));
    }

    fn fire_after_serialize(&mut self, text: &mut String) {
        let _ = self.for_each_module(false, |m, _| {
            m.after_serialize(text);
            Ok(())
        });
        fire_closures!(self, after_serialize, |f| f(text));
    }

    fn fire_encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        self.for_each_module(false, |m, _| m.encrypt(data))?;
        try_fire_closures!(self, encrypt, |f| f(data))
    }

    fn fire_after_encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        self.for_each_module(false, |m, _| m.after_encrypt(data))?;
        try_fire_closures!(self, after_encrypt, |f| f(data))
    }

    fn fire_after_save(&mut self, path: &Path) {
        let _ = self.for_each_module(false, |m, host| {
            m.after_save(host, path);
            Ok(())
        });
        fire_closures!(self, after_save, |f| f(&self.doc, path));
    }
}

impl<T: Document> fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("document", &short_type_name::<T>())
            .field("path", &self.path)
            .field("configured", &self.configured)
            .field("modules", &self.socket.names())
            .finish()
    }
}

impl<T: Document> Drop for Persisted<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
