//! The autosaving wrapper around a persisted host

use crate::observe::Track;
use crate::state::{AutosaveModule, AutosavingState, SharedState};
use crate::suspend::SuspendAutosave;
use crate::tracker::ChangeTracker;
use settle_core::Result;
use settle_engine::{Document, Persisted};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Wrapper that persists the document after every tracked change.
///
/// All mutation flows through [`Autosaved::edit`]; the wrapper exposes the
/// document read-only otherwise, which is what makes change interception
/// airtight. The underlying host stays reachable through
/// [`Autosaved::host`] / [`Autosaved::host_mut`] for hook and module
/// configuration.
pub struct Autosaved<T: Document + Track> {
    host: Persisted<T>,
    tracker: ChangeTracker,
    state: SharedState,
}

impl<T: Document + Track> Autosaved<T> {
    /// Wrap a host, attaching the [`AutosaveModule`] marker and binding
    /// every observed field to the wrapper's tracker.
    ///
    /// # Errors
    ///
    /// Module attach failures (disposed socket).
    pub fn enable(mut host: Persisted<T>) -> Result<Self> {
        let state = SharedState::default();
        host.attach(AutosaveModule::new(state.clone()))?;
        let mut wrapper = Self {
            host,
            tracker: ChangeTracker::new(),
            state,
        };
        wrapper.rebind();
        Ok(wrapper)
    }

    fn rebind(&mut self) {
        let tracker = self.tracker.clone();
        self.host.doc_mut().rebind(&tracker);
    }

    /// Read-only access to the document.
    pub fn get(&self) -> &T {
        self.host.doc()
    }

    /// The wrapped host, for hooks, modules, and path configuration.
    pub fn host(&self) -> &Persisted<T> {
        &self.host
    }

    /// Mutable host access. Document mutations made through this bypass
    /// change tracking; prefer [`Autosaved::edit`].
    pub fn host_mut(&mut self) -> &mut Persisted<T> {
        &mut self.host
    }

    /// Current autosave state.
    pub fn state(&self) -> AutosavingState {
        self.state.get()
    }

    /// Load the document, then rebind the freshly deserialized fields.
    ///
    /// # Errors
    ///
    /// Load pipeline failures.
    pub fn load(&mut self) -> Result<()> {
        self.host.load()?;
        self.rebind();
        Ok(())
    }

    /// Load from an explicit location, then rebind.
    ///
    /// # Errors
    ///
    /// Load pipeline failures.
    pub fn load_from(&mut self, name: impl AsRef<Path>) -> Result<()> {
        self.host.load_from(name)?;
        self.rebind();
        Ok(())
    }

    /// Save unconditionally, regardless of tracked changes or suspension.
    ///
    /// # Errors
    ///
    /// Save pipeline failures.
    pub fn save(&mut self) -> Result<()> {
        self.host.save()
    }

    /// Mutate the document. When the closure touched a tracked field the
    /// document is saved (or, under suspension, queued for the flush).
    ///
    /// # Errors
    ///
    /// Save pipeline failures from the triggered save.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let before = self.tracker.generation();
        let out = f(self.host.doc_mut());
        // values assigned inside the closure carry unbound trackers; the
        // rebind wires them up and records the replacement as a change
        self.rebind();
        if self.tracker.changed_since(before) {
            self.commit()?;
        }
        Ok(out)
    }

    pub(crate) fn commit(&mut self) -> Result<()> {
        match self.state.get() {
            AutosavingState::Running => {
                debug!("tracked change, autosaving");
                self.host.save()
            }
            AutosavingState::Suspended | AutosavingState::SuspendedChanged => {
                self.state.set(AutosavingState::SuspendedChanged);
                Ok(())
            }
        }
    }

    /// Withhold saves until the returned guard resumes or leaves scope.
    /// Any number of edits inside the scope flush as at most one save.
    pub fn suspend(&mut self) -> SuspendAutosave<'_, T> {
        self.state.set(AutosavingState::Suspended);
        SuspendAutosave::new(self)
    }

    pub(crate) fn flush_resume(&mut self) -> Result<()> {
        let pending = self.state.get() == AutosavingState::SuspendedChanged;
        self.state.set(AutosavingState::Running);
        if pending {
            debug!("resuming autosave with pending changes, flushing");
            self.host.save()
        } else {
            Ok(())
        }
    }

    /// Detach autosaving and hand the plain host back.
    pub fn into_inner(self) -> Persisted<T> {
        let Self { mut host, .. } = self;
        let _ = host.detach::<AutosaveModule>();
        host
    }
}

/// Fluent entry into autosaving.
pub trait AutosaveExt<T: Document + Track> {
    /// Wrap this host in an [`Autosaved`].
    ///
    /// # Errors
    ///
    /// Module attach failures (disposed socket).
    fn with_autosave(self) -> Result<Autosaved<T>>;
}

impl<T: Document + Track> AutosaveExt<T> for Persisted<T> {
    fn with_autosave(self) -> Result<Autosaved<T>> {
        Autosaved::enable(self)
    }
}

impl<T: Document + Track> fmt::Debug for Autosaved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autosaved")
            .field("host", &self.host)
            .field("state", &self.state.get())
            .finish()
    }
}
