//! Scoped suspension of autosaving

use crate::autosaved::Autosaved;
use crate::observe::Track;
use settle_core::Result;
use settle_engine::Document;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Guard that withholds saves while it lives.
///
/// Dereferences to the wrapper, so edits run unchanged inside the scope;
/// each tracked change merely flips the pending flag instead of writing.
/// [`SuspendAutosave::resume`] flushes the pending save and reports its
/// outcome; dropping the guard without resuming flushes too, logging any
/// failure it cannot return.
pub struct SuspendAutosave<'a, T: Document + Track> {
    owner: &'a mut Autosaved<T>,
    resumed: bool,
}

impl<'a, T: Document + Track> SuspendAutosave<'a, T> {
    pub(crate) fn new(owner: &'a mut Autosaved<T>) -> Self {
        Self {
            owner,
            resumed: false,
        }
    }

    /// Resume autosaving, flushing at most one pending save. Idempotent:
    /// later calls (and the eventual drop) are no-ops.
    ///
    /// # Errors
    ///
    /// Save pipeline failures from the flush.
    pub fn resume(&mut self) -> Result<()> {
        if self.resumed {
            return Ok(());
        }
        self.resumed = true;
        self.owner.flush_resume()
    }
}

impl<T: Document + Track> Deref for SuspendAutosave<'_, T> {
    type Target = Autosaved<T>;

    fn deref(&self) -> &Autosaved<T> {
        self.owner
    }
}

impl<T: Document + Track> DerefMut for SuspendAutosave<'_, T> {
    fn deref_mut(&mut self) -> &mut Autosaved<T> {
        self.owner
    }
}

impl<T: Document + Track> Drop for SuspendAutosave<'_, T> {
    fn drop(&mut self) {
        if self.resumed {
            return;
        }
        self.resumed = true;
        if let Err(e) = self.owner.flush_resume() {
            warn!(error = %e, "autosave flush at scope exit failed");
        }
    }
}
