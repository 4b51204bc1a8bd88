//! Cross-thread handle over one persisted document
//!
//! [`Shared`] wraps a [`Persisted`] host in `Arc<Mutex>` so several threads
//! can read, mutate, and persist the same document. Every operation takes
//! the lock for its full duration; a save observed by one thread therefore
//! reflects every mutation completed before it.

use crate::host::Persisted;
use crate::Document;
use parking_lot::Mutex;
use settle_core::Result;
use std::sync::Arc;

/// Clonable, thread-safe handle to a [`Persisted`] host.
pub struct Shared<T: Document> {
    inner: Arc<Mutex<Persisted<T>>>,
}

impl<T: Document> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Document> Shared<T> {
    /// Wrap an existing host.
    pub fn new(host: Persisted<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(host)),
        }
    }

    /// Run `f` with exclusive access to the host.
    pub fn with<R>(&self, f: impl FnOnce(&mut Persisted<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Run `f` with shared access to the document only.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(self.inner.lock().doc())
    }

    /// Mutate the document and persist it under the same lock acquisition.
    ///
    /// # Errors
    ///
    /// Save pipeline failures.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut host = self.inner.lock();
        let out = f(host.doc_mut());
        host.save()?;
        Ok(out)
    }

    /// Persist the current document.
    ///
    /// # Errors
    ///
    /// Save pipeline failures.
    pub fn save(&self) -> Result<()> {
        self.inner.lock().save()
    }

    /// Reload the document from disk.
    ///
    /// # Errors
    ///
    /// Load pipeline failures.
    pub fn load(&self) -> Result<()> {
        self.inner.lock().load()
    }
}
