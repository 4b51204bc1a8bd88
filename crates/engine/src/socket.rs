//! Attach/detach registry of modules for one host
//!
//! The socket owns the attached modules of exactly one [`Persisted`]
//! document. Slots keep their index for the lifetime of the socket (detach
//! empties a slot instead of shifting its neighbors) so pipeline dispatch
//! can walk stable indices while handlers attach or detach modules.
//!
//! Attach and detach themselves live on [`Persisted`] because module
//! lifecycle callbacks need the host; the socket exposes the queries.

use crate::module::Module;
use crate::Document;
use settle_core::{Error, Result};
use std::fmt;

/// Ordered collection of modules attached to one document host.
pub struct ModuleSocket<T: Document> {
    pub(crate) slots: Vec<Option<Box<dyn Module<T>>>>,
    disposed: bool,
}

impl<T: Document> Default for ModuleSocket<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            disposed: false,
        }
    }
}

impl<T: Document> ModuleSocket<T> {
    /// Number of currently attached modules.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when no module is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the socket was disposed; attaching afterwards fails.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// First attached module of type `M`.
    ///
    /// # Errors
    ///
    /// [`Error::Modularity`] when no module of that type is attached.
    pub fn get<M: Module<T>>(&self) -> Result<&M> {
        self.slots
            .iter()
            .flatten()
            .find_map(|m| m.as_any().downcast_ref::<M>())
            .ok_or_else(|| module_not_found::<M>())
    }

    /// Mutable access to the first attached module of type `M`.
    ///
    /// # Errors
    ///
    /// [`Error::Modularity`] when no module of that type is attached.
    pub fn get_mut<M: Module<T>>(&mut self) -> Result<&mut M> {
        self.slots
            .iter_mut()
            .flatten()
            .find_map(|m| m.as_any_mut().downcast_mut::<M>())
            .ok_or_else(|| module_not_found::<M>())
    }

    /// Whether a module of type `M` is attached.
    pub fn is_attached<M: Module<T>>(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|m| m.as_any().is::<M>())
    }

    /// Names of attached modules, in attach order.
    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().flatten().map(|m| m.name()).collect()
    }

    pub(crate) fn push(&mut self, module: Box<dyn Module<T>>) -> Result<()> {
        if self.disposed {
            return Err(Error::Modularity(
                "cannot attach, the module socket is disposed".to_string(),
            ));
        }
        self.slots.push(Some(module));
        Ok(())
    }

    pub(crate) fn position<M: Module<T>>(&self) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .map_or(false, |m| m.as_any().is::<M>())
        })
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}

impl<T: Document> fmt::Debug for ModuleSocket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSocket")
            .field("modules", &self.names())
            .field("disposed", &self.disposed)
            .finish()
    }
}

fn module_not_found<M>() -> Error {
    Error::Modularity(format!(
        "module of type {} was not found",
        crate::document::short_type_name::<M>()
    ))
}
