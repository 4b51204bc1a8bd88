//! Autosave run state, shared with the attached marker module

use settle_engine::{Document, Module};
use std::any::Any;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Whether autosave is currently writing, withholding, or withholding with
/// a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosavingState {
    /// Every tracked change saves immediately.
    Running,
    /// Saves are withheld; nothing changed since the suspension.
    Suspended,
    /// Saves are withheld and at least one change is pending flush.
    SuspendedChanged,
}

/// State cell shared between the [`Autosaved`](crate::Autosaved) wrapper
/// and its attached [`AutosaveModule`].
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState {
    cell: Arc<AtomicU8>,
}

impl SharedState {
    pub(crate) fn get(&self) -> AutosavingState {
        match self.cell.load(Ordering::Acquire) {
            1 => AutosavingState::Suspended,
            2 => AutosavingState::SuspendedChanged,
            _ => AutosavingState::Running,
        }
    }

    pub(crate) fn set(&self, state: AutosavingState) {
        let raw = match state {
            AutosavingState::Running => 0,
            AutosavingState::Suspended => 1,
            AutosavingState::SuspendedChanged => 2,
        };
        self.cell.store(raw, Ordering::Release);
    }
}

/// Marker module attached by [`Autosaved::enable`](crate::Autosaved::enable).
///
/// Carries no pipeline behavior; it makes autosaving visible through the
/// module socket and exposes the current [`AutosavingState`] to hooks and
/// sibling modules.
#[derive(Debug)]
pub struct AutosaveModule {
    state: SharedState,
}

impl AutosaveModule {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Current autosave state.
    pub fn state(&self) -> AutosavingState {
        self.state.get()
    }

    /// Whether saves are currently withheld.
    pub fn is_suspended(&self) -> bool {
        self.state.get() != AutosavingState::Running
    }
}

impl<T: Document> Module<T> for AutosaveModule {
    fn name(&self) -> &'static str {
        "autosave"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
