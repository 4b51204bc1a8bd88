//! Automatic persistence of changed settings documents
//!
//! [`Autosaved`] wraps a [`Persisted`](settle_engine::Persisted) host and
//! saves after every mutation that actually changed a tracked field. The
//! pieces:
//!
//! - [`Observe`]: a transparent field wrapper that marks a shared
//!   [`ChangeTracker`] whenever the field is borrowed mutably. Fields left
//!   unwrapped are invisible to autosave.
//! - [`Track`]: implemented by the document to rebind every [`Observe`]
//!   field to the wrapper's tracker. Rebinding runs after construction,
//!   after every load, and after every edit, so replaced containers pick
//!   the tracker back up automatically.
//! - [`Autosaved::edit`]: the single mutation route. The closure mutates
//!   the document; if the tracker generation moved, the document is saved.
//! - [`Autosaved::suspend`]: a scope during which saves are withheld. The
//!   returned guard batches any number of edits into at most one save,
//!   performed on [`SuspendAutosave::resume`] or at scope exit.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use settle_autosave::{Autosaved, ChangeTracker, Observe, Track};
//! use settle_engine::{Document, Persisted};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Prefs {
//!     theme: Observe<String>,
//!     volume: Observe<u8>,
//!     session_token: String, // not tracked, never triggers a save
//! }
//!
//! impl Document for Prefs {
//!     fn file_name(&self) -> &str {
//!         "prefs.json"
//!     }
//! }
//!
//! impl Track for Prefs {
//!     fn rebind(&mut self, tracker: &ChangeTracker) {
//!         self.theme.rebind(tracker);
//!         self.volume.rebind(tracker);
//!     }
//! }
//!
//! # fn main() -> settle_core::Result<()> {
//! let mut prefs = Autosaved::enable(Persisted::new(Prefs::default()))?;
//! prefs.load()?;
//! prefs.edit(|p| *p.volume = 80)?; // saved
//! prefs.edit(|p| p.session_token = "abc".into())?; // not saved
//! # Ok(())
//! # }
//! ```

pub mod autosaved;
pub mod observe;
pub mod state;
pub mod suspend;
pub mod tracker;

pub use autosaved::{Autosaved, AutosaveExt};
pub use observe::{Observe, Track};
pub use state::{AutosaveModule, AutosavingState};
pub use suspend::SuspendAutosave;
pub use tracker::ChangeTracker;
