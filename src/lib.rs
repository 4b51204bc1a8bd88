//! settle: persisted JSON settings with pluggable modules
//!
//! A settings struct implements [`Document`], a [`Persisted`] host drives
//! load/save around it, and behavior plugs in at two seams: closure
//! [`hooks`](settle_engine::hooks) on every pipeline point, and typed
//! [`Module`]s in the host's socket. Built-ins cover corruption recovery
//! ([`RecoveryModule`]), schema versioning ([`VersioningModule`]), payload
//! transforms ([`Base64Module`], [`CipherModule`]) and change-driven
//! autosaving ([`Autosaved`]).
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use settle::{Document, FluentExt, Persisted, RecoveryAction};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct AppSettings {
//!     greeting: String,
//!     retries: u32,
//! }
//!
//! impl Document for AppSettings {
//!     fn file_name(&self) -> &str {
//!         "app.json"
//!     }
//! }
//!
//! # fn main() -> settle::Result<()> {
//! let settings = Persisted::new(AppSettings::default())
//!     .with_recovery(RecoveryAction::RenameAndLoadDefault)?
//!     .load_now()?;
//! println!("{}", settings.doc().greeting);
//! # Ok(())
//! # }
//! ```

mod fluent;

pub use fluent::FluentExt;
pub use settle_autosave::{
    AutosaveExt, AutosaveModule, Autosaved, AutosavingState, ChangeTracker, Observe,
    SuspendAutosave, Track,
};
pub use settle_core::{paths, Error, Result, Version, VersionParseError};
pub use settle_engine::{
    Base64Module, CipherModule, Document, Hooks, Module, ModuleSocket, Persisted, RecoverOutcome,
    RecoveryAction, RecoveryModule, Shared, VersioningModule, VersioningResultAction,
};
