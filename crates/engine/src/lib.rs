//! Persistence engine for settle settings documents
//!
//! This crate implements the load/save orchestration around a user-defined
//! document type:
//! - [`Document`]: the trait a persisted settings struct implements
//! - [`Persisted`]: the host that owns a document and drives load/save
//! - [`hooks::Hooks`]: closure subscribers for every pipeline point
//! - [`Module`] + [`ModuleSocket`]: pluggable behavior attached to one host
//! - [`modulation`]: the recovery, versioning, base64 and cipher modules
//! - [`Shared`]: a mutex-guarded handle for cross-thread use of one host
//!
//! ## Pipeline order
//!
//! ```text
//! load:  before_load -> read -> decrypt (reversed) -> after_decrypt
//!        -> [empty check] -> before_deserialize -> populate
//!        -> trying_recover (on failure only) -> after_deserialize
//!        -> after_load(success)
//! save:  before_save -> open -> before_serialize -> serialize
//!        -> after_serialize -> encrypt -> after_encrypt -> write
//!        -> after_save
//! ```
//!
//! A missing file on load is not an error: the current in-memory defaults
//! are saved as the initial document (first-run bootstrap).

pub mod document;
pub mod hooks;
pub mod host;
pub mod module;
pub mod modulation;
pub mod shared;
pub mod socket;

pub use document::Document;
pub use hooks::{Hooks, RecoverOutcome};
pub use host::Persisted;
pub use module::Module;
pub use modulation::{
    Base64Module, CipherModule, RecoveryAction, RecoveryModule, VersioningModule,
    VersioningResultAction,
};
pub use shared::Shared;
pub use socket::ModuleSocket;

pub use settle_core::{Error, Result, Version};
