//! Core types for the settle settings engine
//!
//! This crate defines the foundational pieces shared by every layer:
//! - Error: the error type hierarchy for load/save/module failures
//! - Version: the 4-part schema version persisted inside documents
//! - paths: resolution of declared file names to absolute locations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod paths;
pub mod version;

pub use error::{Error, Result};
pub use version::{Version, VersionParseError};
