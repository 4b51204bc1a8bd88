//! Error types for the settle settings engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy follows the failure surface of the persistence pipeline:
//! configuration mistakes are fatal and immediate, corruption is recoverable
//! when a recovery module handles it, version mismatches only become errors
//! under the `Throw` action, and cipher failures are kept distinct from
//! generic corruption so callers can re-prompt for credentials.

use crate::version::Version;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for settle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the settle settings engine
#[derive(Debug, Error)]
pub enum Error {
    /// Misuse of the configuration surface (configuring twice, attaching a
    /// capability module to a document lacking the capability)
    #[error("configuration error: {0}")]
    Config(String),

    /// A file name could not be resolved to a usable path
    #[error("could not resolve settings path: {0}")]
    PathResolution(String),

    /// The persisted document is empty or unparsable and no attached module
    /// recovered it
    #[error("settings file '{path}' is corrupt: {reason}")]
    Corruption {
        /// Path of the offending file
        path: PathBuf,
        /// Short human-readable description of the failure
        reason: String,
        /// The parse error that triggered the corruption, when one exists
        /// (empty files carry no inner error)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The loaded document declares a schema version rejected by the
    /// versioning policy under the `Throw` action
    #[error("loaded version '{actual}' mismatches expected version '{expected}'")]
    InvalidVersion {
        /// Version found inside the persisted document
        actual: Version,
        /// Version the versioning module was configured to expect
        expected: Version,
    },

    /// A recovery module was configured to `Throw` instead of repairing
    #[error("failed recovering settings document {document}")]
    Recovery {
        /// Document type label, with its version when the document is
        /// versionable
        document: String,
    },

    /// Decryption failed, which almost always means a wrong password
    #[error("password appears to be invalid")]
    InvalidPassword,

    /// A byte transform module failed outside of key mismatch (malformed
    /// base64 payload, undersized ciphertext, encryption failure)
    #[error("cipher transform failed: {0}")]
    Cipher(String),

    /// File system failure, wrapped with the attempted path for diagnostics
    #[error("failed accessing settings file '{path}'")]
    Io {
        /// Path the operation was targeting
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serializing the in-memory document failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Module lifecycle misuse (attach on a disposed socket, querying or
    /// detaching a module that is not attached)
    #[error("module error: {0}")]
    Modularity(String),
}

impl Error {
    /// Wrap an I/O failure with the path it was aimed at.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a corruption error around an optional inner parse error.
    pub fn corruption(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Corruption {
            path: path.into(),
            reason: reason.into(),
            source,
        }
    }
}
