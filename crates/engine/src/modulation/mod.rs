//! Built-in modules: recovery, versioning, and payload transforms
//!
//! Recovery and versioning share the rename-aside machinery in [`rename`]:
//! an unusable settings file is moved to a numbered sibling before the
//! document is rebuilt, so no user data is destroyed silently. The payload
//! transforms ([`Base64Module`], [`CipherModule`]) plug into the
//! encrypt/decrypt pipeline points.

mod base64;
mod cipher;
mod recovery;
mod rename;
mod versioning;

pub use self::base64::Base64Module;
pub use self::cipher::CipherModule;
pub use self::recovery::{RecoveryAction, RecoveryModule};
pub use self::versioning::{VersioningModule, VersioningResultAction};
