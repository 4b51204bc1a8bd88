//! The document trait implemented by persisted settings types

use serde::de::DeserializeOwned;
use serde::Serialize;
use settle_core::Version;

/// A user-defined settings struct that can be persisted as a JSON document.
///
/// The document body is exactly the serde serialization of the struct; the
/// file name is host state and never enters the body. Versionable documents
/// additionally expose their schema version through [`Document::version`] /
/// [`Document::set_version`] so the versioning module can enforce a policy
/// against it.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use settle_engine::Document;
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct AppSettings {
///     greeting: String,
///     retries: u32,
/// }
///
/// impl Document for AppSettings {
///     fn file_name(&self) -> &str {
///         "app-settings.json"
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + 'static {
    /// Declared on-disk location of this document.
    ///
    /// A bare file name resolves next to the executing binary; a path with
    /// directory components resolves to an absolute normalized path. May be
    /// empty when the location is always supplied through the host, in
    /// which case load/save without a configured path fail with a path
    /// resolution error.
    fn file_name(&self) -> &str;

    /// Schema version declared by this document, `None` for unversioned
    /// documents. Versionable documents return `Some` and accept
    /// [`Document::set_version`].
    fn version(&self) -> Option<Version> {
        None
    }

    /// Overwrite the declared schema version. No-op default for
    /// unversioned documents.
    fn set_version(&mut self, _version: Version) {}
}

/// Short type label used in diagnostics (`app::Settings` -> `Settings`).
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
