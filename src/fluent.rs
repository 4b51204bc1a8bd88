//! Builder-style configuration of a persisted document

use settle_core::{Result, Version};
use settle_engine::{
    Base64Module, CipherModule, Document, Module, Persisted, RecoveryAction, RecoveryModule,
    VersioningModule, VersioningResultAction,
};
use std::path::Path;

/// Chainable configuration over [`Persisted`].
///
/// Every method consumes and returns the host, so a fully configured and
/// loaded document reads as one expression. Fallible steps return
/// `Result<Self>`; the chain short-circuits with `?`.
pub trait FluentExt<T: Document>: Sized {
    /// Pin the target file name.
    ///
    /// # Errors
    ///
    /// Path resolution failures.
    fn with_file_name(self, name: impl AsRef<Path>) -> Result<Self>;

    /// Replace the defaults factory used for recovery rebuilds.
    fn with_defaults(self, defaults: impl Fn() -> T + Send + 'static) -> Self;

    /// Attach any module.
    ///
    /// # Errors
    ///
    /// The module's attach validation.
    fn with_module(self, module: impl Module<T>) -> Result<Self>;

    /// Attach a [`RecoveryModule`] with the given action.
    ///
    /// # Errors
    ///
    /// Attach failures.
    fn with_recovery(self, action: RecoveryAction) -> Result<Self>;

    /// Attach a [`VersioningModule`] enforcing `expected` exactly.
    ///
    /// # Errors
    ///
    /// Attach failures, including unversioned document types.
    fn with_versioning(self, expected: Version, action: VersioningResultAction) -> Result<Self>;

    /// Attach a [`VersioningModule`] with a custom acceptance policy.
    ///
    /// # Errors
    ///
    /// Attach failures, including unversioned document types.
    fn with_versioning_policy(
        self,
        expected: Version,
        action: VersioningResultAction,
        policy: impl Fn(Version, Version) -> bool + Send + 'static,
    ) -> Result<Self>;

    /// Attach a [`Base64Module`] so the file is stored base64-encoded.
    ///
    /// # Errors
    ///
    /// Attach failures.
    fn with_base64(self) -> Result<Self>;

    /// Attach a [`CipherModule`] keyed from `password`.
    ///
    /// # Errors
    ///
    /// Attach failures.
    fn with_encryption(self, password: &str) -> Result<Self>;

    /// Finish the chain by loading (bootstrapping the file if absent).
    ///
    /// # Errors
    ///
    /// Load pipeline failures.
    fn load_now(self) -> Result<Self>;

    /// Finish the chain by saving.
    ///
    /// # Errors
    ///
    /// Save pipeline failures.
    fn save_now(self) -> Result<Self>;
}

impl<T: Document> FluentExt<T> for Persisted<T> {
    fn with_file_name(mut self, name: impl AsRef<Path>) -> Result<Self> {
        self.set_file_name(name)?;
        Ok(self)
    }

    fn with_defaults(mut self, defaults: impl Fn() -> T + Send + 'static) -> Self {
        self.set_defaults(defaults);
        self
    }

    fn with_module(mut self, module: impl Module<T>) -> Result<Self> {
        self.attach(module)?;
        Ok(self)
    }

    fn with_recovery(self, action: RecoveryAction) -> Result<Self> {
        self.with_module(RecoveryModule::new(action))
    }

    fn with_versioning(self, expected: Version, action: VersioningResultAction) -> Result<Self> {
        self.with_module(VersioningModule::new(expected, action))
    }

    fn with_versioning_policy(
        self,
        expected: Version,
        action: VersioningResultAction,
        policy: impl Fn(Version, Version) -> bool + Send + 'static,
    ) -> Result<Self> {
        self.with_module(VersioningModule::with_policy(expected, action, policy))
    }

    fn with_base64(self) -> Result<Self> {
        self.with_module(Base64Module)
    }

    fn with_encryption(self, password: &str) -> Result<Self> {
        self.with_module(CipherModule::new(password))
    }

    fn load_now(mut self) -> Result<Self> {
        self.load()?;
        Ok(self)
    }

    fn save_now(mut self) -> Result<Self> {
        self.save()?;
        Ok(self)
    }
}
