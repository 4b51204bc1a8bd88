//! Schema-version enforcement for versionable documents

use super::rename::rename_aside;
use crate::host::Persisted;
use crate::module::Module;
use crate::Document;
use settle_core::{Error, Result, Version};
use std::any::Any;
use std::fmt;
use tracing::warn;

/// What [`VersioningModule`] does when a loaded document fails the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersioningResultAction {
    /// Accept the mismatched document unchanged.
    DoNothing,
    /// Fail the load with [`Error::InvalidVersion`].
    Throw,
    /// Move the outdated file to a sibling labeled with its own version,
    /// rebuild the document from defaults, and write a fresh file.
    #[default]
    RenameAndLoadDefault,
    /// Rebuild the document from defaults in memory, leaving the outdated
    /// file for the next save to overwrite.
    LoadDefault,
    /// Rebuild the document from defaults and immediately rewrite the file
    /// in place, without preserving the outdated content.
    LoadDefaultAndSave,
}

type Policy = Box<dyn Fn(Version, Version) -> bool + Send>;

/// Module that checks every loaded document's version against an expected
/// version and applies a [`VersioningResultAction`] on mismatch.
///
/// Attaching to a document type whose [`Document::version`] returns `None`
/// fails: versioning is meaningless without a declared version.
pub struct VersioningModule {
    expected: Version,
    action: VersioningResultAction,
    policy: Policy,
}

impl VersioningModule {
    /// Enforce `expected` with the [default policy](Self::default_policy).
    pub fn new(expected: Version, action: VersioningResultAction) -> Self {
        Self {
            expected,
            action,
            policy: Box::new(Self::default_policy),
        }
    }

    /// Enforce `expected` under a custom policy. The policy receives the
    /// loaded version and the expected version and returns whether the
    /// document is acceptable.
    pub fn with_policy(
        expected: Version,
        action: VersioningResultAction,
        policy: impl Fn(Version, Version) -> bool + Send + 'static,
    ) -> Self {
        Self {
            expected,
            action,
            policy: Box::new(policy),
        }
    }

    /// The default policy: all four version parts must match exactly.
    pub fn default_policy(loaded: Version, expected: Version) -> bool {
        loaded == expected
    }

    /// The enforced version.
    pub fn expected(&self) -> Version {
        self.expected
    }
}

impl fmt::Debug for VersioningModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersioningModule")
            .field("expected", &self.expected)
            .field("action", &self.action)
            .finish()
    }
}

impl<T: Document> Module<T> for VersioningModule {
    fn name(&self) -> &'static str {
        "versioning"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_attach(&mut self, host: &mut Persisted<T>) -> Result<()> {
        if host.doc().version().is_none() {
            return Err(Error::Config(format!(
                "versioning requires a document that declares a version, \
                 {} returns none",
                std::any::type_name::<T>()
            )));
        }
        Ok(())
    }

    fn recovered(&mut self, host: &mut Persisted<T>) {
        // Rebuilt documents always carry the enforced version, regardless
        // of what the defaults factory stamped.
        host.doc_mut().set_version(self.expected);
    }

    fn after_load(&mut self, host: &mut Persisted<T>, success: bool) -> Result<()> {
        if !success {
            // fresh documents are current by definition
            host.doc_mut().set_version(self.expected);
            return Ok(());
        }
        let loaded = host.doc().version().unwrap_or_default();
        if (self.policy)(loaded, self.expected) {
            return Ok(());
        }
        warn!(
            loaded = %loaded,
            expected = %self.expected,
            "loaded settings document failed the version policy"
        );
        match self.action {
            VersioningResultAction::DoNothing => Ok(()),
            VersioningResultAction::Throw => Err(Error::InvalidVersion {
                actual: loaded,
                expected: self.expected,
            }),
            VersioningResultAction::RenameAndLoadDefault => {
                if let Some(path) = host.path().map(|p| p.to_path_buf()) {
                    rename_aside(&path, Some(&loaded.to_string()));
                }
                self.rebuild(host, true)
            }
            VersioningResultAction::LoadDefault => self.rebuild(host, false),
            VersioningResultAction::LoadDefaultAndSave => self.rebuild(host, true),
        }
    }
}

impl VersioningModule {
    fn rebuild<T: Document>(&self, host: &mut Persisted<T>, persist: bool) -> Result<()> {
        host.load_default()?;
        // the defaults factory may stamp anything; the rebuilt document is
        // current by definition
        host.doc_mut().set_version(self.expected);
        if persist {
            host.save()?;
        }
        Ok(())
    }
}
