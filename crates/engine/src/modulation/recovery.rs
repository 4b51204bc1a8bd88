//! Corruption recovery for unreadable settings files

use super::rename::rename_aside;
use crate::document::short_type_name;
use crate::host::Persisted;
use crate::hooks::RecoverOutcome;
use crate::module::Module;
use crate::Document;
use settle_core::{Error, Result};
use std::any::Any;
use std::path::Path;
use tracing::warn;

/// What [`RecoveryModule`] does when the persisted content is empty or
/// unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryAction {
    /// Fail the load with [`Error::Recovery`] naming the document type.
    Throw,
    /// Rebuild the document from defaults in memory only. The broken file
    /// stays on disk until the next save overwrites it.
    LoadDefault,
    /// Rebuild from defaults and immediately rewrite the file.
    LoadDefaultAndSave,
    /// Move the broken file to a numbered sibling, rebuild from defaults,
    /// and write a fresh file in its place.
    #[default]
    RenameAndLoadDefault,
}

/// Module that turns corrupt loads into default documents per a configured
/// [`RecoveryAction`].
#[derive(Debug, Default)]
pub struct RecoveryModule {
    action: RecoveryAction,
}

impl RecoveryModule {
    /// Recovery with the given action.
    pub fn new(action: RecoveryAction) -> Self {
        Self { action }
    }

    /// The configured action.
    pub fn action(&self) -> RecoveryAction {
        self.action
    }

    /// Change the action for subsequent loads.
    pub fn set_action(&mut self, action: RecoveryAction) {
        self.action = action;
    }
}

impl<T: Document> Module<T> for RecoveryModule {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn trying_recover(
        &mut self,
        host: &mut Persisted<T>,
        path: &Path,
        error: Option<&Error>,
        outcome: &mut RecoverOutcome,
    ) -> Result<()> {
        if outcome.handled {
            return Ok(());
        }
        match self.action {
            RecoveryAction::Throw => {
                let mut document = short_type_name::<T>().to_string();
                if let Some(version) = host.doc().version() {
                    document.push_str(&format!(" v{version}"));
                }
                Err(Error::Recovery { document })
            }
            RecoveryAction::LoadDefault => {
                warn!(path = %path.display(), error = ?error, "recovering in memory from defaults");
                host.load_default()?;
                outcome.mark_handled();
                Ok(())
            }
            RecoveryAction::LoadDefaultAndSave => {
                warn!(path = %path.display(), error = ?error, "recovering from defaults and rewriting file");
                host.load_default()?;
                outcome.mark_handled();
                host.set_resolved_path(path.to_path_buf());
                host.save()
            }
            RecoveryAction::RenameAndLoadDefault => {
                warn!(path = %path.display(), error = ?error, "moving broken file aside and recovering from defaults");
                // versionable documents embed their version in the rescued name
                let label = host.doc().version().map(|v| v.to_string());
                rename_aside(path, label.as_deref());
                host.load_default()?;
                outcome.mark_handled();
                host.set_resolved_path(path.to_path_buf());
                host.save()
            }
        }
    }
}
