//! File name resolution for settings documents
//!
//! A document declares where it lives with a plain string. Bare file names
//! (no separator) resolve next to the executing binary so a program's
//! settings travel with it; anything containing a directory component is
//! resolved to an absolute, lexically-normalized path against the current
//! working directory.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::env;
use std::path::{Component, Path, PathBuf};

static EXECUTABLE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
});

/// Directory of the executing binary, the anchor for bare file names.
///
/// Falls back to the current working directory when the executable path
/// cannot be determined (some exotic deployment targets).
pub fn executable_dir() -> &'static Path {
    &EXECUTABLE_DIR
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Purely textual, the path need not exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve a declared file name to an absolute path.
///
/// Bare names land in [`executable_dir`]; names carrying directory
/// components are absolutized against the working directory and normalized.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] for empty input or when the working
/// directory is unavailable.
pub fn resolve<P: AsRef<Path>>(filename: P) -> Result<PathBuf> {
    let path = filename.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::PathResolution("file name is empty".to_string()));
    }

    if path.components().count() > 1 || path.is_absolute() {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let cwd = env::current_dir().map_err(|e| {
                Error::PathResolution(format!("working directory is unavailable: {e}"))
            })?;
            cwd.join(path)
        };
        Ok(normalize(&absolute))
    } else {
        Ok(executable_dir().join(path))
    }
}
