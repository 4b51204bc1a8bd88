//! Rename-aside of unusable settings files
//!
//! Instead of overwriting a corrupt or version-mismatched file, the file is
//! moved to a numbered sibling so its content stays inspectable:
//!
//! - labeled (versionable documents): `app.json` -> `app.1.2.3.0.json`,
//!   then `app.1.2.3.0-2.json`, `-3`, and so on when siblings already exist
//! - unlabeled (documents without a version): `app.json` -> `app.1.json`,
//!   `app.2.json`, ...
//!
//! When the source name itself already carries a label token with a `-k`
//! counter, new counters restart at `k + 2` so repeated rescues of an
//! already-rescued file keep strictly growing suffixes.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A label token found inside a file name: `.N.N.N.N[.N][-K]`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct VersionToken {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) counter: Option<u32>,
}

/// Leftmost label token in `name`, if any.
pub(crate) fn find_version_token(name: &str) -> Option<VersionToken> {
    let bytes = name.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start] != b'.' {
            continue;
        }
        let mut pos = start;
        let mut groups = 0;
        while groups < 5 {
            if pos >= bytes.len() || bytes[pos] != b'.' {
                break;
            }
            let digits_from = pos + 1;
            let mut cursor = digits_from;
            while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
                cursor += 1;
            }
            if cursor == digits_from {
                break;
            }
            pos = cursor;
            groups += 1;
        }
        if groups < 4 {
            continue;
        }
        let mut end = pos;
        let mut counter = None;
        if end < bytes.len() && bytes[end] == b'-' {
            let digits_from = end + 1;
            let mut cursor = digits_from;
            while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
                cursor += 1;
            }
            if cursor > digits_from {
                if let Ok(k) = name[digits_from..cursor].parse::<u32>() {
                    counter = Some(k);
                    end = cursor;
                }
            }
        }
        return Some(VersionToken { start, end, counter });
    }
    None
}

fn split_name(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) if dot > 0 => (name[..dot].to_string(), name[dot..].to_string()),
        _ => (name, String::new()),
    }
}

/// First non-existing rename target for `path`. `label` carries the version
/// string for version mismatches, `None` for plain corruption rescues.
pub(crate) fn next_available(path: &Path, label: Option<&str>) -> PathBuf {
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let (mut stem, ext) = split_name(path);

    // A previously rescued name keeps only its base; its counter seeds the
    // next ladder so suffixes never repeat.
    let mut restart_at = None;
    if let Some(token) = find_version_token(&stem) {
        restart_at = token.counter.map(|k| k.saturating_add(2));
        stem.truncate(token.start);
    }

    match label {
        Some(label) => {
            if restart_at.is_none() {
                let plain = parent.join(format!("{stem}.{label}{ext}"));
                if !plain.exists() {
                    return plain;
                }
            }
            let mut n = restart_at.unwrap_or(2);
            loop {
                let candidate = parent.join(format!("{stem}.{label}-{n}{ext}"));
                if !candidate.exists() {
                    return candidate;
                }
                n += 1;
            }
        }
        None => {
            let mut n = restart_at.unwrap_or(1);
            loop {
                let candidate = parent.join(format!("{stem}.{n}{ext}"));
                if !candidate.exists() {
                    return candidate;
                }
                n += 1;
            }
        }
    }
}

/// Move `path` aside to the next available numbered sibling.
///
/// A failed rename is logged and followed by a best-effort delete of the
/// source file, so a subsequent save cannot merge fresh content into stale
/// bytes. Returns the sibling path when the rename succeeded.
pub(crate) fn rename_aside(path: &Path, label: Option<&str>) -> Option<PathBuf> {
    let target = next_available(path, label);
    match fs::rename(path, &target) {
        Ok(()) => {
            debug!(from = %path.display(), to = %target.display(), "moved settings file aside");
            Some(target)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to move settings file aside, deleting it instead"
            );
            let _ = fs::remove_file(path);
            None
        }
    }
}
