//! Schema version carried by versionable documents
//!
//! A `Version` is the 4-part dotted version (`major.minor.build.revision`)
//! persisted inside the document body as a plain string. Parsing accepts two
//! to four components; omitted trailing components default to zero. Display
//! always renders all four components, which keeps persisted files stable
//! regardless of how the version was written in code.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version literal cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version literal '{0}'")]
pub struct VersionParseError(pub String);

/// 4-part schema version (`major.minor.build.revision`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// First component
    pub major: u32,
    /// Second component
    pub minor: u32,
    /// Third component
    pub build: u32,
    /// Fourth component
    pub revision: u32,
}

impl Version {
    /// Create a version from all four components.
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a version literal, panicking on malformed input.
    ///
    /// Convenience for statically-known literals in configuration code;
    /// use the `FromStr` impl for untrusted input.
    pub fn parse(literal: &str) -> Self {
        match literal.parse() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || VersionParseError(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(bad());
        }

        let mut parts = [0u32; 4];
        let mut count = 0;
        for piece in trimmed.split('.') {
            if count == 4 {
                return Err(bad());
            }
            parts[count] = piece.parse().map_err(|_| bad())?;
            count += 1;
        }
        if count < 2 {
            return Err(bad());
        }

        Ok(Version::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(D::Error::custom)
    }
}
