//! Extension version parsing and ordering
//!
//! Extension authors publish versions in many shapes ("1.2", "v2.0.1",
//! "3.0.beta"), so the default ordering is lenient: versions are split on
//! dots, numeric components are compared numerically, missing trailing
//! components count as zero and a non-numeric component ranks equal to
//! anything at the same position. Callers that want strict semantics can
//! swap in [`SemverComparator`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Numeric(u64),
    /// Non-numeric part such as "b1"; does not take part in ordering
    Text,
}

/// A parsed extension version that keeps its original spelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionVersion {
    raw: String,
    #[serde(skip)]
    components: Vec<Component>,
}

impl ExtensionVersion {
    /// Parse a version string
    ///
    /// Rejects empty strings, embedded whitespace and empty components
    /// ("1..2", "1.2.").
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(Error::invalid_version(input));
        }

        let body = raw
            .strip_prefix('v')
            .or_else(|| raw.strip_prefix('V'))
            .unwrap_or(raw);

        let mut components = Vec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(Error::invalid_version(input));
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let value = part
                    .parse::<u64>()
                    .map_err(|_| Error::invalid_version(input))?;
                components.push(Component::Numeric(value));
            } else {
                components.push(Component::Text);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// The version as it was published
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lenient ordering (see module docs)
    pub fn cmp_lenient(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        let zero = Component::Numeric(0);

        for i in 0..len {
            let a = self.components.get(i).unwrap_or(&zero);
            let b = other.components.get(i).unwrap_or(&zero);
            if let (Component::Numeric(x), Component::Numeric(y)) = (a, b) {
                match x.cmp(y) {
                    Ordering::Equal => continue,
                    ord => return ord,
                }
            }
        }

        Ordering::Equal
    }

    /// Check if this version is newer than another under lenient ordering
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.cmp_lenient(other) == Ordering::Greater
    }

    fn without_prefix(&self) -> &str {
        self.raw
            .strip_prefix('v')
            .or_else(|| self.raw.strip_prefix('V'))
            .unwrap_or(&self.raw)
    }
}

impl TryFrom<String> for ExtensionVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ExtensionVersion> for String {
    fn from(version: ExtensionVersion) -> Self {
        version.raw
    }
}

impl std::str::FromStr for ExtensionVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ExtensionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Ordering strategy used by the update checker
pub trait VersionComparator: Send + Sync {
    /// Compare two versions
    fn compare(&self, a: &ExtensionVersion, b: &ExtensionVersion) -> Ordering;

    /// True when `remote` should replace `installed`
    fn is_newer(&self, remote: &ExtensionVersion, installed: &ExtensionVersion) -> bool {
        self.compare(remote, installed) == Ordering::Greater
    }
}

/// Dot-separated numeric ordering, missing components are zero
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientComparator;

impl VersionComparator for LenientComparator {
    fn compare(&self, a: &ExtensionVersion, b: &ExtensionVersion) -> Ordering {
        a.cmp_lenient(b)
    }
}

/// Full semver ordering (pre-release aware)
///
/// Falls back to lenient ordering when either side is not valid semver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparator;

impl VersionComparator for SemverComparator {
    fn compare(&self, a: &ExtensionVersion, b: &ExtensionVersion) -> Ordering {
        match (
            semver::Version::parse(a.without_prefix()),
            semver::Version::parse(b.without_prefix()),
        ) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp_lenient(b),
        }
    }
}
