//! Toolchain version numbers
//!
//! Unity versions look like `2021.3.5f1`; only the leading
//! `major.minor.build` triple takes part in comparisons.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoreError;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})\.(\d{0,6})\.(\d{1,2})").expect("version regex is valid")
});

/// A `major.minor.build` version, ordered field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl Version {
    /// Version from its three fields
    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self { major, minor, build }
    }

    /// Parse the leading version triple of `s`.
    ///
    /// Trailing text such as the `f1` release suffix is ignored. An empty
    /// minor field (`2019..1`) reads as zero.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let caps = VERSION_RE
            .captures(s)
            .ok_or_else(|| CoreError::InvalidVersion(s.to_string()))?;

        let field = |i: usize| -> Result<u32, CoreError> {
            let text = caps.get(i).map(|m| m.as_str()).unwrap_or("");
            if text.is_empty() {
                return Ok(0);
            }
            text.parse()
                .map_err(|_| CoreError::InvalidVersion(s.to_string()))
        };

        Ok(Self {
            major: field(1)?,
            minor: field(2)?,
            build: field(3)?,
        })
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// Compare two version strings.
///
/// Fails if either side is not a version; there is no fallback ordering.
pub fn compare(left: &str, right: &str) -> Result<Ordering, CoreError> {
    let left = Version::parse(left)?;
    let right = Version::parse(right)?;
    Ok(left.cmp(&right))
}
