//! Installation discovery
//!
//! Finds an installation directory either from an explicit path or by
//! matching a version pattern against the sub-directories of a search root.

use std::fmt;
use std::path::{Path, PathBuf};

use glob::Pattern;
use il2cpp_build_core::Version;
use tracing::{debug, info};

use crate::error::ToolchainError;

/// How the user selected an installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Newest install under the search root
    Latest,
    /// Glob pattern over directory names, e.g. `2019.4.*`
    Pattern(String),
    /// Direct path, used verbatim
    Path(PathBuf),
}

impl VersionSelector {
    /// Parse a CLI value. Anything with a path separator is a path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let is_path = input.contains('/')
            || input.contains('\\')
            || input.contains(std::path::MAIN_SEPARATOR);
        if is_path {
            VersionSelector::Path(PathBuf::from(input))
        } else if input.is_empty() || input.eq_ignore_ascii_case("latest") {
            VersionSelector::Latest
        } else {
            VersionSelector::Pattern(input.to_string())
        }
    }

    /// Glob pattern matched against directory names
    pub fn pattern(&self) -> Option<&str> {
        match self {
            VersionSelector::Latest => Some("*"),
            VersionSelector::Pattern(p) => Some(p),
            VersionSelector::Path(_) => None,
        }
    }

    /// True for the `latest` selector
    pub fn is_latest(&self) -> bool {
        matches!(self, VersionSelector::Latest)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Latest => write!(f, "latest"),
            VersionSelector::Pattern(p) => write!(f, "{}", p),
            VersionSelector::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Look for an installation without treating absence as an error.
///
/// A path selector is returned as given. Otherwise the immediate
/// sub-directories of `search_root` are matched against the pattern and the
/// highest version wins. Names that do not parse as a version rank below
/// those that do and are ordered by name. A missing search root is no match.
pub async fn find_install(
    search_root: &Path,
    selector: &VersionSelector,
) -> Result<Option<PathBuf>, ToolchainError> {
    let pattern = match selector {
        VersionSelector::Path(path) => return Ok(Some(path.clone())),
        other => other.pattern().unwrap_or("*"),
    };

    let matcher = Pattern::new(pattern).map_err(|e| {
        ToolchainError::InvalidPattern(pattern.to_string(), e.to_string())
    })?;

    if !search_root.is_dir() {
        debug!("Search root {:?} does not exist", search_root);
        return Ok(None);
    }

    let mut matches = Vec::new();
    let mut entries = tokio::fs::read_dir(search_root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if matcher.matches(name) {
                matches.push(name.to_string());
            }
        }
    }

    matches.sort_by_cached_key(|name| (Version::parse(name).ok(), name.clone()));
    debug!("Candidates for '{}' under {:?}: {:?}", pattern, search_root, matches);

    Ok(matches.pop().map(|name| search_root.join(name)))
}

/// Like [`find_install`], but a missing installation is a `NotFound` error.
pub async fn require_install(
    what: &'static str,
    search_root: &Path,
    selector: &VersionSelector,
) -> Result<PathBuf, ToolchainError> {
    match find_install(search_root, selector).await? {
        Some(path) => {
            info!("Using {} at {:?}", what, path);
            Ok(path)
        }
        None => Err(ToolchainError::NotFound {
            what,
            pattern: selector.to_string(),
            root: search_root.to_path_buf(),
        }),
    }
}
