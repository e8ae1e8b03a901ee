//! Toolchain errors

use std::path::PathBuf;

use il2cpp_build_core::CoreError;

/// Toolchain discovery errors
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("{what} not found: no match for '{pattern}' under {root:?}")]
    NotFound {
        what: &'static str,
        pattern: String,
        root: PathBuf,
    },
    #[error("Invalid version pattern '{0}': {1}")]
    InvalidPattern(String, String),
    #[error("Required component missing: {component} (looked in {searched:?})")]
    MissingComponent {
        component: &'static str,
        searched: Vec<PathBuf>,
    },
    #[error("Cannot determine version of {path:?}: {source}")]
    InvalidVersion {
        path: PathBuf,
        #[source]
        source: CoreError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
