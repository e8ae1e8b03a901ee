//! Android NDK
//!
//! Validates an NDK directory and derives the paths the AOT compiler needs
//! for Android targets.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ToolchainError;

/// An Android NDK install
#[derive(Debug, Clone)]
pub struct NdkInstall {
    pub path: PathBuf,
    /// `Pkg.Revision` from `source.properties`, if present
    pub revision: Option<String>,
    host_tag: String,
}

impl NdkInstall {
    /// Open an NDK directory. Returns `None` if it does not look like an NDK.
    pub async fn open(path: PathBuf) -> Result<Option<Self>, ToolchainError> {
        if !Self::is_valid_ndk(&path) {
            return Ok(None);
        }

        let revision = Self::read_revision(&path).await?;
        info!(
            "Found Android NDK {} at {:?}",
            revision.as_deref().unwrap_or("(unknown revision)"),
            path
        );

        Ok(Some(Self::new(path, revision)))
    }

    /// NDK at `path` without checking the directory
    pub fn new(path: PathBuf, revision: Option<String>) -> Self {
        Self {
            path,
            revision,
            host_tag: Self::detect_host_tag().to_string(),
        }
    }

    /// An NDK has `source.properties` or the `ndk-build` script
    pub fn is_valid_ndk(path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }

        let ndk_build = if cfg!(windows) {
            path.join("ndk-build.cmd")
        } else {
            path.join("ndk-build")
        };

        path.join("source.properties").exists() || ndk_build.exists()
    }

    async fn read_revision(path: &Path) -> Result<Option<String>, ToolchainError> {
        let source_props = path.join("source.properties");
        if !source_props.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&source_props).await?;
        Ok(parse_revision(&content))
    }

    /// Detect the host platform tag
    fn detect_host_tag() -> &'static str {
        if cfg!(windows) {
            "windows-x86_64"
        } else if cfg!(target_os = "macos") {
            "darwin-x86_64"
        } else {
            "linux-x86_64"
        }
    }

    /// Sysroot include directories that exist, unified layout first
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let unified = self
            .path
            .join("toolchains")
            .join("llvm")
            .join("prebuilt")
            .join(&self.host_tag)
            .join("sysroot")
            .join("usr")
            .join("include");
        let legacy = self.path.join("sysroot").join("usr").join("include");

        [unified, legacy].into_iter().filter(|p| p.is_dir()).collect()
    }
}

fn parse_revision(content: &str) -> Option<String> {
    content
        .lines()
        .filter(|line| line.trim_start().starts_with("Pkg.Revision"))
        .filter_map(|line| line.split('=').nth(1))
        .map(|v| v.trim().to_string())
        .last()
}
