//! Persisted configuration
//!
//! Two kinds of input are read once at startup:
//! - an optional TOML file with output layout and build settings
//! - two plain-text files each naming a search root (Unity editors, NDKs)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Result};

/// Native build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildConfiguration {
    #[default]
    Release,
    Debug,
}

impl BuildConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Release => "Release",
            BuildConfiguration::Debug => "Debug",
        }
    }
}

/// Where the search-root files live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    /// File holding the directory that contains Unity editor installs
    pub unity_root_file: PathBuf,
    /// File holding the directory that contains Android NDK installs
    pub ndk_root_file: PathBuf,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            unity_root_file: PathBuf::from("unity-editors-root.txt"),
            ndk_root_file: PathBuf::from("android-ndk-root.txt"),
        }
    }
}

/// Output directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub root: PathBuf,
    pub assemblies: String,
    pub cpp: String,
    pub bin: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("build"),
            assemblies: "assemblies".to_string(),
            cpp: "cpp".to_string(),
            bin: "bin".to_string(),
        }
    }
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Directory scanned for `.cs` sources
    pub source_dir: PathBuf,
    pub configuration: BuildConfiguration,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            configuration: BuildConfiguration::default(),
        }
    }
}

/// Tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub roots: RootsConfig,
    pub output: OutputConfig,
    pub build: BuildSettings,
}

/// Search roots read from the root files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots {
    pub unity: PathBuf,
    pub ndk: Option<PathBuf>,
}

impl ToolConfig {
    /// Default configuration file name, looked up in the working directory
    pub const DEFAULT_FILE: &'static str = "il2cpp-build.toml";

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `il2cpp-build.toml` is used
    /// if present and defaults otherwise.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let (config_file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(Self::DEFAULT_FILE), false),
        };

        if !config_file.exists() {
            if required {
                return Err(CoreError::Config(format!(
                    "config file {:?} does not exist",
                    config_file
                )));
            }
            debug!("No {} found, using defaults", Self::DEFAULT_FILE);
            return Ok(Self::default());
        }

        info!("Loading configuration from {:?}", config_file);
        let contents = tokio::fs::read_to_string(&config_file).await?;
        Self::from_toml(&contents)
    }

    /// Parse configuration text. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read both search-root files
    pub async fn search_roots(&self) -> Result<SearchRoots> {
        let unity = match read_search_root(&self.roots.unity_root_file).await? {
            Some(root) => root,
            None => {
                let fallback = default_unity_root();
                info!(
                    "{:?} not found, searching Unity editors under {:?}",
                    self.roots.unity_root_file, fallback
                );
                fallback
            }
        };
        let ndk = read_search_root(&self.roots.ndk_root_file).await?;

        Ok(SearchRoots { unity, ndk })
    }
}

/// Read a search-root file. The last non-empty line wins.
///
/// Returns `None` if the file is missing or holds no path.
pub async fn read_search_root(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let root = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from);

    debug!("Search root from {:?}: {:?}", path, root);
    Ok(root)
}

/// Unity Hub's default editor folder for the host OS
pub fn default_unity_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Unity\Hub\Editor")
    } else if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Unity/Hub/Editor")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Unity")
            .join("Hub")
            .join("Editor")
    }
}
