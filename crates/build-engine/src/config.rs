//! Build request and output layout

use std::path::{Path, PathBuf};

use il2cpp_build_core::{BuildConfiguration, Target, ToolConfig};

/// Prefix of every native binary output directory
pub const TARGET_DIR_PREFIX: &str = "il2cpp_";

/// What to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Source identifiers (file names without `.cs`), processed in order
    pub identifiers: Vec<String>,
    /// Native targets, processed in order. Empty skips native compilation.
    pub targets: Vec<Target>,
    pub configuration: BuildConfiguration,
}

impl BuildRequest {
    /// Request for `identifiers` with no native targets
    pub fn new(identifiers: Vec<String>) -> Self {
        Self {
            identifiers,
            targets: Vec::new(),
            configuration: BuildConfiguration::default(),
        }
    }

    /// Set the native targets. Repeated targets are dropped, keeping the
    /// first occurrence, so each output directory is written once.
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets.clear();
        for target in targets {
            if !self.targets.contains(&target) {
                self.targets.push(target);
            }
        }
        self
    }

    /// Set the native build configuration
    pub fn with_configuration(mut self, configuration: BuildConfiguration) -> Self {
        self.configuration = configuration;
        self
    }
}

/// Where sources are read and artifacts are written.
///
/// Every artifact path is namespaced by identifier, and native outputs
/// additionally by target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub source_dir: PathBuf,
    pub assemblies_dir: PathBuf,
    pub cpp_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl OutputLayout {
    /// Default sub-directory names under `output_root`
    pub fn new(source_dir: impl Into<PathBuf>, output_root: impl AsRef<Path>) -> Self {
        let root = output_root.as_ref();
        Self {
            source_dir: source_dir.into(),
            assemblies_dir: root.join("assemblies"),
            cpp_dir: root.join("cpp"),
            bin_dir: root.join("bin"),
        }
    }

    /// Layout from the `[output]` and `[build]` sections
    pub fn from_config(config: &ToolConfig) -> Self {
        let root = &config.output.root;
        Self {
            source_dir: config.build.source_dir.clone(),
            assemblies_dir: root.join(&config.output.assemblies),
            cpp_dir: root.join(&config.output.cpp),
            bin_dir: root.join(&config.output.bin),
        }
    }

    pub fn source_file(&self, identifier: &str) -> PathBuf {
        self.source_dir.join(format!("{}.cs", identifier))
    }

    pub fn assembly(&self, identifier: &str) -> PathBuf {
        self.assemblies_dir.join(format!("{}.dll", identifier))
    }

    /// Stripper output directory, separate from the compiled assembly
    pub fn stripped_dir(&self, identifier: &str) -> PathBuf {
        self.assemblies_dir.join("stripped").join(identifier)
    }

    pub fn stripped_assembly(&self, identifier: &str) -> PathBuf {
        self.stripped_dir(identifier).join(format!("{}.dll", identifier))
    }

    /// Generated C++ for one identifier
    pub fn generated_cpp_dir(&self, identifier: &str) -> PathBuf {
        self.cpp_dir.join(identifier)
    }

    /// `<bin>/il2cpp_<identifier>_<arch>`
    pub fn target_dir(&self, identifier: &str, target: Target) -> PathBuf {
        self.bin_dir.join(format!(
            "{}{}_{}",
            TARGET_DIR_PREFIX,
            identifier,
            target.architecture.as_str()
        ))
    }

    pub fn cache_dir(&self, identifier: &str, target: Target) -> PathBuf {
        self.target_dir(identifier, target).join("cache")
    }

    pub fn binary(&self, identifier: &str, target: Target) -> PathBuf {
        self.target_dir(identifier, target)
            .join(target.platform.binary_name(identifier))
    }
}
