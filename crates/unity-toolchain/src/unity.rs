//! Unity editor installation layout

use std::path::{Path, PathBuf};

use il2cpp_build_core::{Architecture, Platform, Target, Version};
use tracing::debug;

use crate::error::ToolchainError;
use crate::features::ToolchainFeatures;

/// An executable plus the arguments that always precede the step's own
/// arguments. Hosted tools (`dotnet csc.dll`) use the leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProgram {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl ToolProgram {
    pub fn native(program: PathBuf) -> Self {
        Self {
            program,
            leading_args: Vec::new(),
        }
    }

    pub fn hosted(host: PathBuf, assembly: &Path) -> Self {
        Self {
            program: host,
            leading_args: vec![assembly.to_string_lossy().to_string()],
        }
    }
}

/// A Unity editor install
#[derive(Debug, Clone)]
pub struct UnityInstall {
    pub root: PathBuf,
    pub version: Version,
    /// `Editor/Data`, or `Unity.app/Contents` on macOS
    pub data_dir: PathBuf,
}

fn exe(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// First candidate that exists on disk
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

/// `CFBundleVersion` of `Unity.app` under `root`, if readable
fn bundle_version(root: &Path) -> Option<Version> {
    let plist = root.join("Unity.app").join("Contents").join("Info.plist");
    let contents = std::fs::read_to_string(plist).ok()?;
    let rest = contents.split("<key>CFBundleVersion</key>").nth(1)?;
    let value = rest.split("<string>").nth(1)?.split("</string>").next()?;
    Version::parse(value.trim()).ok()
}

impl UnityInstall {
    /// Open an install directory.
    ///
    /// The version comes from the directory name, as Unity Hub lays installs
    /// out. Other directories fall back to `CFBundleVersion` in the macOS
    /// bundle's `Info.plist`.
    pub fn open(root: PathBuf) -> Result<Self, ToolchainError> {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let version = match Version::parse(&name) {
            Ok(version) => version,
            Err(source) => match bundle_version(&root) {
                Some(version) => {
                    debug!("{:?} is Unity {} according to Info.plist", root, version);
                    version
                }
                None => return Err(ToolchainError::InvalidVersion { path: root, source }),
            },
        };

        let data_dir = if cfg!(target_os = "macos") {
            root.join("Unity.app").join("Contents")
        } else {
            root.join("Editor").join("Data")
        };

        debug!("Unity {} data directory: {:?}", version, data_dir);

        Ok(Self {
            root,
            version,
            data_dir,
        })
    }

    fn il2cpp_build_dir(&self) -> PathBuf {
        self.data_dir.join("il2cpp").join("build")
    }

    /// Where the AOT compiler may live, newest layout first
    pub fn il2cpp_candidates(&self) -> Vec<PathBuf> {
        let build = self.il2cpp_build_dir();
        vec![
            build.join("deploy").join(exe("il2cpp")),
            build.join("deploy").join("netcoreapp3.1").join(exe("il2cpp")),
            build.join(exe("il2cpp")),
        ]
    }

    /// Where the stripper may live, newest layout first
    pub fn linker_candidates(&self) -> Vec<PathBuf> {
        let deploy = self.il2cpp_build_dir().join("deploy");
        vec![
            deploy.join(exe("UnityLinker")),
            deploy.join("netcoreapp3.1").join(exe("UnityLinker")),
            deploy.join("net471").join("UnityLinker.exe"),
        ]
    }

    fn hosted_compiler(&self) -> (PathBuf, PathBuf) {
        (
            self.data_dir.join("NetCoreRuntime").join(exe("dotnet")),
            self.data_dir.join("DotNetSdkRoslyn").join("csc.dll"),
        )
    }

    fn native_compilers(&self) -> Vec<PathBuf> {
        let mcs = if cfg!(windows) { "mcs.bat" } else { "mcs" };
        vec![
            self.data_dir.join("Tools").join("Roslyn").join(exe("csc")),
            self.data_dir.join("MonoBleedingEdge").join("bin").join(mcs),
        ]
    }

    /// Every path that could hold the C# compiler
    pub fn compiler_candidates(&self) -> Vec<PathBuf> {
        let (_, csc_dll) = self.hosted_compiler();
        let mut candidates = vec![csc_dll];
        candidates.extend(self.native_compilers());
        candidates
    }

    /// Locate the C# compiler: hosted Roslyn, native Roslyn, then Mono `mcs`
    pub fn csharp_compiler(&self) -> Option<ToolProgram> {
        let (dotnet, csc_dll) = self.hosted_compiler();
        if dotnet.exists() && csc_dll.exists() {
            return Some(ToolProgram::hosted(dotnet, &csc_dll));
        }
        first_existing(&self.native_compilers()).map(ToolProgram::native)
    }

    /// Directory holding `mscorlib.dll` for the given layout
    pub fn runtime_library_dir(&self, features: &ToolchainFeatures) -> PathBuf {
        self.data_dir
            .join("MonoBleedingEdge")
            .join("lib")
            .join("mono")
            .join(features.runtime_profile())
    }

    pub fn managed_dir(&self) -> PathBuf {
        self.data_dir.join("Managed")
    }

    pub fn engine_library(&self) -> PathBuf {
        self.managed_dir().join("UnityEngine.dll")
    }

    pub fn playback_engines_dir(&self) -> PathBuf {
        self.data_dir.join("PlaybackEngines")
    }

    /// Android player support module
    pub fn android_player_dir(&self) -> PathBuf {
        self.playback_engines_dir().join("AndroidPlayer")
    }

    /// Baselib static libraries for a target
    pub fn baselib_dir(&self, target: Target) -> PathBuf {
        let engines = self.playback_engines_dir();
        match target.platform {
            Platform::WindowsDesktop => {
                let variation = match target.architecture {
                    Architecture::X86 => "win32_player_nondevelopment_il2cpp",
                    _ => "win64_player_nondevelopment_il2cpp",
                };
                engines
                    .join("windowsstandalonesupport")
                    .join("Variations")
                    .join(variation)
            }
            Platform::Android => engines
                .join("AndroidPlayer")
                .join("Variations")
                .join("il2cpp")
                .join("Release")
                .join("StaticLibs")
                .join(target.architecture.abi_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_parses_directory_name() {
        let unity = UnityInstall::open(PathBuf::from("/editors/2021.3.5f1")).unwrap();
        assert_eq!(unity.version, Version::new(2021, 3, 5));
    }

    #[test]
    fn test_open_rejects_unversioned_directory() {
        let err = UnityInstall::open(PathBuf::from("/opt/Unity")).unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidVersion { .. }));
    }

    #[test]
    fn test_open_reads_bundle_version() {
        let root = TempDir::new().unwrap();
        let install = root.path().join("Unity");
        let contents = install.join("Unity.app").join("Contents");
        std::fs::create_dir_all(&contents).unwrap();
        std::fs::write(
            contents.join("Info.plist"),
            "<dict>\n\t<key>CFBundleName</key>\n\t<string>Unity</string>\n\
             \t<key>CFBundleVersion</key>\n\t<string>2021.3.5f1</string>\n</dict>\n",
        )
        .unwrap();

        let unity = UnityInstall::open(install.clone()).unwrap();
        assert_eq!(unity.version, Version::new(2021, 3, 5));
        assert_eq!(unity.root, install);
    }

    #[test]
    fn test_open_rejects_unreadable_bundle_version() {
        let root = TempDir::new().unwrap();
        let install = root.path().join("Unity");
        let contents = install.join("Unity.app").join("Contents");
        std::fs::create_dir_all(&contents).unwrap();
        std::fs::write(
            contents.join("Info.plist"),
            "<key>CFBundleVersion</key><string>unknown</string>",
        )
        .unwrap();

        let err = UnityInstall::open(install).unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidVersion { .. }));
    }

    #[test]
    fn test_runtime_dir_follows_layout() {
        let unity = UnityInstall::open(PathBuf::from("/editors/2019.4.40f1")).unwrap();
        let legacy = ToolchainFeatures::for_version(&unity.version);
        assert!(unity.runtime_library_dir(&legacy).ends_with("unityaot"));

        let modern = ToolchainFeatures::for_version(&Version::new(2022, 3, 0));
        let dir = unity.runtime_library_dir(&modern);
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("unityaot-"), "{name}");
    }

    #[test]
    fn test_prefers_hosted_compiler() {
        let root = TempDir::new().unwrap();
        let unity = UnityInstall::open(root.path().join("2022.3.10f1")).unwrap();
        let (dotnet, csc) = unity.hosted_compiler();
        for file in [&dotnet, &csc, &unity.native_compilers()[0]] {
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, "").unwrap();
        }

        let compiler = unity.csharp_compiler().unwrap();
        assert_eq!(compiler.program, dotnet);
        assert_eq!(compiler.leading_args, vec![csc.to_string_lossy().to_string()]);
    }

    #[test]
    fn test_no_compiler() {
        let root = TempDir::new().unwrap();
        let unity = UnityInstall::open(root.path().join("2019.4.1f1")).unwrap();
        assert!(unity.csharp_compiler().is_none());
    }
}
