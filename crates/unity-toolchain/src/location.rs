//! Resolved toolchain location
//!
//! Resolution runs in two phases. [`ToolchainProbe::run`] looks everything up
//! and records what it found as `Option`s; only a missing Unity install stops
//! it. [`ToolchainProbe::require`] then turns each missing mandatory component
//! into an error and keeps optional ones optional.

use std::path::{Path, PathBuf};

use il2cpp_build_core::{Platform, Target, Version};
use tracing::{info, warn};

use crate::detector::{find_install, require_install, VersionSelector};
use crate::error::ToolchainError;
use crate::features::ToolchainFeatures;
use crate::ndk::NdkInstall;
use crate::unity::{first_existing, ToolProgram, UnityInstall};

/// Inputs to toolchain resolution
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub unity_root: PathBuf,
    pub unity: VersionSelector,
    pub ndk_root: Option<PathBuf>,
    pub ndk: VersionSelector,
}

/// Optional baselib directories, one per known target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselibDirs {
    pub win_x86: Option<PathBuf>,
    pub win_x64: Option<PathBuf>,
    pub android_armv7: Option<PathBuf>,
    pub android_arm64: Option<PathBuf>,
}

impl BaselibDirs {
    fn probe(unity: &UnityInstall) -> Self {
        let existing = |target: Target| {
            let dir = unity.baselib_dir(target);
            dir.is_dir().then_some(dir)
        };
        Self {
            win_x86: existing(Target::WIN_X86),
            win_x64: existing(Target::WIN_X64),
            android_armv7: existing(Target::ANDROID_ARMV7),
            android_arm64: existing(Target::ANDROID_ARM64),
        }
    }

    /// Variation directory for `target`, if it exists
    pub fn get(&self, target: Target) -> Option<&Path> {
        let dir = match target {
            Target::WIN_X86 => &self.win_x86,
            Target::WIN_X64 => &self.win_x64,
            Target::ANDROID_ARMV7 => &self.android_armv7,
            Target::ANDROID_ARM64 => &self.android_arm64,
            _ => &None,
        };
        dir.as_deref()
    }
}

/// Everything Android targets need
#[derive(Debug, Clone)]
pub struct AndroidSupport {
    pub ndk: NdkInstall,
    pub player_dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
}

/// Probe phase results
#[derive(Debug, Clone)]
pub struct ToolchainProbe {
    pub unity: UnityInstall,
    pub features: ToolchainFeatures,
    pub csharp_compiler: Option<ToolProgram>,
    pub linker: Option<PathBuf>,
    pub il2cpp: Option<PathBuf>,
    pub runtime_library_dir: Option<PathBuf>,
    pub engine_library: Option<PathBuf>,
    pub baselib: BaselibDirs,
    pub android_player: Option<PathBuf>,
    pub ndk: Option<NdkInstall>,
}

impl ToolchainProbe {
    /// Look up every component. Fails only if no Unity install matches.
    pub async fn run(options: &ResolveOptions) -> Result<Self, ToolchainError> {
        let unity_dir =
            require_install("Unity editor", &options.unity_root, &options.unity).await?;
        let unity = UnityInstall::open(unity_dir)?;
        let features = ToolchainFeatures::for_version(&unity.version);
        info!("Unity {} ({:?})", unity.version, features);

        let runtime_dir = unity.runtime_library_dir(&features);
        let engine_library = unity.engine_library();
        let android_player = unity.android_player_dir();
        let ndk = probe_ndk(options, &unity).await;

        Ok(Self {
            csharp_compiler: unity.csharp_compiler(),
            linker: first_existing(&unity.linker_candidates()),
            il2cpp: first_existing(&unity.il2cpp_candidates()),
            runtime_library_dir: runtime_dir.join("mscorlib.dll").exists().then_some(runtime_dir),
            engine_library: engine_library.exists().then_some(engine_library),
            baselib: BaselibDirs::probe(&unity),
            android_player: android_player.is_dir().then_some(android_player),
            ndk,
            features,
            unity,
        })
    }

    /// Convert missing mandatory components into errors
    pub fn require(self) -> Result<ToolchainLocation, ToolchainError> {
        let unity = self.unity;

        let csharp_compiler =
            self.csharp_compiler.ok_or_else(|| ToolchainError::MissingComponent {
                component: "C# compiler",
                searched: unity.compiler_candidates(),
            })?;
        let linker = self.linker.ok_or_else(|| ToolchainError::MissingComponent {
            component: "UnityLinker",
            searched: unity.linker_candidates(),
        })?;
        let il2cpp = self.il2cpp.ok_or_else(|| ToolchainError::MissingComponent {
            component: "il2cpp",
            searched: unity.il2cpp_candidates(),
        })?;
        let runtime_library_dir =
            self.runtime_library_dir.ok_or_else(|| ToolchainError::MissingComponent {
                component: "mscorlib.dll",
                searched: vec![unity.runtime_library_dir(&self.features).join("mscorlib.dll")],
            })?;
        let engine_library =
            self.engine_library.ok_or_else(|| ToolchainError::MissingComponent {
                component: "UnityEngine.dll",
                searched: vec![unity.engine_library()],
            })?;

        let android = match (self.ndk, self.android_player) {
            (Some(ndk), Some(player_dir)) => Some(AndroidSupport {
                include_dirs: ndk.include_dirs(),
                ndk,
                player_dir,
            }),
            (None, _) => {
                info!("Android NDK not found, Android targets will be skipped");
                None
            }
            (Some(_), None) => {
                info!("Android player support not installed, Android targets will be skipped");
                None
            }
        };

        Ok(ToolchainLocation {
            managed_dir: unity.managed_dir(),
            features: self.features,
            csharp_compiler,
            linker,
            il2cpp,
            runtime_library_dir,
            engine_library,
            baselib: self.baselib,
            android,
            unity,
        })
    }
}

async fn probe_ndk(options: &ResolveOptions, unity: &UnityInstall) -> Option<NdkInstall> {
    let candidate = match (&options.ndk, &options.ndk_root) {
        (VersionSelector::Path(path), _) => Some(path.clone()),
        (selector, Some(root)) => match find_install(root, selector).await {
            Ok(found) => found,
            Err(e) => {
                warn!("NDK lookup failed: {}", e);
                None
            }
        },
        (selector, None) if selector.is_latest() => {
            let bundled = unity.android_player_dir().join("NDK");
            bundled.is_dir().then_some(bundled)
        }
        (selector, None) => {
            warn!("No NDK search root configured, cannot resolve NDK '{}'", selector);
            None
        }
    };

    let path = candidate?;
    match NdkInstall::open(path.clone()).await {
        Ok(Some(ndk)) => Some(ndk),
        Ok(None) => {
            info!("{:?} is not an Android NDK", path);
            None
        }
        Err(e) => {
            warn!("Cannot read NDK at {:?}: {}", path, e);
            None
        }
    }
}

/// Immutable result of toolchain resolution
#[derive(Debug, Clone)]
pub struct ToolchainLocation {
    pub unity: UnityInstall,
    pub features: ToolchainFeatures,
    pub csharp_compiler: ToolProgram,
    pub linker: PathBuf,
    pub il2cpp: PathBuf,
    pub runtime_library_dir: PathBuf,
    pub engine_library: PathBuf,
    pub managed_dir: PathBuf,
    pub baselib: BaselibDirs,
    pub android: Option<AndroidSupport>,
}

impl ToolchainLocation {
    /// Probe, then require
    pub async fn resolve(options: &ResolveOptions) -> Result<Self, ToolchainError> {
        ToolchainProbe::run(options).await?.require()
    }

    /// Version of the resolved Unity editor
    pub fn version(&self) -> Version {
        self.unity.version
    }

    /// `mscorlib.dll` in the runtime library directory
    pub fn runtime_library(&self) -> PathBuf {
        self.runtime_library_dir.join("mscorlib.dll")
    }

    /// Whether targets for `platform` can be built
    pub fn supports(&self, platform: Platform) -> bool {
        match platform {
            Platform::WindowsDesktop => true,
            Platform::Android => self.android.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    /// Lay out the mandatory parts of a Unity install
    fn fake_unity(editors: &Path, name: &str) -> UnityInstall {
        let unity = UnityInstall::open(editors.join(name)).unwrap();
        let features = ToolchainFeatures::for_version(&unity.version);
        touch(&unity.compiler_candidates()[1]);
        touch(&unity.linker_candidates()[0]);
        touch(&unity.il2cpp_candidates()[0]);
        touch(&unity.runtime_library_dir(&features).join("mscorlib.dll"));
        touch(&unity.engine_library());
        unity
    }

    fn options(editors: &Path, ndk_root: Option<PathBuf>) -> ResolveOptions {
        ResolveOptions {
            unity_root: editors.to_path_buf(),
            unity: VersionSelector::Latest,
            ndk_root,
            ndk: VersionSelector::Latest,
        }
    }

    #[tokio::test]
    async fn test_resolve_desktop_only() {
        let editors = TempDir::new().unwrap();
        let unity = fake_unity(editors.path(), "2019.4.40f1");

        let location = ToolchainLocation::resolve(&options(editors.path(), None)).await.unwrap();
        assert_eq!(location.version(), Version::new(2019, 4, 40));
        assert_eq!(location.il2cpp, unity.il2cpp_candidates()[0]);
        assert!(location.android.is_none());
        assert!(!location.supports(Platform::Android));
        assert_eq!(location.baselib, BaselibDirs::default());
    }

    #[tokio::test]
    async fn test_missing_il2cpp_is_fatal() {
        let editors = TempDir::new().unwrap();
        let unity = fake_unity(editors.path(), "2021.3.5f1");
        std::fs::remove_file(&unity.il2cpp_candidates()[0]).unwrap();

        let err = ToolchainLocation::resolve(&options(editors.path(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::MissingComponent { component: "il2cpp", .. }));
    }

    #[tokio::test]
    async fn test_unity_not_found() {
        let editors = TempDir::new().unwrap();
        let mut opts = options(editors.path(), None);
        opts.unity = VersionSelector::parse("2019.4.*");

        let err = ToolchainLocation::resolve(&opts).await.unwrap_err();
        assert!(matches!(err, ToolchainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_android_support() {
        let editors = TempDir::new().unwrap();
        let unity = fake_unity(editors.path(), "2021.3.5f1");
        std::fs::create_dir_all(unity.android_player_dir()).unwrap();
        let arm64 = unity.baselib_dir(Target::ANDROID_ARM64);
        std::fs::create_dir_all(&arm64).unwrap();

        let ndks = TempDir::new().unwrap();
        touch(&ndks.path().join("r21d").join("source.properties"));
        touch(&ndks.path().join("r23b").join("source.properties"));

        let options = options(editors.path(), Some(ndks.path().to_path_buf()));
        let location = ToolchainLocation::resolve(&options).await.unwrap();
        let android = location.android.as_ref().unwrap();
        assert_eq!(android.ndk.path, ndks.path().join("r23b"));
        assert_eq!(location.baselib.get(Target::ANDROID_ARM64), Some(arm64.as_path()));
        assert_eq!(location.baselib.get(Target::ANDROID_ARMV7), None);
    }

    #[tokio::test]
    async fn test_ndk_without_player_support() {
        let editors = TempDir::new().unwrap();
        fake_unity(editors.path(), "2021.3.5f1");
        let ndks = TempDir::new().unwrap();
        touch(&ndks.path().join("r23b").join("source.properties"));

        let options = options(editors.path(), Some(ndks.path().to_path_buf()));
        let location = ToolchainLocation::resolve(&options).await.unwrap();
        assert!(location.android.is_none());
    }

    #[tokio::test]
    async fn test_bundled_ndk_fallback() {
        let editors = TempDir::new().unwrap();
        let unity = fake_unity(editors.path(), "2021.3.5f1");
        let bundled = unity.android_player_dir().join("NDK");
        touch(&bundled.join("source.properties"));

        let location = ToolchainLocation::resolve(&options(editors.path(), None)).await.unwrap();
        assert_eq!(location.android.unwrap().ndk.path, bundled);
    }
}
