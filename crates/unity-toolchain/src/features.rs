//! Version-dependent toolchain behavior
//!
//! Every version gate lives in [`VERSION_TABLE`]. Rows are ordered newest
//! first; the first row whose lower bound is at or below the resolved version
//! applies.

use il2cpp_build_core::Version;

/// Layout of the managed runtime reference libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeLayout {
    /// `MonoBleedingEdge/lib/mono/unityaot`
    Shared,
    /// `MonoBleedingEdge/lib/mono/unityaot-<host>`
    PerHost,
}

/// Behavior switches derived from the Unity version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainFeatures {
    pub runtime_layout: RuntimeLayout,
    /// Pass baselib directories to native compiles
    pub baselib_directories: bool,
    /// Give the stripper the runtime/profile/editor-options flags
    pub linker_runtime_flags: bool,
    /// Pass `--dotnetprofile` to the AOT compiler
    pub dotnet_profile: bool,
}

struct VersionRange {
    since: Version,
    features: ToolchainFeatures,
}

const VERSION_TABLE: &[VersionRange] = &[
    VersionRange {
        since: Version::new(2021, 2, 0),
        features: ToolchainFeatures {
            runtime_layout: RuntimeLayout::PerHost,
            baselib_directories: true,
            linker_runtime_flags: true,
            dotnet_profile: true,
        },
    },
    VersionRange {
        since: Version::new(2020, 2, 0),
        features: ToolchainFeatures {
            runtime_layout: RuntimeLayout::Shared,
            baselib_directories: true,
            linker_runtime_flags: true,
            dotnet_profile: false,
        },
    },
    VersionRange {
        since: Version::new(0, 0, 0),
        features: ToolchainFeatures {
            runtime_layout: RuntimeLayout::Shared,
            baselib_directories: false,
            linker_runtime_flags: false,
            dotnet_profile: false,
        },
    },
];

/// Profile name the stripper and AOT compiler are told to target
pub const LEGACY_PROFILE: &str = "unityaot";

impl ToolchainFeatures {
    /// Row of the version table covering `version`
    pub fn for_version(version: &Version) -> Self {
        VERSION_TABLE
            .iter()
            .find(|row| *version >= row.since)
            .map(|row| row.features)
            .unwrap_or(VERSION_TABLE[VERSION_TABLE.len() - 1].features)
    }

    /// `unityaot` or `unityaot-<host>` depending on the runtime layout
    pub fn runtime_profile(&self) -> String {
        match self.runtime_layout {
            RuntimeLayout::Shared => LEGACY_PROFILE.to_string(),
            RuntimeLayout::PerHost => format!("{}-{}", LEGACY_PROFILE, host_profile_suffix()),
        }
    }
}

fn host_profile_suffix() -> &'static str {
    if cfg!(windows) {
        "win32"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    }
}
