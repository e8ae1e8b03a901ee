//! il2cpp-build
//!
//! Drives Unity's IL2CPP toolchain from the command line: compiles C#
//! sources against the Unity runtime, strips the assemblies, converts them
//! to C++ and compiles the C++ into native libraries for Windows desktop
//! and Android.
//!
//! ## Architecture
//!
//! - `il2cpp-build-core`: versions, targets and persisted configuration
//! - `il2cpp-build-toolchain`: Unity editor and Android NDK discovery
//! - `il2cpp-build-engine`: argument construction and the build pipeline

#![warn(clippy::all)]

pub mod commands;
pub mod sources;

pub use il2cpp_build_core as base;
pub use il2cpp_build_engine as build;
pub use il2cpp_build_toolchain as toolchain;

/// Prelude module for convenient imports
pub mod prelude {
    pub use il2cpp_build_core::{BuildConfiguration, Target, ToolConfig, Version};
    pub use il2cpp_build_engine::{BuildReport, BuildRequest, BuildRunner, OutputLayout};
    pub use il2cpp_build_toolchain::{ResolveOptions, ToolchainLocation, VersionSelector};
}
