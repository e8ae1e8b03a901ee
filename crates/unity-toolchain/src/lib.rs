//! Toolchain discovery
//!
//! Locates a Unity editor installation and, optionally, an Android NDK,
//! and resolves every path the pipeline needs:
//! - the C# compiler, the bytecode stripper and the IL2CPP AOT compiler
//! - runtime and engine reference libraries
//! - baselib and Android support directories

pub mod detector;
pub mod error;
pub mod features;
pub mod location;
pub mod ndk;
pub mod unity;

pub use detector::{find_install, require_install, VersionSelector};
pub use error::ToolchainError;
pub use features::{RuntimeLayout, ToolchainFeatures};
pub use location::{
    AndroidSupport, BaselibDirs, ResolveOptions, ToolchainLocation, ToolchainProbe,
};
pub use ndk::NdkInstall;
pub use unity::{ToolProgram, UnityInstall};
