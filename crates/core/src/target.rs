//! Native build targets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Target operating environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    WindowsDesktop,
    Android,
}

impl Platform {
    /// Name passed to the AOT compiler's `--platform` flag
    pub fn il2cpp_name(&self) -> &'static str {
        match self {
            Platform::WindowsDesktop => "WindowsDesktop",
            Platform::Android => "Android",
        }
    }

    /// File name of the native binary for an identifier
    pub fn binary_name(&self, identifier: &str) -> String {
        match self {
            Platform::WindowsDesktop => format!("{}.dll", identifier),
            Platform::Android => format!("lib{}.so", identifier),
        }
    }
}

/// Target CPU/ABI variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    X64,
    ARMv7,
    ARM64,
}

impl Architecture {
    /// Short name used on the command line and in output directory names
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::ARMv7 => "armv7",
            Architecture::ARM64 => "arm64",
        }
    }

    /// Name passed to the AOT compiler's `--architecture` flag
    pub fn il2cpp_name(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::ARMv7 => "ARMv7",
            Architecture::ARM64 => "ARM64",
        }
    }

    /// Android ABI directory name
    pub fn abi_name(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x86_64",
            Architecture::ARMv7 => "armeabi-v7a",
            Architecture::ARM64 => "arm64-v8a",
        }
    }
}

/// A (platform, architecture) pair the native compile step builds for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub platform: Platform,
    pub architecture: Architecture,
}

impl Target {
    pub const WIN_X86: Target = Target::new(Platform::WindowsDesktop, Architecture::X86);
    pub const WIN_X64: Target = Target::new(Platform::WindowsDesktop, Architecture::X64);
    pub const ANDROID_ARMV7: Target = Target::new(Platform::Android, Architecture::ARMv7);
    pub const ANDROID_ARM64: Target = Target::new(Platform::Android, Architecture::ARM64);

    /// Target for a platform and architecture
    pub const fn new(platform: Platform, architecture: Architecture) -> Self {
        Self { platform, architecture }
    }

    /// Every target the orchestrator knows how to build
    pub fn all() -> &'static [Target] {
        &[
            Target::WIN_X86,
            Target::WIN_X64,
            Target::ANDROID_ARMV7,
            Target::ANDROID_ARM64,
        ]
    }

    /// Android targets need the NDK and the Android player
    pub fn is_android(&self) -> bool {
        self.platform == Platform::Android
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x86" => Ok(Target::WIN_X86),
            "x64" => Ok(Target::WIN_X64),
            "armv7" => Ok(Target::ANDROID_ARMV7),
            "arm64" => Ok(Target::ANDROID_ARM64),
            other => Err(CoreError::Config(format!(
                "unknown target '{}' (expected x86, x64, armv7 or arm64)",
                other
            ))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform.il2cpp_name(), self.architecture.il2cpp_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_str() {
        assert_eq!("x64".parse::<Target>().unwrap(), Target::WIN_X64);
        assert_eq!("ARM64".parse::<Target>().unwrap(), Target::ANDROID_ARM64);
        assert!("mips".parse::<Target>().is_err());
    }

    #[test]
    fn test_is_android() {
        assert!(Target::ANDROID_ARMV7.is_android());
        assert!(Target::ANDROID_ARM64.is_android());
        assert!(!Target::WIN_X86.is_android());
        assert!(!Target::WIN_X64.is_android());
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(Platform::WindowsDesktop.binary_name("Game"), "Game.dll");
        assert_eq!(Platform::Android.binary_name("Game"), "libGame.so");
    }
}
