//! il2cpp-build core - shared types
//!
//! Version parsing and comparison, target descriptors and the persisted
//! configuration read once at startup.

pub mod config;
pub mod error;
pub mod target;
pub mod version;

pub use config::{BuildConfiguration, SearchRoots, ToolConfig};
pub use error::{CoreError, Result};
pub use target::{Architecture, Platform, Target};
pub use version::{compare, Version};

/// il2cpp-build version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "il2cpp-build";
