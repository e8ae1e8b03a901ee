//! IL2CPP Build Engine
//!
//! Runs the build pipeline: compile C# sources, strip the assemblies,
//! convert them to C++ and compile the C++ for each requested target.

pub mod args;
pub mod config;
pub mod executor;
pub mod runner;

pub use args::ArgumentBuilder;
pub use config::{BuildRequest, OutputLayout, TARGET_DIR_PREFIX};
pub use executor::{CommandExecutor, DryRunExecutor, ExitOutcome, Invocation, ProcessExecutor};
pub use runner::{BuildReport, BuildRunner, PipelineStage};

use std::path::PathBuf;

use il2cpp_build_core::CoreError;
use il2cpp_build_toolchain::ToolchainError;

/// Build errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("{stage} failed for {subject} ({})", describe_exit(.code))]
    StepFailed {
        stage: PipelineStage,
        subject: String,
        code: Option<i32>,
    },
    #[error("Failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or missing toolchain; raised before any step runs
    Configuration,
    /// An external step failed or could not be run
    ExternalStep,
}

impl BuildError {
    /// Whether the failure came from the inputs or from an external tool
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Toolchain(_) | BuildError::Core(_) | BuildError::ConfigError(_) => {
                ErrorKind::Configuration
            }
            BuildError::StepFailed { .. } | BuildError::Spawn { .. } | BuildError::Io(_) => {
                ErrorKind::ExternalStep
            }
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
