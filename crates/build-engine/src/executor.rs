//! External command execution

use std::path::PathBuf;
use std::process::Stdio;

use il2cpp_build_core::Target;
use parking_lot::Mutex;
use tokio::process::Command;
use tracing::{debug, info};

use crate::runner::PipelineStage;
use crate::BuildError;

/// One external tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stage: PipelineStage,
    pub identifier: String,
    pub target: Option<Target>,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Identifier, plus the target for native compiles
    pub fn subject(&self) -> String {
        match self.target {
            Some(target) => format!("'{}' [{}]", self.identifier, target),
            None => format!("'{}'", self.identifier),
        }
    }

    /// Shell-like rendering for logs
    pub fn command_line(&self) -> String {
        let mut line = quote(&self.program.to_string_lossy());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        line
    }
}

fn quote(s: &str) -> String {
    if s.contains(' ') {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// How an external step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs pipeline steps. Each call blocks until the tool exits.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ExitOutcome, BuildError>;

    /// Dry runs leave the output directories alone
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Spawns the real tools with inherited stdout/stderr
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ExitOutcome, BuildError> {
        debug!("Running: {}", invocation.command_line());

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| BuildError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}

/// Logs and records invocations without running anything
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    recorded: Mutex<Vec<Invocation>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations recorded so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.recorded.lock().clone()
    }
}

impl CommandExecutor for DryRunExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ExitOutcome, BuildError> {
        info!("[dry-run] {}", invocation.command_line());
        self.recorded.lock().push(invocation.clone());
        Ok(ExitOutcome::SUCCESS)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
