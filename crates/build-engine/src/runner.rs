//! Pipeline driver
//!
//! `ResolvePaths -> CompileSources -> StripAssemblies -> TranspileToNative
//! -> CompileNativeTargets -> Done`. Stages and the identifiers and targets
//! within them run strictly in order, one tool at a time; the first failing
//! tool ends the run. Artifacts already written are left in place.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use il2cpp_build_core::Target;
use il2cpp_build_toolchain::ToolchainLocation;
use tracing::{debug, error, info, warn};

use crate::args::ArgumentBuilder;
use crate::config::{BuildRequest, OutputLayout};
use crate::executor::{CommandExecutor, Invocation, ProcessExecutor};
use crate::BuildError;

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    ResolvePaths,
    CompileSources,
    StripAssemblies,
    TranspileToNative,
    CompileNativeTargets,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ResolvePaths => "resolve paths",
            PipelineStage::CompileSources => "compile sources",
            PipelineStage::StripAssemblies => "strip assemblies",
            PipelineStage::TranspileToNative => "convert to C++",
            PipelineStage::CompileNativeTargets => "compile native targets",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful run
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Stages entered, in order
    pub stages: Vec<PipelineStage>,
    pub assemblies: Vec<PathBuf>,
    pub native_binaries: Vec<PathBuf>,
    /// Native targets skipped because their platform is unavailable
    pub skipped: Vec<(String, Target)>,
    pub duration_secs: f64,
}

impl BuildReport {
    pub fn final_stage(&self) -> Option<PipelineStage> {
        self.stages.last().copied()
    }

    /// True if the run reached `stage`
    pub fn entered(&self, stage: PipelineStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Runs the pipeline against a resolved toolchain
pub struct BuildRunner<E = ProcessExecutor> {
    location: ToolchainLocation,
    layout: OutputLayout,
    executor: E,
}

impl BuildRunner<ProcessExecutor> {
    /// Create a runner that spawns the real tools
    pub fn new(location: ToolchainLocation, layout: OutputLayout) -> Self {
        Self {
            location,
            layout,
            executor: ProcessExecutor,
        }
    }
}

impl<E: CommandExecutor> BuildRunner<E> {
    /// Swap the executor
    pub fn with_executor<F: CommandExecutor>(self, executor: F) -> BuildRunner<F> {
        BuildRunner {
            location: self.location,
            layout: self.layout,
            executor,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run the build
    pub async fn run(&self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        if request.identifiers.is_empty() {
            return Err(BuildError::ConfigError("no source identifiers to build".into()));
        }

        // The location was resolved before this runner existed.
        let mut report = BuildReport {
            stages: vec![PipelineStage::ResolvePaths],
            ..Default::default()
        };

        match self.run_stages(request, &mut report).await {
            Ok(()) => {
                report.stages.push(PipelineStage::Done);
                report.duration_secs = start.elapsed().as_secs_f64();
                info!("Build completed in {:.2}s", report.duration_secs);
                Ok(report)
            }
            Err(e) => {
                let stage = report.final_stage().unwrap_or(PipelineStage::ResolvePaths);
                error!("Pipeline {} during '{}': {}", PipelineStage::Failed, stage, e);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &BuildRequest,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let builder = ArgumentBuilder::new(&self.location, &self.layout, request.configuration);
        let layout = &self.layout;
        let touch_fs = !self.executor.is_dry_run();

        self.enter(report, PipelineStage::CompileSources);
        if touch_fs {
            tokio::fs::create_dir_all(&layout.assemblies_dir).await?;
        }
        for id in &request.identifiers {
            info!("Compiling {}", id);
            self.invoke(builder.compile(id)).await?;
            report.assemblies.push(layout.assembly(id));
        }

        self.enter(report, PipelineStage::StripAssemblies);
        for id in &request.identifiers {
            info!("Stripping {}", id);
            if touch_fs {
                tokio::fs::create_dir_all(layout.stripped_dir(id)).await?;
            }
            self.invoke(builder.strip(id)).await?;
        }

        self.enter(report, PipelineStage::TranspileToNative);
        for id in &request.identifiers {
            info!("Converting {} to C++", id);
            let cpp_dir = layout.generated_cpp_dir(id);
            if touch_fs {
                if cpp_dir.exists() {
                    debug!("Removing stale {:?}", cpp_dir);
                    tokio::fs::remove_dir_all(&cpp_dir).await?;
                }
                tokio::fs::create_dir_all(&layout.cpp_dir).await?;
            }
            self.invoke(builder.transpile(id)).await?;
        }

        if request.targets.is_empty() {
            info!("No targets requested, skipping native compilation");
            return Ok(());
        }

        self.enter(report, PipelineStage::CompileNativeTargets);
        for id in &request.identifiers {
            for &target in &request.targets {
                let Some(invocation) = builder.compile_native(id, target) else {
                    warn!("Skipping {} for {}: toolchain not available", target, id);
                    report.skipped.push((id.clone(), target));
                    continue;
                };

                info!("Compiling {} for {}", id, target);
                if touch_fs {
                    tokio::fs::create_dir_all(layout.cache_dir(id, target)).await?;
                }
                self.invoke(invocation).await?;
                report.native_binaries.push(layout.binary(id, target));
            }
        }

        Ok(())
    }

    fn enter(&self, report: &mut BuildReport, stage: PipelineStage) {
        info!("==> {}", stage);
        report.stages.push(stage);
    }

    async fn invoke(&self, invocation: Invocation) -> Result<(), BuildError> {
        let outcome = self.executor.execute(&invocation).await?;

        if outcome.success() {
            Ok(())
        } else {
            Err(BuildError::StepFailed {
                stage: invocation.stage,
                subject: invocation.subject(),
                code: outcome.code,
            })
        }
    }
}
