//! il2cpp-build command-line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use il2cpp_build::commands::{BuildCommand, CheckCommand, ToolchainArgs};
use il2cpp_build::base::{BuildConfiguration, Target, APP_NAME, VERSION};

#[derive(Parser)]
#[command(
    name = "il2cpp-build",
    version,
    about = "Build native libraries from C# with Unity's IL2CPP"
)]
struct Cli {
    /// Source identifiers to build (default: every .cs file in the source directory)
    #[arg(long, value_delimiter = ',')]
    assemblies: Vec<String>,
    /// Unity version pattern (e.g. 2019.4.*) or install path
    #[arg(long, default_value = "latest")]
    unity_version: String,
    /// Android NDK version pattern or install path
    #[arg(long, default_value = "latest")]
    ndk_version: String,
    /// Native targets: x86, x64, armv7, arm64. Omit to stop after C++ generation.
    #[arg(long, value_delimiter = ',', value_parser = parse_target)]
    targets: Vec<Target>,
    /// Configuration file (default: il2cpp-build.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the .cs sources
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Native build configuration (Release or Debug)
    #[arg(long, value_parser = parse_configuration)]
    configuration: Option<BuildConfiguration>,
    /// Log the commands without running them
    #[arg(long)]
    dry_run: bool,
    /// Print toolchain status and exit
    #[arg(long)]
    check: bool,
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_target(s: &str) -> Result<Target, String> {
    s.parse::<Target>().map_err(|e| e.to_string())
}

fn parse_configuration(s: &str) -> Result<BuildConfiguration, String> {
    match s.to_ascii_lowercase().as_str() {
        "release" => Ok(BuildConfiguration::Release),
        "debug" => Ok(BuildConfiguration::Debug),
        other => Err(format!("unknown configuration '{}' (expected Release or Debug)", other)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("{} v{}", APP_NAME, VERSION);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let toolchain = ToolchainArgs {
        unity_version: cli.unity_version,
        ndk_version: cli.ndk_version,
        config_path: cli.config,
    };

    if cli.check {
        CheckCommand { toolchain }.execute().await?;
        return Ok(());
    }

    let command = BuildCommand {
        toolchain,
        assemblies: cli.assemblies,
        targets: cli.targets,
        source_dir: cli.source_dir,
        configuration: cli.configuration,
        dry_run: cli.dry_run,
    };
    let report = command.execute().await?;

    if !report.skipped.is_empty() {
        info!("{} native target(s) skipped", report.skipped.len());
    }
    Ok(())
}
