//! CLI commands
//!
//! Each command resolves the toolchain from the persisted configuration and
//! the version selectors, then does its work with that immutable location.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use il2cpp_build_core::CoreError;
use il2cpp_build_core::{BuildConfiguration, Target, ToolConfig};
use il2cpp_build_engine::{
    BuildReport, BuildRequest, BuildRunner, DryRunExecutor, OutputLayout, PipelineStage,
};
use il2cpp_build_toolchain::{ResolveOptions, ToolchainLocation, ToolchainProbe, VersionSelector};
use tracing::info;

use crate::sources::select_sources;

/// Toolchain selection shared by all commands
#[derive(Debug, Clone)]
pub struct ToolchainArgs {
    pub unity_version: String,
    pub ndk_version: String,
    pub config_path: Option<PathBuf>,
}

fn readable(e: CoreError) -> anyhow::Error {
    anyhow!(e.user_message())
}

impl ToolchainArgs {
    async fn load_config(&self) -> Result<(ToolConfig, ResolveOptions)> {
        let config = ToolConfig::load(self.config_path.as_deref())
            .await
            .map_err(readable)
            .context("loading configuration")?;
        let roots = config
            .search_roots()
            .await
            .map_err(readable)
            .context("reading search roots")?;

        let options = ResolveOptions {
            unity_root: roots.unity,
            unity: VersionSelector::parse(&self.unity_version),
            ndk_root: roots.ndk,
            ndk: VersionSelector::parse(&self.ndk_version),
        };
        Ok((config, options))
    }
}

/// Build command options
pub struct BuildCommand {
    pub toolchain: ToolchainArgs,
    pub assemblies: Vec<String>,
    pub targets: Vec<Target>,
    pub source_dir: Option<PathBuf>,
    pub configuration: Option<BuildConfiguration>,
    pub dry_run: bool,
}

impl BuildCommand {
    /// Execute the build command
    pub async fn execute(&self) -> Result<BuildReport> {
        let (mut config, options) = self.toolchain.load_config().await?;
        if let Some(dir) = &self.source_dir {
            config.build.source_dir = dir.clone();
        }
        let configuration = self.configuration.unwrap_or(config.build.configuration);

        info!("==> {}", PipelineStage::ResolvePaths);
        let location = ToolchainLocation::resolve(&options)
            .await
            .context("resolving the Unity toolchain")?;

        let layout = OutputLayout::from_config(&config);
        let identifiers = select_sources(&layout, &self.assemblies)?;
        info!("Building {} with Unity {}", identifiers.join(", "), location.version());

        let request = BuildRequest::new(identifiers)
            .with_targets(self.targets.clone())
            .with_configuration(configuration);

        let runner = BuildRunner::new(location, layout);
        let report = if self.dry_run {
            runner.with_executor(DryRunExecutor::new()).run(&request).await?
        } else {
            runner.run(&request).await?
        };

        for binary in &report.native_binaries {
            info!("Built {:?}", binary);
        }
        Ok(report)
    }
}

/// Toolchain status command
pub struct CheckCommand {
    pub toolchain: ToolchainArgs,
}

fn status_line(label: &str, path: Option<&Path>) {
    match path {
        Some(p) => println!("✓ {}: {:?}", label, p),
        None => println!("✗ {}: Not found", label),
    }
}

impl CheckCommand {
    /// Print what was found, then fail if a mandatory component is missing
    pub async fn execute(&self) -> Result<ToolchainLocation> {
        let (_, options) = self.toolchain.load_config().await?;
        let probe = ToolchainProbe::run(&options)
            .await
            .context("locating the Unity editor")?;

        println!("IL2CPP Toolchain Status:");
        println!("========================");
        println!("Unity {} at {:?}", probe.unity.version, probe.unity.root);
        println!("Runtime profile: {}", probe.features.runtime_profile());

        status_line(
            "C# compiler",
            probe.csharp_compiler.as_ref().map(|c| c.program.as_path()),
        );
        status_line("UnityLinker", probe.linker.as_deref());
        status_line("il2cpp", probe.il2cpp.as_deref());
        status_line("Runtime libraries", probe.runtime_library_dir.as_deref());
        status_line("UnityEngine.dll", probe.engine_library.as_deref());
        for target in Target::all() {
            status_line(&format!("Baselib {}", target), probe.baselib.get(*target));
        }
        status_line("Android player support", probe.android_player.as_deref());
        status_line("Android NDK", probe.ndk.as_ref().map(|n| n.path.as_path()));

        let location = probe.require().context("toolchain is incomplete")?;
        println!(
            "Android targets: {}",
            if location.android.is_some() { "enabled" } else { "disabled" }
        );
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_file_fails_before_resolution() {
        let dir = TempDir::new().unwrap();
        let command = CheckCommand {
            toolchain: ToolchainArgs {
                unity_version: "latest".into(),
                ndk_version: "latest".into(),
                config_path: Some(dir.path().join("absent.toml")),
            },
        };
        let err = command.execute().await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("loading configuration"), "{message}");
        assert!(message.contains("does not exist"), "{message}");
    }

    #[tokio::test]
    async fn test_malformed_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let config_file = dir.path().join("il2cpp-build.toml");
        std::fs::write(&config_file, "[roots\n").unwrap();
        let command = CheckCommand {
            toolchain: ToolchainArgs {
                unity_version: "latest".into(),
                ndk_version: "latest".into(),
                config_path: Some(config_file),
            },
        };
        let message = format!("{:#}", command.execute().await.unwrap_err());
        assert!(message.starts_with("loading configuration: TOML parse error"), "{message}");
    }

    #[tokio::test]
    async fn test_unity_not_found_is_reported() {
        let dir = TempDir::new().unwrap();
        let editors = dir.path().join("editors");
        std::fs::create_dir(&editors).unwrap();
        let root_file = dir.path().join("unity-root.txt");
        std::fs::write(&root_file, editors.to_string_lossy().as_bytes()).unwrap();
        let config_file = dir.path().join("il2cpp-build.toml");
        std::fs::write(
            &config_file,
            format!("[roots]\nunity_root_file = {:?}\n", root_file.to_string_lossy()),
        )
        .unwrap();

        let command = BuildCommand {
            toolchain: ToolchainArgs {
                unity_version: "2019.4.*".into(),
                ndk_version: "latest".into(),
                config_path: Some(config_file),
            },
            assemblies: vec![],
            targets: vec![],
            source_dir: Some(dir.path().to_path_buf()),
            configuration: None,
            dry_run: true,
        };

        let err = command.execute().await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("resolving the Unity toolchain"), "{message}");
        assert!(message.contains("not found"), "{message}");
    }
}
