//! Command-line construction for each pipeline step
//!
//! Version gates come from [`ToolchainFeatures`], evaluated once when the
//! toolchain was resolved; nothing here compares versions.
//!
//! [`ToolchainFeatures`]: il2cpp_build_toolchain::ToolchainFeatures

use std::path::Path;

use il2cpp_build_core::{BuildConfiguration, Target};
use il2cpp_build_toolchain::ToolchainLocation;

use crate::config::OutputLayout;
use crate::executor::Invocation;
use crate::runner::PipelineStage;

/// Stripper flags added once the linker understands runtime profiles
const LINKER_RUNTIME_FLAGS: &[&str] = &["--dotnetruntime=il2cpp", "--use-editor-options"];

fn path_arg(flag: &str, path: &Path) -> String {
    format!("{}={}", flag, path.display())
}

/// Builds the invocation for every step from one resolved location
pub struct ArgumentBuilder<'a> {
    location: &'a ToolchainLocation,
    layout: &'a OutputLayout,
    configuration: BuildConfiguration,
}

impl<'a> ArgumentBuilder<'a> {
    /// Builder for one run
    pub fn new(
        location: &'a ToolchainLocation,
        layout: &'a OutputLayout,
        configuration: BuildConfiguration,
    ) -> Self {
        Self {
            location,
            layout,
            configuration,
        }
    }

    /// `--dotnetprofile=...`, shared by both AOT compiler modes
    fn profile_flag(&self) -> Option<String> {
        let features = &self.location.features;
        features
            .dotnet_profile
            .then(|| format!("--dotnetprofile={}", features.runtime_profile()))
    }

    fn invocation(
        &self,
        stage: PipelineStage,
        identifier: &str,
        target: Option<Target>,
        program: &Path,
        args: Vec<String>,
    ) -> Invocation {
        Invocation {
            stage,
            identifier: identifier.to_string(),
            target,
            program: program.to_path_buf(),
            args,
        }
    }

    /// C# source to assembly
    pub fn compile(&self, identifier: &str) -> Invocation {
        let compiler = &self.location.csharp_compiler;
        let mut args = compiler.leading_args.clone();

        args.extend(
            ["-target:library", "-nostdlib", "-optimize+", "-unsafe+", "-langversion:latest"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(format!("-r:{}", self.location.runtime_library().display()));
        args.push(format!("-r:{}", self.location.engine_library.display()));
        args.push(format!("-out:{}", self.layout.assembly(identifier).display()));
        args.push(self.layout.source_file(identifier).to_string_lossy().to_string());

        self.invocation(PipelineStage::CompileSources, identifier, None, &compiler.program, args)
    }

    /// Assembly to stripped assembly directory
    pub fn strip(&self, identifier: &str) -> Invocation {
        let location = self.location;
        let mut args = vec![
            path_arg("--out", &self.layout.stripped_dir(identifier)),
            path_arg("--include-unity-root-assembly", &self.layout.assembly(identifier)),
            path_arg("--include-directory", &location.runtime_library_dir),
            path_arg("--include-directory", &location.managed_dir),
            path_arg("--include-directory", &self.layout.assemblies_dir),
            "--i18n=none".to_string(),
            "--core-action=link".to_string(),
            "--strip-security".to_string(),
        ];

        if location.features.linker_runtime_flags {
            args.extend(LINKER_RUNTIME_FLAGS.iter().map(|s| s.to_string()));
            args.push(format!("--dotnetprofile={}", location.features.runtime_profile()));
        }

        self.invocation(PipelineStage::StripAssemblies, identifier, None, &location.linker, args)
    }

    /// Stripped assemblies to generated C++
    pub fn transpile(&self, identifier: &str) -> Invocation {
        let mut args = vec![
            "--convert-to-cpp".to_string(),
            path_arg("--directory", &self.layout.stripped_dir(identifier)),
            path_arg("--generatedcppdir", &self.layout.generated_cpp_dir(identifier)),
        ];
        args.extend(self.profile_flag());

        self.invocation(
            PipelineStage::TranspileToNative,
            identifier,
            None,
            &self.location.il2cpp,
            args,
        )
    }

    /// Generated C++ to a native binary.
    ///
    /// Returns `None` when the target's platform is not available, which for
    /// Android means no NDK or no Android player support.
    pub fn compile_native(&self, identifier: &str, target: Target) -> Option<Invocation> {
        if !self.location.supports(target.platform) {
            return None;
        }

        let layout = self.layout;
        let mut args = vec![
            "--compile-cpp".to_string(),
            format!("--platform={}", target.platform.il2cpp_name()),
            format!("--architecture={}", target.architecture.il2cpp_name()),
            format!("--configuration={}", self.configuration.as_str()),
            path_arg("--outputpath", &layout.binary(identifier, target)),
            path_arg("--cachedirectory", &layout.cache_dir(identifier, target)),
            path_arg("--generatedcppdir", &layout.generated_cpp_dir(identifier)),
        ];

        if self.location.features.baselib_directories {
            if let Some(dir) = self.location.baselib.get(target) {
                args.push(path_arg("--baselib-directory", dir));
            }
        }

        if target.is_android() {
            if let Some(android) = &self.location.android {
                args.push(path_arg("--tool-chain-path", &android.ndk.path));
                for dir in &android.include_dirs {
                    args.push(path_arg("--additional-include-directories", dir));
                }
            }
        }

        args.extend(self.profile_flag());

        Some(self.invocation(
            PipelineStage::CompileNativeTargets,
            identifier,
            Some(target),
            &self.location.il2cpp,
            args,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dir_arg, has_flag, location};

    const GATED: &[&str] = &[
        "--dotnetprofile",
        "--dotnetruntime",
        "--use-editor-options",
        "--baselib-directory",
    ];

    fn all_invocations(builder: &ArgumentBuilder<'_>) -> Vec<Invocation> {
        let mut all = vec![
            builder.compile("Game"),
            builder.strip("Game"),
            builder.transpile("Game"),
        ];
        all.extend(Target::all().iter().filter_map(|t| builder.compile_native("Game", *t)));
        all
    }

    #[test]
    fn test_compile_flags() {
        let location = location("2021.3.5f1", false, false);
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        let inv = builder.compile("Game");
        assert_eq!(inv.program, location.csharp_compiler.program);
        for flag in ["-optimize+", "-unsafe+", "-langversion:latest"] {
            assert!(inv.args.iter().any(|a| a == flag), "missing {flag}");
        }
        assert!(inv.args.contains(&format!("-r:{}", location.runtime_library().display())));
        assert!(inv.args.contains(&format!("-r:{}", location.engine_library.display())));
        assert_eq!(inv.args.last().unwrap(), &layout.source_file("Game").to_string_lossy());
    }

    #[test]
    fn test_hosted_compiler_leads_with_assembly() {
        let mut location = location("2022.3.0f1", false, false);
        location.csharp_compiler = il2cpp_build_toolchain::ToolProgram::hosted(
            "/unity/NetCoreRuntime/dotnet".into(),
            Path::new("/unity/DotNetSdkRoslyn/csc.dll"),
        );
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        let inv = builder.compile("Game");
        assert_eq!(inv.program, Path::new("/unity/NetCoreRuntime/dotnet"));
        assert_eq!(inv.args[0], "/unity/DotNetSdkRoslyn/csc.dll");
    }

    #[test]
    fn test_legacy_version_has_no_gated_flags() {
        let location = location("2019.4.40f1", true, true);
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        let all = all_invocations(&builder);
        assert_eq!(all.len(), 7);
        for inv in &all {
            for flag in GATED {
                assert!(!has_flag(&inv.args, flag), "{flag} in {:?}", inv.args);
            }
        }
    }

    #[test]
    fn test_profile_flag_shared_by_both_aot_modes() {
        let location = location("2021.3.5f1", false, false);
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        let profile = |args: &[String]| -> Vec<String> {
            args.iter()
                .filter(|a| a.starts_with("--dotnetprofile="))
                .cloned()
                .collect()
        };

        let transpile = profile(&builder.transpile("Game").args);
        let native = profile(&builder.compile_native("Game", Target::WIN_X64).unwrap().args);
        assert_eq!(transpile.len(), 1);
        assert_eq!(transpile, native);
    }

    #[test]
    fn test_linker_runtime_flags() {
        let layout = OutputLayout::new("src", "build");

        let old = location("2020.1.17f1", false, false);
        let args = ArgumentBuilder::new(&old, &layout, BuildConfiguration::Release)
            .strip("Game")
            .args;
        assert!(!has_flag(&args, "--dotnetruntime"));

        let new = location("2020.3.48f1", false, false);
        let args = ArgumentBuilder::new(&new, &layout, BuildConfiguration::Release)
            .strip("Game")
            .args;
        assert!(args.contains(&"--dotnetruntime=il2cpp".to_string()));
        assert!(args.contains(&"--use-editor-options".to_string()));
        assert!(args.contains(&"--dotnetprofile=unityaot".to_string()));
        assert!(args.contains(&dir_arg("--out", &layout.stripped_dir("Game"))));
    }

    #[test]
    fn test_baselib_only_where_present() {
        let mut location = location("2020.3.48f1", false, true);
        location.baselib.win_x86 = None;
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Debug);

        let x64 = builder.compile_native("Game", Target::WIN_X64).unwrap();
        let win_x64 = location.baselib.win_x64.as_deref().unwrap();
        let expected = dir_arg("--baselib-directory", win_x64);
        assert!(x64.args.contains(&expected));
        assert!(x64.args.contains(&"--configuration=Debug".to_string()));

        let x86 = builder.compile_native("Game", Target::WIN_X86).unwrap();
        assert!(!has_flag(&x86.args, "--baselib-directory"));
    }

    #[test]
    fn test_android_native_args() {
        let location = location("2021.3.5f1", true, false);
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        let inv = builder.compile_native("Game", Target::ANDROID_ARM64).unwrap();
        assert!(inv.args.contains(&"--platform=Android".to_string()));
        assert!(inv.args.contains(&"--architecture=ARM64".to_string()));
        assert!(inv.args.contains(&dir_arg("--tool-chain-path", Path::new("/ndk/r23b"))));
        assert!(has_flag(&inv.args, "--additional-include-directories="));
        let binary = layout.binary("Game", Target::ANDROID_ARM64);
        assert!(inv.args.contains(&dir_arg("--outputpath", &binary)));
    }

    #[test]
    fn test_android_unavailable() {
        let location = location("2021.3.5f1", false, false);
        let layout = OutputLayout::new("src", "build");
        let builder = ArgumentBuilder::new(&location, &layout, BuildConfiguration::Release);

        assert!(builder.compile_native("Game", Target::ANDROID_ARMV7).is_none());
        let x64 = builder.compile_native("Game", Target::WIN_X64).unwrap();
        assert!(!has_flag(&x64.args, "--tool-chain-path"));
    }
}
