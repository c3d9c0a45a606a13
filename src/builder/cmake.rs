//! CMake invocation behind the [`BuildBackend`] seam.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::platform::BuildConfig;
use crate::util::process::{find_cmake, ProcessBuilder};

/// One of the three per-node steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStepKind {
    Configure,
    Build,
    Install,
}

impl BuildStepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStepKind::Configure => "configure",
            BuildStepKind::Build => "build",
            BuildStepKind::Install => "install",
        }
    }
}

impl fmt::Display for BuildStepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of a configure step.
#[derive(Debug, Clone)]
pub struct ConfigureRequest<'a> {
    pub source_dir: &'a Path,
    pub build_dir: &'a Path,
    pub install_dir: &'a Path,
    pub toolchain_file: &'a Path,
    pub generator: &'a str,
    pub config: BuildConfig,
    /// Install directories of every direct dependency
    pub prefix_path: Vec<PathBuf>,
    /// Additional `-D` cache entries
    pub vars: BTreeMap<String, String>,
}

/// Result of running one step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// The command line, as echoed before running
    pub command: String,
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

impl StepOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The native build system: configure, build and install one project.
///
/// Implementations only report failures to *run* the tool as errors; a
/// non-zero exit is returned in [`StepOutput::exit_code`] for the caller to
/// judge.
pub trait BuildBackend {
    fn configure(&mut self, request: &ConfigureRequest<'_>) -> Result<StepOutput>;

    fn build(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput>;

    fn install(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput>;
}

/// CMake build backend.
#[derive(Debug, Clone)]
pub struct CMakeBackend {
    cmake: PathBuf,
    cwd: PathBuf,
}

impl CMakeBackend {
    /// Locate CMake; all commands run from `cwd`.
    pub fn new(cwd: &Path) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build the projects.\n\
                 Install CMake and ensure it's in your PATH."
            );
        };

        Ok(CMakeBackend {
            cmake,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Arguments of the configure command line.
    pub fn configure_args(request: &ConfigureRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "-G".to_string(),
            request.generator.to_string(),
            "-S".to_string(),
            request.source_dir.display().to_string(),
            "-B".to_string(),
            request.build_dir.display().to_string(),
            format!("-DCMAKE_TOOLCHAIN_FILE={}", request.toolchain_file.display()),
            format!("-DCMAKE_INSTALL_PREFIX={}", request.install_dir.display()),
            format!("-DCMAKE_BUILD_TYPE={}", request.config.to_native_name()),
        ];

        if !request.prefix_path.is_empty() {
            let joined = request
                .prefix_path
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(";");
            args.push(format!("-DCMAKE_PREFIX_PATH={}", joined));
        }

        for (key, value) in &request.vars {
            args.push(format!("-D{}={}", key, value));
        }

        args
    }

    fn run(&self, cmd: ProcessBuilder) -> Result<StepOutput> {
        let command = cmd.display_command();
        tracing::info!("{}", command);

        let output = cmd.cwd(&self.cwd).exec_merged()?;
        Ok(StepOutput {
            command,
            exit_code: output.status.code(),
            output: output.text,
        })
    }
}

impl BuildBackend for CMakeBackend {
    fn configure(&mut self, request: &ConfigureRequest<'_>) -> Result<StepOutput> {
        self.run(ProcessBuilder::new(&self.cmake).args(Self::configure_args(request)))
    }

    fn build(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput> {
        // --config only matters for multi-config generators
        self.run(
            ProcessBuilder::new(&self.cmake)
                .arg("--build")
                .arg(build_dir)
                .arg("--config")
                .arg(config.to_native_name()),
        )
    }

    fn install(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput> {
        self.run(
            ProcessBuilder::new(&self.cmake)
                .arg("--install")
                .arg(build_dir)
                .arg("--config")
                .arg(config.to_native_name()),
        )
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
