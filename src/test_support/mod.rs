//! Test utilities and fakes for Shipyard unit tests.
//!
//! [`RecordingBackend`] stands in for CMake: it records every step it is
//! asked to run, can be told to fail a given step, and writes an install
//! marker so that tests can see whether dependents were configured against
//! real artifacts.
//!
//! # Example
//!
//! ```rust,ignore
//! use shipyard::test_support::{linux_toolchain, RecordingBackend};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let toolchain = linux_toolchain(tmp.path());
//!     let mut backend = RecordingBackend::new().fail_at("zlib", BuildStepKind::Install);
//!     // Hand `&mut backend` to the orchestrator...
//! }
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::cmake::{BuildBackend, BuildStepKind, ConfigureRequest, StepOutput};
use crate::core::platform::BuildConfig;

pub use fixtures::*;

/// File written into an install directory by a successful fake install.
pub const INSTALL_MARKER: &str = "installed.txt";

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Configure {
        source_dir: PathBuf,
        build_dir: PathBuf,
        install_dir: PathBuf,
        toolchain_file: PathBuf,
        config: BuildConfig,
        prefix_path: Vec<PathBuf>,
        vars: BTreeMap<String, String>,
    },
    Build(PathBuf),
    Install(PathBuf),
}

/// A [`BuildBackend`] that runs nothing.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    events: Vec<BackendEvent>,
    /// build dir -> install dir, learned at configure time
    install_dirs: HashMap<PathBuf, PathBuf>,
    fail: Option<(String, BuildStepKind)>,
    require_installed_prefixes: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `step` with exit code 1 for the project whose directory has a
    /// path component named `component`.
    pub fn fail_at(mut self, component: &str, step: BuildStepKind) -> Self {
        self.fail = Some((component.to_string(), step));
        self
    }

    /// Fail a configure step with exit code 1 when any prefix path lacks an
    /// install marker.
    pub fn require_installed_prefixes(mut self) -> Self {
        self.require_installed_prefixes = true;
        self
    }

    /// Every call made so far, in order.
    pub fn events(&self) -> Vec<BackendEvent> {
        self.events.clone()
    }

    fn should_fail(&self, dir: &Path, step: BuildStepKind) -> bool {
        match self.fail {
            Some((ref component, fail_step)) => {
                fail_step == step && dir.components().any(|c| c.as_os_str() == component.as_str())
            }
            None => false,
        }
    }

    fn output(command: String, success: bool, output: &str) -> StepOutput {
        StepOutput {
            command,
            exit_code: Some(if success { 0 } else { 1 }),
            output: output.to_string(),
        }
    }
}

impl BuildBackend for RecordingBackend {
    fn configure(&mut self, request: &ConfigureRequest<'_>) -> Result<StepOutput> {
        self.events.push(BackendEvent::Configure {
            source_dir: request.source_dir.to_path_buf(),
            build_dir: request.build_dir.to_path_buf(),
            install_dir: request.install_dir.to_path_buf(),
            toolchain_file: request.toolchain_file.to_path_buf(),
            config: request.config,
            prefix_path: request.prefix_path.clone(),
            vars: request.vars.clone(),
        });
        self.install_dirs
            .insert(request.build_dir.to_path_buf(), request.install_dir.to_path_buf());

        let command = format!(
            "fake-cmake -S {} -B {}",
            request.source_dir.display(),
            request.build_dir.display()
        );

        if self.require_installed_prefixes {
            if let Some(missing) = request
                .prefix_path
                .iter()
                .find(|p| !p.join(INSTALL_MARKER).is_file())
            {
                let message = format!("Could not find package in {}\n", missing.display());
                return Ok(Self::output(command, false, &message));
            }
        }

        let success = !self.should_fail(request.source_dir, BuildStepKind::Configure);
        Ok(Self::output(command, success, "-- Configuring done\n"))
    }

    fn build(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput> {
        self.events.push(BackendEvent::Build(build_dir.to_path_buf()));
        let command = format!("fake-cmake --build {} --config {}", build_dir.display(), config);

        let success = !self.should_fail(build_dir, BuildStepKind::Build);
        Ok(Self::output(command, success, "[100%] Built target\n"))
    }

    fn install(&mut self, build_dir: &Path, config: BuildConfig) -> Result<StepOutput> {
        self.events.push(BackendEvent::Install(build_dir.to_path_buf()));
        let command = format!("fake-cmake --install {} --config {}", build_dir.display(), config);

        if self.should_fail(build_dir, BuildStepKind::Install) {
            return Ok(Self::output(command, false, "install failed\n"));
        }

        if let Some(install_dir) = self.install_dirs.get(build_dir) {
            std::fs::create_dir_all(install_dir)?;
            std::fs::write(install_dir.join(INSTALL_MARKER), config.to_string())?;
        }
        Ok(Self::output(command, true, "-- Installing\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recording_backend_writes_marker_on_install() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("zlib");
        let build = source.join("Build/Linux/Debug");
        let install = source.join("Install/Linux/Debug");
        let toolchain = tmp.path().join("customToolchain.toolchain");

        let mut backend = RecordingBackend::new();
        let request = ConfigureRequest {
            source_dir: &source,
            build_dir: &build,
            install_dir: &install,
            toolchain_file: &toolchain,
            generator: "Unix Makefiles",
            config: BuildConfig::Debug,
            prefix_path: Vec::new(),
            vars: BTreeMap::new(),
        };

        assert!(backend.configure(&request).unwrap().success());
        assert!(backend.build(&build, BuildConfig::Debug).unwrap().success());
        assert!(backend.install(&build, BuildConfig::Debug).unwrap().success());
        assert!(install.join(INSTALL_MARKER).is_file());
        assert_eq!(backend.events().len(), 3);
    }

    #[test]
    fn test_fail_at_matches_path_component() {
        let backend = RecordingBackend::new().fail_at("zlib", BuildStepKind::Build);
        assert!(backend.should_fail(Path::new("/repo/zlib/Build/Linux/Debug"), BuildStepKind::Build));
        assert!(!backend.should_fail(Path::new("/repo/zlib/Build/Linux/Debug"), BuildStepKind::Install));
        assert!(!backend.should_fail(Path::new("/repo/zlib-ng/Build/Linux/Debug"), BuildStepKind::Build));
    }
}
