//! Configuration file support for Shipyard.
//!
//! An optional `Shipyard.toml` at the repository root describes the
//! project graph, the cross toolchain layout and how to run the test and
//! benchmark executables. Every section is optional; the defaults describe
//! the CoDeLib repository layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::{ProjectGraph, ProjectNode};

/// Name of the configuration file at the repository root.
pub const CONFIG_FILE_NAME: &str = "Shipyard.toml";

/// Shipyard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Toolchain settings
    pub toolchain: ToolchainSettings,

    /// Build graph, in declaration order
    #[serde(rename = "project")]
    pub projects: Vec<ProjectNode>,

    /// Build report settings
    pub build: BuildSettings,

    /// Test executables
    pub test: TestSettings,

    /// Benchmark executables
    pub bench: BenchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            toolchain: ToolchainSettings::default(),
            projects: ProjectGraph::default_nodes(),
            build: BuildSettings::default(),
            test: TestSettings::default(),
            bench: BenchSettings::default(),
        }
    }
}

/// Compiler and cross toolchain locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Name of the host compiler looked up on PATH for native builds
    pub compiler: String,

    /// Root of the Zynq cross compilers (one subdirectory per host)
    pub cross_root: PathBuf,

    /// Zynq SDK sysroot
    pub sysroot: PathBuf,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        ToolchainSettings {
            compiler: "gcc".to_string(),
            cross_root: PathBuf::from("ZyboEmbeddedLinux/CrossCompilers/aach32"),
            sysroot: PathBuf::from("ZyboEmbeddedLinux/Petalinux/ZyboSdkSysroot"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Aggregated build output, relative to the repository root
    pub report: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            report: PathBuf::from("BuildReport.txt"),
        }
    }
}

/// An executable produced by one of the projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutableSpec {
    /// Project whose build directory contains the executable
    pub project: String,

    /// File name without the platform executable suffix
    pub name: String,

    /// Path of the executable inside the project build directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<PathBuf>,
}

impl ExecutableSpec {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        ExecutableSpec {
            project: project.into(),
            name: name.into(),
            subdir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TestSettings {
    pub executables: Vec<ExecutableSpec>,

    /// Directory of test fixture files, relative to the repository root
    pub fixtures: PathBuf,

    pub report: PathBuf,

    /// Pass `-v` to the test runner
    pub verbose: bool,

    /// Run the long-running test groups
    pub long_tests: bool,
}

impl Default for TestSettings {
    fn default() -> Self {
        TestSettings {
            executables: vec![ExecutableSpec::new("Test", "CoDeLib_Test")],
            fixtures: PathBuf::from("Benchmark/Files"),
            report: PathBuf::from("TestResults.txt"),
            verbose: true,
            long_tests: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BenchSettings {
    pub executables: Vec<ExecutableSpec>,

    pub fixtures: PathBuf,

    pub report: PathBuf,

    /// Number of epochs each benchmark runs
    pub epochs: u32,

    /// Flag that introduces the epoch count on the benchmark command line
    pub epochs_flag: String,
}

impl Default for BenchSettings {
    fn default() -> Self {
        BenchSettings {
            executables: vec![ExecutableSpec::new("Benchmark", "Benchmark")],
            fixtures: PathBuf::from("Benchmark/Files"),
            report: PathBuf::from("BenchmarkResults.txt"),
            epochs: 10,
            epochs_flag: "-e".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration, falling back to defaults if the file doesn't exist.
    ///
    /// Unlike a missing file, a malformed one is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no {} found, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_or_default(&tmp.path().join(CONFIG_FILE_NAME)).unwrap();

        assert_eq!(config.toolchain.compiler, "gcc");
        assert_eq!(config.projects.len(), 5);
        assert_eq!(config.test.report, PathBuf::from("TestResults.txt"));
        assert_eq!(config.bench.epochs, 10);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[toolchain]
compiler = "clang"

[test]
long-tests = true
"#,
        )
        .unwrap();

        assert_eq!(config.toolchain.compiler, "clang");
        assert_eq!(
            config.toolchain.sysroot,
            PathBuf::from("ZyboEmbeddedLinux/Petalinux/ZyboSdkSysroot")
        );
        assert!(config.test.long_tests);
        assert_eq!(config.test.executables[0].name, "CoDeLib_Test");
        assert_eq!(config.projects.len(), 5);
    }

    #[test]
    fn test_project_list_replaces_default_graph() {
        let config = Config::parse(
            r#"
[[project]]
name = "zlib"
source = "External/zlib"
root-var = "ZLIB_ROOT"
defines = { ZLIB_BUILD_EXAMPLES = "OFF" }

[[project]]
name = "app"
source = "App"
deps = ["zlib"]
"#,
        )
        .unwrap();

        assert_eq!(config.projects.len(), 2);
        assert_eq!(config.projects[0].root_var.as_deref(), Some("ZLIB_ROOT"));
        assert_eq!(config.projects[0].defines["ZLIB_BUILD_EXAMPLES"], "OFF");
        assert_eq!(config.projects[1].deps, vec!["zlib".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[toolchain\ncompiler = ").unwrap();

        assert!(Config::load_or_default(&path).is_err());
    }
}
