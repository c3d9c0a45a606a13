//! Platform and build configuration catalogs.
//!
//! Both catalogs are closed enums with a bijective mapping to the native
//! names used by the surrounding tooling: OS names for platforms and CMake
//! build types for configurations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a lookup outside of a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unsupported platform: `{0}`")]
    UnsupportedPlatform(String),

    #[error("unsupported build configuration: `{0}`")]
    UnsupportedConfig(String),
}

/// A platform that can act as build host or build target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows with a MinGW toolchain
    Windows,
    /// Linux (or any other Unix host)
    Linux,
    /// Embedded Linux on the Zynq ARM Cortex-A9 (cross-compile only)
    Zynq,
}

impl Platform {
    /// Every declared platform.
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Zynq];

    /// Native OS identifier for this platform.
    pub fn to_native_name(self) -> &'static str {
        match self {
            Platform::Windows => "nt",
            Platform::Linux => "posix",
            Platform::Zynq => "posix-zynq",
        }
    }

    /// Inverse of [`Platform::to_native_name`].
    pub fn from_native_name(name: &str) -> Result<Self, CatalogError> {
        match name {
            "nt" => Ok(Platform::Windows),
            "posix" => Ok(Platform::Linux),
            "posix-zynq" => Ok(Platform::Zynq),
            other => Err(CatalogError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Display name, also used as the per-platform directory segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Zynq => "Zynq",
        }
    }

    /// Suffix of executables produced for (or run on) this platform.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Linux | Platform::Zynq => "",
        }
    }

    /// The platform of the running process.
    pub fn host() -> Result<Self, CatalogError> {
        Self::from_os_family(std::env::consts::FAMILY)
    }

    /// Map a Rust OS family (`std::env::consts::FAMILY`) to a platform.
    pub fn from_os_family(family: &str) -> Result<Self, CatalogError> {
        match family {
            "windows" => Ok(Platform::Windows),
            "unix" => Ok(Platform::Linux),
            other => Err(CatalogError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfig {
    Debug,
    Release,
}

impl BuildConfig {
    /// Every declared configuration, in matrix traversal order.
    pub const ALL: [BuildConfig; 2] = [BuildConfig::Debug, BuildConfig::Release];

    /// CMake build type (`CMAKE_BUILD_TYPE`) for this configuration.
    pub fn to_native_name(self) -> &'static str {
        match self {
            BuildConfig::Debug => "Debug",
            BuildConfig::Release => "Release",
        }
    }

    /// Inverse of [`BuildConfig::to_native_name`].
    pub fn from_native_name(name: &str) -> Result<Self, CatalogError> {
        match name {
            "Debug" => Ok(BuildConfig::Debug),
            "Release" => Ok(BuildConfig::Release),
            other => Err(CatalogError::UnsupportedConfig(other.to_string())),
        }
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_native_name())
    }
}

/// One (platform, configuration) combination with its own directory trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildCell {
    pub platform: Platform,
    pub config: BuildConfig,
}

impl BuildCell {
    pub fn new(platform: Platform, config: BuildConfig) -> Self {
        BuildCell { platform, config }
    }

    /// Cells of the matrix, platform outer and configuration inner.
    pub fn matrix(platforms: &[Platform], configs: &[BuildConfig]) -> Vec<BuildCell> {
        platforms
            .iter()
            .flat_map(|&platform| configs.iter().map(move |&config| BuildCell::new(platform, config)))
            .collect()
    }
}

impl fmt::Display for BuildCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} build on {}", self.config, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_native_name_bijection() {
        for platform in Platform::ALL {
            let name = platform.to_native_name();
            assert_eq!(Platform::from_native_name(name).unwrap(), platform);
            assert_eq!(Platform::from_native_name(name).unwrap().to_native_name(), name);
        }

        let mut names: Vec<_> = Platform::ALL.iter().map(|p| p.to_native_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Platform::ALL.len());
    }

    #[test]
    fn test_config_native_name_bijection() {
        for config in BuildConfig::ALL {
            let name = config.to_native_name();
            assert_eq!(BuildConfig::from_native_name(name).unwrap(), config);
            assert_eq!(BuildConfig::from_native_name(name).unwrap().to_native_name(), name);
        }
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert_eq!(
            Platform::from_native_name("java"),
            Err(CatalogError::UnsupportedPlatform("java".to_string()))
        );
        assert_eq!(
            BuildConfig::from_native_name("RelWithDebInfo"),
            Err(CatalogError::UnsupportedConfig("RelWithDebInfo".to_string()))
        );
        // Native names are case sensitive
        assert!(BuildConfig::from_native_name("debug").is_err());
    }

    #[test]
    fn test_cli_values_are_lowercase_names() {
        use clap::ValueEnum;

        assert_eq!(Platform::from_str("zynq", false), Ok(Platform::Zynq));
        assert_eq!(BuildConfig::from_str("release", false), Ok(BuildConfig::Release));
        // Native names are not command line values
        assert!(Platform::from_str("posix", false).is_err());
        assert!(Platform::from_str("macos", true).is_err());
    }

    #[test]
    fn test_host_family() {
        assert_eq!(Platform::from_os_family("unix").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os_family("windows").unwrap(), Platform::Windows);
        assert!(Platform::from_os_family("wasm").is_err());
    }

    #[test]
    fn test_matrix_order() {
        let cells = BuildCell::matrix(&[Platform::Linux, Platform::Zynq], &BuildConfig::ALL);
        assert_eq!(
            cells,
            vec![
                BuildCell::new(Platform::Linux, BuildConfig::Debug),
                BuildCell::new(Platform::Linux, BuildConfig::Release),
                BuildCell::new(Platform::Zynq, BuildConfig::Debug),
                BuildCell::new(Platform::Zynq, BuildConfig::Release),
            ]
        );
        assert_eq!(cells[2].to_string(), "Debug build on Zynq");
    }
}
