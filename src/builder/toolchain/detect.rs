//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use crate::core::platform::Platform;
use crate::util::config::ToolchainSettings;
use crate::util::process::find_executable;

use super::{ToolchainDescriptor, ToolchainError, TOOLCHAIN_FILE_NAME};

/// File name of the Zynq cross compiler, without the host executable suffix.
pub const CROSS_COMPILER_NAME: &str = "arm-xilinx-linux-gnueabi-gcc";

/// Flags for the Cortex-A9 with NEON and hard float, matching the PetaLinux SDK
/// environment setup.
pub const ZYNQ_COMPILER_FLAGS: &str = "-mthumb -mfpu=neon -mfloat-abi=hard -mcpu=cortex-a9 \
     -fstack-protector-strong -O2 -D_FORTIFY_SOURCE=2 -Wformat -Wformat-security \
     -Werror=format-security";

/// Path lookup used for native compilers.
pub type CompilerLookup = fn(&str) -> Option<PathBuf>;

/// Resolves toolchains relative to a repository root.
#[derive(Debug, Clone)]
pub struct ToolchainResolver {
    root: PathBuf,
    compiler_name: String,
    cross_root: PathBuf,
    sysroot: PathBuf,
    lookup: CompilerLookup,
}

impl ToolchainResolver {
    /// Create a resolver; relative settings paths are taken from `root`.
    pub fn new(root: &Path, settings: &ToolchainSettings) -> Self {
        ToolchainResolver {
            root: root.to_path_buf(),
            compiler_name: settings.compiler.clone(),
            cross_root: root.join(&settings.cross_root),
            sysroot: root.join(&settings.sysroot),
            lookup: find_executable,
        }
    }

    /// Replace the PATH lookup used for native compilers.
    pub fn with_lookup(mut self, lookup: CompilerLookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Root of the cross compilers.
    pub fn cross_root(&self) -> &Path {
        &self.cross_root
    }

    /// The fixed toolchain file location.
    pub fn toolchain_file(&self) -> PathBuf {
        self.root.join(TOOLCHAIN_FILE_NAME)
    }

    /// Locate the C compiler for building `target` binaries on `host`.
    ///
    /// The cross compiler path is derived, not checked; it only has to exist
    /// once CMake runs.
    pub fn resolve_compiler(&self, target: Platform, host: Platform) -> Result<PathBuf, ToolchainError> {
        match (target, host) {
            (Platform::Zynq, Platform::Zynq) => Err(ToolchainError::UnsupportedHost(host)),
            (t, h) if t == h => (self.lookup)(&self.compiler_name).ok_or_else(|| {
                ToolchainError::CompilerNotFound {
                    name: self.compiler_name.clone(),
                }
            }),
            (Platform::Zynq, Platform::Windows | Platform::Linux) => {
                let file_name = format!("{}{}", CROSS_COMPILER_NAME, host.exe_suffix());
                Ok(self
                    .cross_root
                    .join(host.as_str())
                    .join("compiler/bin/arm-xilinx-linux-gnueabi")
                    .join(file_name))
            }
            _ => Err(ToolchainError::UnsupportedCrossCompilation { target, host }),
        }
    }

    /// CMake generator for the host.
    pub fn resolve_generator(host: Platform) -> Result<&'static str, ToolchainError> {
        match host {
            Platform::Windows => Ok("MinGW Makefiles"),
            Platform::Linux => Ok("Unix Makefiles"),
            Platform::Zynq => Err(ToolchainError::UnsupportedHost(host)),
        }
    }

    /// Mandatory compiler flags for the target.
    pub fn resolve_compiler_flags(target: Platform) -> &'static str {
        match target {
            Platform::Windows | Platform::Linux => "",
            Platform::Zynq => ZYNQ_COMPILER_FLAGS,
        }
    }

    /// Resolve the full descriptor for a (target, host) pair.
    pub fn resolve(&self, target: Platform, host: Platform) -> Result<ToolchainDescriptor, ToolchainError> {
        let compiler = self.resolve_compiler(target, host)?;
        let generator = Self::resolve_generator(host)?;

        let sysroot = match target {
            Platform::Zynq => Some(self.sysroot.clone()),
            Platform::Windows | Platform::Linux => None,
        };

        Ok(ToolchainDescriptor {
            target,
            host,
            compiler,
            generator: generator.to_string(),
            compiler_flags: Self::resolve_compiler_flags(target).to_string(),
            sysroot,
            toolchain_file: self.toolchain_file(),
        })
    }
}
