//! Toolchain resolution for a (target, host) platform pair.
//!
//! A resolved [`ToolchainDescriptor`] names the compiler, the CMake
//! generator and the target flags. It is materialized as a CMake toolchain
//! file at a fixed path in the repository root, owned by a
//! [`ToolchainHandle`] for as long as builds use it.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::platform::Platform;

mod detect;
mod file;
mod permissions;

pub use detect::{ToolchainResolver, CROSS_COMPILER_NAME, ZYNQ_COMPILER_FLAGS};
pub use file::{
    release_toolchain_file, render_toolchain_file, with_toolchain, write_toolchain_file,
    ToolchainHandle, TOOLCHAIN_FILE_NAME,
};
pub use permissions::fixup_cross_compiler_permissions;

/// Error while resolving or using a toolchain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolchainError {
    #[error("C compiler `{name}` not found in PATH")]
    CompilerNotFound { name: String },

    #[error("cross-compilation from {host} to {target} is not supported")]
    UnsupportedCrossCompilation { target: Platform, host: Platform },

    #[error("{0} is not supported as a build host")]
    UnsupportedHost(Platform),

    #[error("toolchain for {toolchain} cannot build for {cell}")]
    ToolchainMismatch { toolchain: Platform, cell: Platform },
}

/// Everything CMake needs to know about the compiler for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainDescriptor {
    pub target: Platform,
    pub host: Platform,
    /// C compiler executable
    pub compiler: PathBuf,
    /// CMake generator name (`-G`)
    pub generator: String,
    /// Mandatory target flags, empty for native builds
    pub compiler_flags: String,
    /// Cross sysroot, only for cross builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysroot: Option<PathBuf>,
    /// Where the toolchain file is written
    pub toolchain_file: PathBuf,
}

impl ToolchainDescriptor {
    pub fn is_cross(&self) -> bool {
        self.target != self.host
    }
}
