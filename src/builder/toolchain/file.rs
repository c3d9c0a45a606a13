//! The on-disk CMake toolchain file and the handle that owns it.

use std::path::Path;

use anyhow::Result;

use crate::core::platform::Platform;
use crate::util::fs::{remove_file_if_exists, to_posix_string, write_string};

use super::{fixup_cross_compiler_permissions, ToolchainDescriptor};

/// File name of the toolchain file, written to the repository root.
pub const TOOLCHAIN_FILE_NAME: &str = "customToolchain.toolchain";

/// Render the toolchain file for a descriptor.
pub fn render_toolchain_file(descriptor: &ToolchainDescriptor) -> String {
    let mut content = String::new();

    // Mandatory flags ride along as extra list elements of the compiler
    let mut compiler = format!("\"{}\"", to_posix_string(&descriptor.compiler));
    if !descriptor.compiler_flags.is_empty() {
        compiler.push(' ');
        compiler.push_str(&descriptor.compiler_flags);
    }
    content.push_str(&format!("set(CMAKE_C_COMPILER {})\n", compiler));

    match descriptor.target {
        Platform::Zynq => {
            if let Some(ref sysroot) = descriptor.sysroot {
                content.push_str(&format!("set(CMAKE_SYSROOT \"{}\")\n", to_posix_string(sysroot)));
            }
            content.push_str("set(CMAKE_SYSTEM_PROCESSOR arm)\n");
            content.push_str("set(CMAKE_SYSTEM_NAME Generic)\n");
            // try_compile executables for the target cannot run on the build host
            content.push_str("set(CMAKE_TRY_COMPILE_TARGET_TYPE STATIC_LIBRARY)\n");
        }
        Platform::Windows | Platform::Linux => {
            tracing::debug!(
                "no platform specific toolchain settings for {}",
                descriptor.target.to_native_name()
            );
        }
    }

    content
}

/// Write the toolchain file, replacing whatever is at its path.
pub fn write_toolchain_file(descriptor: &ToolchainDescriptor) -> Result<()> {
    write_string(&descriptor.toolchain_file, &render_toolchain_file(descriptor))
}

/// Delete the toolchain file if it exists.
pub fn release_toolchain_file(path: &Path) -> Result<()> {
    if remove_file_if_exists(path)? {
        tracing::debug!("removed toolchain file {}", path.display());
    }
    Ok(())
}

/// Ownership of a written toolchain file.
///
/// Only one handle may be live per repository at a time: the file lives at a
/// fixed path. Every build call takes the handle by reference; the file is
/// deleted exactly once, by [`ToolchainHandle::release`] or, failing that,
/// when the handle is dropped.
#[derive(Debug)]
pub struct ToolchainHandle {
    descriptor: ToolchainDescriptor,
    released: bool,
}

impl ToolchainHandle {
    /// Write the toolchain file and prepare the cross compiler, if any.
    pub fn acquire(descriptor: ToolchainDescriptor, cross_root: &Path) -> Result<Self> {
        write_toolchain_file(&descriptor)?;
        let handle = ToolchainHandle {
            descriptor,
            released: false,
        };

        // From here on the handle owns the file, so a failure below still
        // removes it on drop
        fixup_cross_compiler_permissions(handle.descriptor.target, cross_root)?;

        let d = &handle.descriptor;
        tracing::info!("Host platform: {}", d.host);
        tracing::info!("Target platform: {}", d.target);
        tracing::info!("C compiler: {}", d.compiler.display());
        tracing::info!("CMake generator: {}", d.generator);
        tracing::info!("Target specific flags: {}", d.compiler_flags);
        if d.is_cross() {
            if let Some(ref sysroot) = d.sysroot {
                tracing::info!("Sysroot: {}", sysroot.display());
            }
        }
        tracing::info!("Toolchain file: {}", d.toolchain_file.display());

        Ok(handle)
    }

    pub fn descriptor(&self) -> &ToolchainDescriptor {
        &self.descriptor
    }

    pub fn target(&self) -> Platform {
        self.descriptor.target
    }

    /// Path of the toolchain file for `-DCMAKE_TOOLCHAIN_FILE`.
    pub fn path(&self) -> &Path {
        &self.descriptor.toolchain_file
    }

    /// Delete the toolchain file.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        release_toolchain_file(&self.descriptor.toolchain_file)
    }
}

impl Drop for ToolchainHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = release_toolchain_file(&self.descriptor.toolchain_file) {
            tracing::warn!("{:#}", e);
        }
    }
}

/// Run `f` with a freshly written toolchain file, deleting the file
/// afterwards whether or not `f` succeeded.
///
/// An error from `f` takes precedence over an error deleting the file.
pub fn with_toolchain<T>(
    descriptor: ToolchainDescriptor,
    cross_root: &Path,
    f: impl FnOnce(&ToolchainHandle) -> Result<T>,
) -> Result<T> {
    let handle = ToolchainHandle::acquire(descriptor, cross_root)?;
    let result = f(&handle);
    let released = handle.release();
    let value = result?;
    released?;
    Ok(value)
}
