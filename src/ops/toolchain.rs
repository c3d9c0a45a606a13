//! Implementation of `shipyard toolchain show`.

use std::fmt::Write;

use anyhow::Result;

use crate::builder::toolchain::{render_toolchain_file, ToolchainDescriptor, ToolchainResolver};
use crate::core::platform::Platform;

/// Resolve the toolchain for `target` without writing anything.
pub fn show_toolchain(
    resolver: &ToolchainResolver,
    target: Platform,
    host: Platform,
) -> Result<ToolchainDescriptor> {
    Ok(resolver.resolve(target, host)?)
}

/// Human-readable description, followed by the toolchain file that would be
/// written.
pub fn format_toolchain(descriptor: &ToolchainDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Host platform:     {}", descriptor.host);
    let _ = writeln!(out, "Target platform:   {}", descriptor.target);
    let _ = writeln!(out, "C compiler:        {}", descriptor.compiler.display());
    let _ = writeln!(out, "CMake generator:   {}", descriptor.generator);
    if !descriptor.compiler_flags.is_empty() {
        let _ = writeln!(out, "Compiler flags:    {}", descriptor.compiler_flags);
    }
    if let Some(ref sysroot) = descriptor.sysroot {
        let _ = writeln!(out, "Sysroot:           {}", sysroot.display());
    }
    let _ = writeln!(out, "Toolchain file:    {}", descriptor.toolchain_file.display());
    let _ = writeln!(out);
    out.push_str(&render_toolchain_file(descriptor));
    out
}
