//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::{ToolchainDescriptor, ToolchainHandle, TOOLCHAIN_FILE_NAME};
use crate::core::platform::Platform;

/// Write an executable shell script `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A native Linux descriptor whose toolchain file lives in `root`.
pub fn linux_descriptor(root: &Path) -> ToolchainDescriptor {
    ToolchainDescriptor {
        target: Platform::Linux,
        host: Platform::Linux,
        compiler: PathBuf::from("/usr/bin/gcc"),
        generator: "Unix Makefiles".to_string(),
        compiler_flags: String::new(),
        sysroot: None,
        toolchain_file: root.join(TOOLCHAIN_FILE_NAME),
    }
}

/// Acquire a native Linux toolchain in `root`.
pub fn linux_toolchain(root: &Path) -> ToolchainHandle {
    ToolchainHandle::acquire(linux_descriptor(root), &root.join("cross")).unwrap()
}

/// A `Shipyard.toml` with two independent projects and a test executable
/// per project, located in the project's build directory.
pub const TWO_PROJECT_CONFIG: &str = r#"
[[project]]
name = "Lib"
source = "Lib"

[[project]]
name = "App"
source = "App"
deps = ["Lib"]

[test]
verbose = false
executables = [
    { project = "Lib", name = "pass_test" },
    { project = "App", name = "fail_test" },
]

[bench]
epochs = 3
executables = [{ project = "App", name = "bench" }]
"#;

/// Write `Shipyard.toml` into `root`.
pub fn write_config(root: &Path, contents: &str) {
    std::fs::create_dir_all(root).unwrap();
    std::fs::write(root.join(crate::util::config::CONFIG_FILE_NAME), contents).unwrap();
}
