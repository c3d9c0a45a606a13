//! Permission repair for archived cross compilers.
//!
//! Toolchains unpacked from archives can lose their executable bits. Before
//! a cross build every file under the cross compiler root is made fully
//! accessible.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::platform::Platform;

/// Grant read, write and execute on every file under `cross_root`.
///
/// Only the Zynq target uses a cross compiler; for native targets this is a
/// no-op. Returns the number of files touched.
pub fn fixup_cross_compiler_permissions(target: Platform, cross_root: &Path) -> Result<usize> {
    match target {
        Platform::Windows | Platform::Linux => Ok(0),
        Platform::Zynq => {
            if !cross_root.exists() {
                tracing::warn!(
                    "cross compiler directory not found: {}",
                    cross_root.display()
                );
                return Ok(0);
            }

            let mut count = 0;
            for entry in WalkDir::new(cross_root) {
                let entry = entry.with_context(|| {
                    format!("failed to walk {}", cross_root.display())
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                make_fully_accessible(entry.path())?;
                count += 1;
            }

            tracing::debug!("fixed permissions on {} files", count);
            Ok(count)
        }
    }
}

#[cfg(unix)]
fn make_fully_accessible(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_fully_accessible(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("failed to read metadata of {}", path.display()))?
        .permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(path, perms)
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}
