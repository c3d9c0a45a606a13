//! `shipyard build` command

use std::path::Path;

use anyhow::Result;

use crate::cli::BuildArgs;
use shipyard::builder::CMakeBackend;
use shipyard::core::{Platform, Workspace};
use shipyard::ops::{build, BuildOptions};

pub fn execute(root: &Path, args: BuildArgs) -> Result<()> {
    let host = Platform::host()?;
    let ws = Workspace::load(root)?;

    let opts = BuildOptions {
        targets: args.matrix.targets(host),
        configs: args.matrix.configs(),
        project: args.project,
    };

    let resolver = ws.toolchain_resolver();
    let mut backend = CMakeBackend::new(ws.root())?;
    let summary = build(&ws, &resolver, host, &opts, &mut backend)?;

    for cell in &summary.built {
        println!("    Finished {}", cell);
    }
    Ok(())
}
