//! `shipyard bench` command

use std::path::Path;

use anyhow::Result;

use crate::cli::BenchArgs;
use shipyard::core::{Platform, Workspace};
use shipyard::ops::{run_benchmarks, RunOptions};

pub fn execute(root: &Path, args: BenchArgs) -> Result<()> {
    let host = Platform::host()?;
    let ws = Workspace::load(root)?;

    let opts = RunOptions {
        targets: args.matrix.targets(host),
        configs: args.matrix.configs(),
        long_tests: None,
        epochs: args.epochs,
    };

    run_benchmarks(&ws, host, &opts)?;
    Ok(())
}
