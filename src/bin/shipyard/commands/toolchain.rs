//! `shipyard toolchain` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{ToolchainArgs, ToolchainCommands, ToolchainShowArgs};
use shipyard::core::{Platform, Workspace};
use shipyard::ops::{format_toolchain, show_toolchain};

pub fn execute(root: &Path, args: ToolchainArgs) -> Result<()> {
    match args.command {
        ToolchainCommands::Show(show_args) => show(root, show_args),
    }
}

fn show(root: &Path, args: ToolchainShowArgs) -> Result<()> {
    let host = Platform::host()?;
    let ws = Workspace::load(root)?;
    let target = args.target.unwrap_or(host);

    let descriptor = show_toolchain(&ws.toolchain_resolver(), target, host)?;

    if args.json {
        let json = serde_json::to_string_pretty(&descriptor)
            .context("failed to serialize toolchain")?;
        println!("{}", json);
    } else {
        print!("{}", format_toolchain(&descriptor));
    }
    Ok(())
}
