//! Shipyard CLI - build matrix driver for multi-project CMake repositories

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use shipyard::builder::{BuildError, ToolchainError};
use shipyard::core::{CatalogError, GraphError};
use shipyard::runner::ExecutionError;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("shipyard=debug")
    } else {
        EnvFilter::new("shipyard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&root, args),
        Commands::Test(args) => commands::test::execute(&root, args),
        Commands::Bench(args) => commands::bench::execute(&root, args),
        Commands::Toolchain(args) => commands::toolchain::execute(&root, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Map an error to the process exit code.
///
/// The first typed error found walking the context chain decides.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ExecutionError>() {
            return match e {
                ExecutionError::TestFailed { .. } | ExecutionError::TestsFailed { .. } => 1,
                ExecutionError::BenchmarkFailed { .. } | ExecutionError::ForeignTarget { .. } => 5,
            };
        }
        if cause.is::<CatalogError>() || cause.is::<GraphError>() || cause.is::<toml::de::Error>() {
            return 2;
        }
        if cause.is::<ToolchainError>() {
            return 3;
        }
        if cause.is::<BuildError>() {
            return 4;
        }
    }
    101
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard::core::Platform;

    #[test]
    fn test_exit_codes() {
        let tests = anyhow::Error::new(ExecutionError::TestsFailed { failed: 1, total: 4 });
        assert_eq!(exit_code(&tests), 1);

        let catalog = anyhow::Error::new(CatalogError::UnsupportedPlatform("beos".to_string()))
            .context("failed to read targets");
        assert_eq!(exit_code(&catalog), 2);

        let toolchain = anyhow::Error::new(ToolchainError::UnsupportedHost(Platform::Zynq));
        assert_eq!(exit_code(&toolchain), 3);

        let build = anyhow::Error::new(BuildError::CellsFailed { failed: 1, total: 2 });
        assert_eq!(exit_code(&build), 4);

        let foreign = anyhow::Error::new(ExecutionError::ForeignTarget {
            target: Platform::Zynq,
            host: Platform::Linux,
        });
        assert_eq!(exit_code(&foreign), 5);

        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 101);
    }
}
