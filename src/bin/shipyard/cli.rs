//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use shipyard::core::{BuildConfig, Platform};

/// Shipyard - build, test and benchmark a multi-project CMake repository
/// across platforms and configurations
#[derive(Parser)]
#[command(name = "shipyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository root (defaults to the current directory)
    #[arg(long, global = true, env = "SHIPYARD_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and install every project for each build cell
    Build(BuildArgs),

    /// Run the test executables for each build cell
    Test(TestArgs),

    /// Run the benchmark executables for each build cell
    Bench(BenchArgs),

    /// Toolchain inspection
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Selection of build cells shared by every matrix command.
#[derive(Args)]
pub struct MatrixArgs {
    /// Target platform (repeatable; defaults to the host)
    #[arg(long = "target", value_enum)]
    pub targets: Vec<Platform>,

    /// Build configuration (repeatable; defaults to Debug and Release)
    #[arg(long = "config", value_enum)]
    pub configs: Vec<BuildConfig>,
}

impl MatrixArgs {
    pub fn targets(&self, host: Platform) -> Vec<Platform> {
        if self.targets.is_empty() {
            vec![host]
        } else {
            self.targets.clone()
        }
    }

    pub fn configs(&self) -> Vec<BuildConfig> {
        if self.configs.is_empty() {
            BuildConfig::ALL.to_vec()
        } else {
            self.configs.clone()
        }
    }
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Only build this project and its dependencies
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Also run the long-running tests
    #[arg(long)]
    pub long: bool,
}

#[derive(Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Number of epochs per benchmark
    #[arg(short, long)]
    pub epochs: Option<u32>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(subcommand)]
    pub command: ToolchainCommands,
}

#[derive(Subcommand)]
pub enum ToolchainCommands {
    /// Show the toolchain that would be used for a target
    Show(ToolchainShowArgs),
}

#[derive(Args)]
pub struct ToolchainShowArgs {
    /// Target platform (defaults to the host)
    #[arg(long, value_enum)]
    pub target: Option<Platform>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
