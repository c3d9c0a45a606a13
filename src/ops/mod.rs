//! High-level operations.
//!
//! This module contains the implementation of Shipyard commands.

pub mod shipyard_build;
pub mod toolchain;

pub use shipyard_build::{build, BuildOptions, BuildSummary};
pub use shipyard_test::{bench_args, run_benchmarks, run_tests, test_args, RunOptions};
pub use toolchain::{format_toolchain, show_toolchain};
