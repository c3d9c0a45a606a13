//! Shipyard - a build matrix driver for multi-project CMake repositories
//!
//! This crate provides the core library functionality for Shipyard:
//! platform catalogs, toolchain resolution, dependency-ordered builds and
//! aggregated test and benchmark runs.

pub mod builder;
pub mod core;
pub mod ops;
pub mod runner;
pub mod util;

/// Test utilities and fakes for Shipyard unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording build backend and fixture
/// helpers.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildCell, BuildConfig, Platform, ProjectGraph, Workspace};
pub use util::config::Config;
