//! Command implementations

pub mod bench;
pub mod build;
pub mod completions;
pub mod toolchain;
