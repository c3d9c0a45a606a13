//! CMake build orchestration.
//!
//! This module resolves toolchains, drives CMake through the
//! [`BuildBackend`] seam and walks the project graph one build cell at a time.

pub mod cmake;
pub mod orchestrator;
pub mod toolchain;

pub use cmake::{BuildBackend, BuildStepKind, CMakeBackend, ConfigureRequest, StepOutput};
pub use orchestrator::{BuildError, BuildGraphOrchestrator};
pub use toolchain::{
    with_toolchain, ToolchainDescriptor, ToolchainError, ToolchainHandle, ToolchainResolver,
};
