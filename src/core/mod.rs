//! Core data structures for Shipyard.
//!
//! This module contains the foundational types used throughout Shipyard:
//! - The platform and configuration catalogs, and the build cells they span
//! - The project graph
//! - Workspace management

pub mod platform;
pub mod project;
pub mod workspace;

pub use platform::{BuildCell, BuildConfig, CatalogError, Platform};
pub use project::{GraphError, ProjectGraph, ProjectNode};
pub use workspace::Workspace;
