//! Workspace - the repository being orchestrated.
//!
//! A Workspace ties the repository root to its configuration and the
//! validated project graph, and knows where every per-cell artifact lives.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::toolchain::ToolchainResolver;
use crate::core::platform::BuildCell;
use crate::core::project::{GraphError, ProjectGraph};
use crate::util::config::{Config, ExecutableSpec, CONFIG_FILE_NAME};

/// A repository root with its configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    graph: ProjectGraph,
}

impl Workspace {
    /// Load the workspace rooted at `root`.
    ///
    /// `Shipyard.toml` is optional; the project graph it declares (or the
    /// default one) must be acyclic and fully resolved.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("repository root is not a directory: {}", root.display());
        }
        // Absolute but not canonical: canonical Windows paths carry a `\\?\`
        // prefix that CMake and the test executables do not understand
        let root = std::path::absolute(root)
            .with_context(|| format!("failed to resolve repository root: {}", root.display()))?;

        let config = Config::load_or_default(&root.join(CONFIG_FILE_NAME))?;
        Self::from_config(root, config)
    }

    /// Build a workspace from an already parsed configuration.
    pub fn from_config(root: PathBuf, config: Config) -> Result<Self> {
        let graph = ProjectGraph::new(config.projects.clone())?;
        tracing::debug!("loaded {} project(s) from {}", graph.len(), root.display());

        Ok(Workspace {
            root,
            config,
            graph,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    /// A path from the configuration, relative to the root.
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Toolchain resolver for this repository.
    pub fn toolchain_resolver(&self) -> ToolchainResolver {
        ToolchainResolver::new(&self.root, &self.config.toolchain)
    }

    /// Path of a built executable for `cell`.
    pub fn executable_path(&self, exe: &ExecutableSpec, cell: BuildCell) -> Result<PathBuf, GraphError> {
        let node = self
            .graph
            .get(&exe.project)
            .ok_or_else(|| GraphError::UnknownNode(exe.project.clone()))?;

        let mut path = node.build_dir(&self.root, cell);
        if let Some(ref subdir) = exe.subdir {
            path.push(subdir);
        }
        path.push(format!("{}{}", exe.name, cell.platform.exe_suffix()));
        Ok(path)
    }
}
