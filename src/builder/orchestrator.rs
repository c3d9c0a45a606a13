//! Dependency-ordered configure/build/install of one build cell.

use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::builder::cmake::{is_cmake_project, BuildBackend, BuildStepKind, ConfigureRequest, StepOutput};
use crate::builder::toolchain::{ToolchainError, ToolchainHandle};
use crate::core::platform::BuildCell;
use crate::core::project::{GraphError, ProjectGraph, ProjectNode};
use crate::runner::ReportWriter;
use crate::util::fs::{ensure_dir, recreate_dir};
use crate::util::process::describe_exit_code;

/// A step of the build graph failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{node}: {step} failed with {}\n  command: {command}", describe_exit_code(.exit_code.to_owned()))]
    StepFailed {
        node: String,
        step: BuildStepKind,
        exit_code: Option<i32>,
        command: String,
    },

    #[error("{failed} of {total} build cell(s) failed")]
    CellsFailed { failed: usize, total: usize },
}

/// Builds the project graph for one cell at a time.
#[derive(Debug, Clone)]
pub struct BuildGraphOrchestrator<'a> {
    root: &'a Path,
    graph: &'a ProjectGraph,
    only: Option<&'a str>,
}

impl<'a> BuildGraphOrchestrator<'a> {
    pub fn new(root: &'a Path, graph: &'a ProjectGraph) -> Self {
        BuildGraphOrchestrator {
            root,
            graph,
            only: None,
        }
    }

    /// Restrict the build to one project and everything it depends on.
    pub fn only(mut self, project: Option<&'a str>) -> Self {
        self.only = project;
        self
    }

    /// The nodes to build, dependencies first.
    pub fn nodes(&self) -> Result<Vec<&'a ProjectNode>, GraphError> {
        match self.only {
            Some(name) => self.graph.upstream_closure(name),
            None => Ok(self.graph.build_order()),
        }
    }

    /// Configure, build and install every selected node for `cell`.
    ///
    /// Stops at the first failing step; nodes after it are not attempted.
    pub fn build_cell(
        &self,
        cell: BuildCell,
        toolchain: &ToolchainHandle,
        backend: &mut dyn BuildBackend,
        report: Option<&mut ReportWriter>,
    ) -> Result<()> {
        let nodes = self.nodes()?;
        self.build_nodes(cell, &nodes, toolchain, backend, report)
    }

    /// Build `nodes` in the order given.
    ///
    /// The order is trusted: callers outside of [`Self::build_cell`] are
    /// responsible for passing dependencies first.
    pub fn build_nodes(
        &self,
        cell: BuildCell,
        nodes: &[&ProjectNode],
        toolchain: &ToolchainHandle,
        backend: &mut dyn BuildBackend,
        mut report: Option<&mut ReportWriter>,
    ) -> Result<()> {
        if toolchain.target() != cell.platform {
            return Err(ToolchainError::ToolchainMismatch {
                toolchain: toolchain.target(),
                cell: cell.platform,
            }
            .into());
        }

        tracing::info!("Building {} project(s) with {}", nodes.len(), cell);

        for node in nodes {
            let mut log = String::new();
            let result = self.build_node(node, cell, toolchain, backend, &mut log);

            if let Some(report) = report.as_deref_mut() {
                report.append(&format!("Building: {} with {}", node.name, cell), &log)?;
            }
            result?;
        }

        Ok(())
    }

    fn build_node(
        &self,
        node: &ProjectNode,
        cell: BuildCell,
        toolchain: &ToolchainHandle,
        backend: &mut dyn BuildBackend,
        log: &mut String,
    ) -> Result<()> {
        let source_dir = node.source_dir(self.root);
        let build_dir = node.build_dir(self.root, cell);
        let install_dir = node.install_dir(self.root, cell);

        if !is_cmake_project(&source_dir) {
            tracing::warn!("{}: no CMakeLists.txt in {}", node.name, source_dir.display());
        }

        // Build trees are incremental, install trees never are
        ensure_dir(&build_dir)?;
        recreate_dir(&install_dir)?;

        let deps = self.graph.deps(&node.name);
        let prefix_path = deps
            .iter()
            .map(|dep| dep.install_dir(self.root, cell))
            .collect();

        let mut vars = node.defines.clone();
        for dep in &deps {
            if let Some(ref var) = dep.root_var {
                vars.insert(var.clone(), dep.install_dir(self.root, cell).display().to_string());
            }
        }

        let request = ConfigureRequest {
            source_dir: &source_dir,
            build_dir: &build_dir,
            install_dir: &install_dir,
            toolchain_file: toolchain.path(),
            generator: &toolchain.descriptor().generator,
            config: cell.config,
            prefix_path,
            vars,
        };

        tracing::info!("{}: Configuring", node.name);
        let output = backend.configure(&request)?;
        check_step(node, BuildStepKind::Configure, output, log)?;

        tracing::info!("{}: Building", node.name);
        let output = backend.build(&build_dir, cell.config)?;
        check_step(node, BuildStepKind::Build, output, log)?;

        tracing::info!("{}: Installing", node.name);
        let output = backend.install(&build_dir, cell.config)?;
        check_step(node, BuildStepKind::Install, output, log)?;

        Ok(())
    }
}

fn check_step(node: &ProjectNode, step: BuildStepKind, output: StepOutput, log: &mut String) -> Result<()> {
    log.push_str(&format!("$ {}\n", output.command));
    log.push_str(&output.output);
    if !output.output.is_empty() && !output.output.ends_with('\n') {
        log.push('\n');
    }
    tracing::debug!("{}", output.output);

    if !output.success() {
        tracing::error!("{}", output.output);
        return Err(BuildError::StepFailed {
            node: node.name.clone(),
            step,
            exit_code: output.exit_code,
            command: output.command,
        }
        .into());
    }
    Ok(())
}
