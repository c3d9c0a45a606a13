//! Implementation of `shipyard build`.

use anyhow::Result;

use crate::builder::cmake::BuildBackend;
use crate::builder::orchestrator::{BuildError, BuildGraphOrchestrator};
use crate::builder::toolchain::{with_toolchain, ToolchainResolver};
use crate::core::platform::{BuildCell, BuildConfig, Platform};
use crate::core::Workspace;
use crate::runner::ReportWriter;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Target platforms, in the order they are built
    pub targets: Vec<Platform>,

    /// Configurations built for every target
    pub configs: Vec<BuildConfig>,

    /// Only build this project and its dependencies
    pub project: Option<String>,
}

impl BuildOptions {
    /// Every configuration for the host.
    pub fn for_host(host: Platform) -> Self {
        BuildOptions {
            targets: vec![host],
            configs: BuildConfig::ALL.to_vec(),
            project: None,
        }
    }
}

/// Cells of a finished build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub built: Vec<BuildCell>,
    pub failed: Vec<BuildCell>,
}

/// Build every requested cell of the matrix.
///
/// One toolchain file is written per target and removed once all of its
/// configurations are done. A failing build step only fails its own cell;
/// the remaining cells are still built and the run fails at the end.
/// Toolchain errors abort immediately.
pub fn build(
    ws: &Workspace,
    resolver: &ToolchainResolver,
    host: Platform,
    opts: &BuildOptions,
    backend: &mut dyn BuildBackend,
) -> Result<BuildSummary> {
    let orchestrator =
        BuildGraphOrchestrator::new(ws.root(), ws.graph()).only(opts.project.as_deref());
    // Reject an unknown project before touching anything on disk
    orchestrator.nodes()?;

    // Resolve every toolchain up front so a refused target leaves the previous
    // report untouched
    let descriptors = opts
        .targets
        .iter()
        .map(|&target| resolver.resolve(target, host))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = ReportWriter::create(&ws.path(&ws.config().build.report))?;
    let mut summary = BuildSummary::default();

    for descriptor in descriptors {
        let cells = BuildCell::matrix(&[descriptor.target], &opts.configs);

        with_toolchain(descriptor, resolver.cross_root(), |toolchain| {
            for cell in cells {
                match orchestrator.build_cell(cell, toolchain, &mut *backend, Some(&mut report)) {
                    Ok(()) => {
                        tracing::info!("Finished {}", cell);
                        summary.built.push(cell);
                    }
                    Err(e) if e.downcast_ref::<BuildError>().is_some() => {
                        tracing::error!("{} failed: {:#}", cell, e);
                        summary.failed.push(cell);
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        })?;
    }

    if !summary.failed.is_empty() {
        return Err(BuildError::CellsFailed {
            failed: summary.failed.len(),
            total: summary.built.len() + summary.failed.len(),
        }
        .into());
    }

    Ok(summary)
}
