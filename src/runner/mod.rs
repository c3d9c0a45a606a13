//! Running compiled test and benchmark executables across the build matrix.
//!
//! Test failures are recorded and the matrix keeps going; the caller turns a
//! failed [`MatrixOutcome`] into a non-zero exit at the end. A failing
//! benchmark aborts immediately, since it points at a broken environment
//! rather than a regression.

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::core::platform::{BuildCell, Platform};
use crate::util::process::{describe_exit_code, ProcessBuilder};

pub mod report;
pub mod sanitize;

pub use report::{aggregate, ReportWriter};
pub use sanitize::{sanitize, sort_lines};

/// Error while running executables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("test `{name}` failed with {}\n  command: {command}", describe_exit_code(.exit_code.to_owned()))]
    TestFailed {
        name: String,
        exit_code: Option<i32>,
        command: String,
    },

    #[error("{failed} of {total} test runs failed")]
    TestsFailed { failed: usize, total: usize },

    #[error("benchmark `{name}` failed with {}\n  command: {command}", describe_exit_code(.exit_code.to_owned()))]
    BenchmarkFailed {
        name: String,
        exit_code: Option<i32>,
        command: String,
    },

    #[error("cannot run {target} executables on a {host} host")]
    ForeignTarget { target: Platform, host: Platform },
}

/// What an executable is, which decides how its output is captured and
/// how its failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    Test,
    Benchmark,
}

/// One executable's captured output for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub name: String,
    pub path: PathBuf,
    pub cell: BuildCell,
    pub kind: ExecutableKind,
    /// Command line as logged when the run started
    pub command: String,
    /// Captured output, unsanitized
    pub output: String,
    pub exit_code: Option<i32>,
}

impl RawResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// An executable to run in every cell of the matrix.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub name: String,
    /// Full argument list
    pub args: Vec<String>,
}

/// All results of a matrix run, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct MatrixOutcome {
    pub results: Vec<RawResult>,
}

impl MatrixOutcome {
    /// True when every run in the matrix exited with zero.
    pub fn success(&self) -> bool {
        self.results.iter().all(RawResult::success)
    }

    /// One `TestFailed` per failing run.
    pub fn failures(&self) -> Vec<ExecutionError> {
        self.results
            .iter()
            .filter(|r| !r.success())
            .map(|r| ExecutionError::TestFailed {
                name: format!("{} ({})", r.name, r.cell),
                exit_code: r.exit_code,
                command: r.command.clone(),
            })
            .collect()
    }

    /// The summary error for a failed matrix, if any run failed.
    pub fn into_error(self) -> Option<ExecutionError> {
        let failed = self.results.iter().filter(|r| !r.success()).count();
        (failed > 0).then(|| ExecutionError::TestsFailed {
            failed,
            total: self.results.len(),
        })
    }
}

/// Runs executables from the repository root and aggregates their output.
#[derive(Debug, Clone)]
pub struct ExecutionAggregator {
    root: PathBuf,
    host: Platform,
}

impl ExecutionAggregator {
    pub fn new(root: &Path, host: Platform) -> Self {
        ExecutionAggregator {
            root: root.to_path_buf(),
            host,
        }
    }

    /// Run one executable for one cell.
    ///
    /// Test output includes stderr and a non-zero exit is only recorded.
    /// Benchmarks capture stdout alone and fail on a non-zero exit.
    pub fn run_one(
        &self,
        path: &Path,
        invocation: &Invocation,
        cell: BuildCell,
        kind: ExecutableKind,
    ) -> Result<RawResult> {
        self.check_runnable(cell)?;

        let cmd = ProcessBuilder::new(path)
            .args(&invocation.args)
            .cwd(&self.root);
        let command = cmd.display_command();
        tracing::info!("{}", command);

        let (output, exit_code) = match kind {
            ExecutableKind::Test => match cmd.exec_merged() {
                Ok(merged) => (merged.text, merged.status.code()),
                // A test binary that cannot even start is a failed test, not a
                // reason to skip the remaining cells
                Err(e) => (format!("{:#}\n", e), None),
            },
            ExecutableKind::Benchmark => {
                let out = cmd.exec()?;
                if !out.status.success() {
                    tracing::error!("{}", String::from_utf8_lossy(&out.stderr));
                    return Err(ExecutionError::BenchmarkFailed {
                        name: invocation.name.clone(),
                        exit_code: out.status.code(),
                        command,
                    }
                    .into());
                }
                (String::from_utf8_lossy(&out.stdout).into_owned(), out.status.code())
            }
        };

        Ok(RawResult {
            name: invocation.name.clone(),
            path: path.to_path_buf(),
            cell,
            kind,
            command,
            output,
            exit_code,
        })
    }

    /// Run every invocation in every cell, platform outer and config inner as
    /// given by `cells`, appending each result to `report` as it arrives.
    ///
    /// `locate` maps an invocation and cell to the executable path.
    pub fn run_matrix<F>(
        &self,
        cells: &[BuildCell],
        invocations: &[Invocation],
        kind: ExecutableKind,
        locate: F,
        report: &mut ReportWriter,
    ) -> Result<MatrixOutcome>
    where
        F: Fn(&Invocation, BuildCell) -> Result<PathBuf>,
    {
        self.check_cells(cells)?;

        let mut outcome = MatrixOutcome::default();
        for &cell in cells {
            for invocation in invocations {
                let path = locate(invocation, cell)?;
                let result = self.run_one(&path, invocation, cell, kind)?;

                let entry = report.append_results(std::slice::from_ref(&result))?;
                print!("{}", entry);

                if !result.success() {
                    tracing::warn!(
                        "{} with {} failed with {}",
                        result.name,
                        cell,
                        describe_exit_code(result.exit_code)
                    );
                }
                outcome.results.push(result);
            }
        }

        Ok(outcome)
    }

    /// Refuse the whole matrix if any cell targets a platform other than the
    /// host. Callers check before touching reports.
    pub fn check_cells(&self, cells: &[BuildCell]) -> Result<(), ExecutionError> {
        cells.iter().try_for_each(|&cell| self.check_runnable(cell))
    }

    fn check_runnable(&self, cell: BuildCell) -> Result<(), ExecutionError> {
        if cell.platform != self.host {
            return Err(ExecutionError::ForeignTarget {
                target: cell.platform,
                host: self.host,
            });
        }
        Ok(())
    }
}
