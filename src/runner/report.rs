//! Aggregated plain-text reports.
//!
//! A report is a sequence of entries, each a header line, a separator line,
//! the sanitized body and a blank line. The file is truncated once when the
//! writer is created and only appended to afterwards.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::sanitize::{sanitize, sort_lines};
use super::{ExecutableKind, RawResult};
use crate::util::fs::ensure_dir;

/// Line between an entry's header and its body.
pub const SEPARATOR: &str = "-----------------------------------------";

/// Render one entry. The body is sanitized; a missing final newline is added.
pub fn render_entry(header: &str, body: &str) -> String {
    let mut body = sanitize(body);
    if !body.is_empty() && !body.ends_with('\n') {
        body.push('\n');
    }
    format!("{}\n{}\n{}\n", header, SEPARATOR, body)
}

/// Header of a result entry.
fn result_header(result: &RawResult) -> String {
    format!("Running: {} with {}", result.name, result.cell)
}

/// Render a result; benchmark output is sorted after sanitizing.
fn render_result(result: &RawResult) -> String {
    match result.kind {
        ExecutableKind::Test => render_entry(&result_header(result), &result.output),
        ExecutableKind::Benchmark => {
            render_entry(&result_header(result), &sort_lines(&sanitize(&result.output)))
        }
    }
}

/// Concatenate results in the order given.
pub fn aggregate(results: &[RawResult]) -> String {
    results.iter().map(render_result).collect()
}

/// Appends entries to a report file.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    file: File,
}

impl ReportWriter {
    /// Create (or truncate) the report file.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create report: {}", path.display()))?;

        Ok(ReportWriter {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry with an arbitrary header.
    pub fn append(&mut self, header: &str, body: &str) -> Result<()> {
        self.write(&render_entry(header, body))
    }

    /// Append the aggregated entries of `results` and return the text written.
    pub fn append_results(&mut self, results: &[RawResult]) -> Result<String> {
        let text = aggregate(results);
        self.write(&text)?;
        Ok(text)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|()| self.file.flush())
            .with_context(|| format!("failed to write report: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{BuildCell, BuildConfig, Platform};
    use tempfile::TempDir;

    fn result(name: &str, config: BuildConfig, output: &str, kind: ExecutableKind) -> RawResult {
        RawResult {
            name: name.to_string(),
            path: PathBuf::from(name),
            cell: BuildCell::new(Platform::Linux, config),
            kind,
            command: name.to_string(),
            output: output.to_string(),
            exit_code: Some(0),
        }
    }

    #[test]
    fn test_render_entry_layout() {
        let entry = render_entry("Running: CoDeLib_Test with Debug build on Linux", "\x1b[32mOK\x1b[0m");
        assert_eq!(
            entry,
            "Running: CoDeLib_Test with Debug build on Linux\n\
             -----------------------------------------\n\
             OK\n\
             \n"
        );
    }

    #[test]
    fn test_benchmark_output_is_sorted() {
        let r = result("Benchmark", BuildConfig::Release, "b 2\na 1\n", ExecutableKind::Benchmark);
        assert!(render_result(&r).ends_with("a 1\nb 2\n\n"));

        let t = result("CoDeLib_Test", BuildConfig::Release, "b 2\na 1\n", ExecutableKind::Test);
        assert!(render_result(&t).ends_with("b 2\na 1\n\n"));
    }

    #[test]
    fn test_aggregate_keeps_order() {
        let results = vec![
            result("T", BuildConfig::Debug, "one\n", ExecutableKind::Test),
            result("T", BuildConfig::Release, "two\n", ExecutableKind::Test),
        ];
        let report = aggregate(&results);
        let debug = report.find("with Debug build").unwrap();
        let release = report.find("with Release build").unwrap();
        assert!(debug < release);
    }

    #[test]
    fn test_writer_truncates_once_then_appends() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("TestResults.txt");
        std::fs::write(&path, "previous run\n").unwrap();

        let mut writer = ReportWriter::create(&path).unwrap();
        writer.append("first", "a").unwrap();
        writer.append("second", "b").unwrap();
        drop(writer);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("previous run"));
        assert_eq!(content, format!("first\n{0}\na\n\nsecond\n{0}\nb\n\n", SEPARATOR));
    }

    #[test]
    fn test_append_results_writes_what_it_returns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("BenchmarkResults.txt");

        let mut writer = ReportWriter::create(&path).unwrap();
        let first = writer
            .append_results(&[result("Benchmark", BuildConfig::Debug, "z\ny\n", ExecutableKind::Benchmark)])
            .unwrap();
        let second = writer
            .append_results(&[result("Benchmark", BuildConfig::Release, "x\n", ExecutableKind::Benchmark)])
            .unwrap();
        drop(writer);

        assert!(first.ends_with("y\nz\n\n"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}{}", first, second));
    }
}
