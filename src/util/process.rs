//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
///
/// Arguments are kept as a vector and handed to the OS unquoted, so paths
/// with spaces or backslashes need no escaping.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

/// Output of a process whose stdout and stderr share one stream.
#[derive(Debug, Clone)]
pub struct MergedOutput {
    pub status: ExitStatus,
    /// Interleaved stdout and stderr, lossily decoded as UTF-8
    pub text: String,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion, capturing stdout and
    /// stderr separately.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))
    }

    /// Execute the command with stderr redirected into stdout.
    ///
    /// Both streams are pointed at the same temporary file, so the
    /// interleaving the child produced is preserved.
    pub fn exec_merged(&self) -> Result<MergedOutput> {
        let mut capture = tempfile::tempfile().context("failed to create capture file")?;
        let stdout = capture
            .try_clone()
            .context("failed to duplicate capture file")?;
        let stderr = capture
            .try_clone()
            .context("failed to duplicate capture file")?;

        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::from(stdout));
        cmd.stderr(Stdio::from(stderr));

        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))?;

        let mut bytes = Vec::new();
        capture.seek(SeekFrom::Start(0))?;
        capture
            .read_to_end(&mut bytes)
            .context("failed to read captured output")?;

        Ok(MergedOutput {
            status,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// Display the command for logs and error messages.
    ///
    /// Arguments containing whitespace are quoted so the line can be pasted
    /// back into a shell.
    pub fn display_command(&self) -> String {
        let mut parts = vec![quote_for_display(&self.program.display().to_string())];
        parts.extend(self.args.iter().map(|a| quote_for_display(a)));
        parts.join(" ")
    }
}

fn quote_for_display(s: &str) -> String {
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Describe an exit code for messages; `None` means killed by a signal.
pub fn describe_exit_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}
