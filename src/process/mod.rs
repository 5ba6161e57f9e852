//! Subprocess execution for release steps.
//!
//! Every shell interaction goes through a [`CommandRunner`]. The system
//! runner spawns the command and exposes its merged stdout/stderr as a lazy
//! stream of lines (see [`ExecLines`]); tests substitute a scripted runner.

mod exec;

pub use exec::{exec, ExecLines};

use crate::error::{ReleaseError, Result, SubprocessError};
use futures_lite::StreamExt;
use std::fmt;
use std::path::{Path, PathBuf};

/// Boxed stream of output lines, ending with an error if the command failed
pub type LineStream = futures_lite::stream::Boxed<Result<String>>;

/// A command to run: program, arguments and explicit working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Working directory, inherited from this process when `None`
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation without arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the inherited working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program and arguments joined by spaces, as shown to the user
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Executes invocations and hands back their output lines
pub trait CommandRunner: Send + Sync {
    /// Start `invocation`; the returned stream ends when the command exits
    fn exec(&self, invocation: &Invocation) -> Result<LineStream>;
}

/// Runs real subprocesses via tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn exec(&self, invocation: &Invocation) -> Result<LineStream> {
        Ok(exec(invocation)?.boxed())
    }
}

/// Run `invocation` to completion and collect its non-empty output lines
pub async fn output(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<Vec<String>> {
    let mut stream = runner.exec(invocation)?;
    let mut lines = Vec::new();
    while let Some(line) = stream.next().await {
        lines.push(line?);
    }
    Ok(lines)
}

/// Run `invocation` and report whether it exited successfully.
///
/// A non-zero exit is `Ok(false)`; failing to start the command is an error.
pub async fn succeeds(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<bool> {
    match output(runner, invocation).await {
        Ok(_) => Ok(true),
        Err(ReleaseError::Subprocess(SubprocessError::Failed { .. })) => Ok(false),
        Err(e) => Err(e),
    }
}
