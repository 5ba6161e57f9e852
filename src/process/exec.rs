//! Merged stdout/stderr line streaming for a single subprocess.

use super::Invocation;
use crate::error::{Result, SubprocessError};
use futures_lite::Stream;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

type ExitFuture = Pin<Box<dyn Future<Output = std::io::Result<ExitStatus>> + Send>>;

/// Output lines of a running subprocess.
///
/// Lines from stdout and stderr are yielded in arrival order; the relative
/// order of two lines from different pipes is not guaranteed. Empty lines are
/// dropped. Once both pipes close the exit status is awaited, and a non-zero
/// status is yielded as a final [`SubprocessError::Failed`] carrying every
/// line seen so far. Dropping the stream kills the subprocess.
pub struct ExecLines {
    command: String,
    lines: mpsc::UnboundedReceiver<String>,
    lines_closed: bool,
    exit: Option<ExitFuture>,
    captured: Vec<String>,
}

impl std::fmt::Debug for ExecLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecLines")
            .field("command", &self.command)
            .field("lines_closed", &self.lines_closed)
            .field("exited", &self.exit.is_none())
            .field("captured", &self.captured.len())
            .finish()
    }
}

/// Spawn `invocation` and stream its output.
///
/// Must be called from within a tokio runtime.
pub fn exec(invocation: &Invocation) -> Result<ExecLines> {
    let command = invocation.command_line();

    // Resolve through PATH (and PATHEXT, so `npm` finds `npm.cmd` on Windows)
    let program = which::which(&invocation.program)
        .unwrap_or_else(|_| PathBuf::from(&invocation.program));

    let mut cmd = Command::new(&program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &invocation.cwd {
        cmd.current_dir(dir);
    }

    match &invocation.cwd {
        Some(dir) => log::debug!("Running `{}` in {}", command, dir.display()),
        None => log::debug!("Running `{}`", command),
    }

    let mut child = cmd.spawn().map_err(|source| SubprocessError::Spawn {
        command: command.clone(),
        source,
    })?;

    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx);
    }

    // The child moves into the future so dropping the stream drops (and kills) it
    let exit: ExitFuture = Box::pin(async move { child.wait().await });

    Ok(ExecLines {
        command,
        lines: rx,
        lines_closed: false,
        exit: Some(exit),
        captured: Vec::new(),
    })
}

/// Read `reader` line by line into `tx` until EOF or the receiver goes away
fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(reader).split(b'\n');
        while let Ok(Some(segment)) = segments.next_segment().await {
            let line = String::from_utf8_lossy(&segment);
            let line = line.trim_end_matches('\r').to_string();
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

impl Stream for ExecLines {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        while !this.lines_closed {
            match this.lines.poll_recv(cx) {
                Poll::Ready(Some(line)) if line.is_empty() => continue,
                Poll::Ready(Some(line)) => {
                    this.captured.push(line.clone());
                    return Poll::Ready(Some(Ok(line)));
                }
                Poll::Ready(None) => this.lines_closed = true,
                Poll::Pending => return Poll::Pending,
            }
        }

        let Some(exit) = this.exit.as_mut() else {
            return Poll::Ready(None);
        };
        let status = ready!(exit.as_mut().poll(cx));
        this.exit = None;

        match status {
            Ok(status) if status.success() => Poll::Ready(None),
            Ok(status) => Poll::Ready(Some(Err(SubprocessError::Failed {
                command: this.command.clone(),
                code: status.code(),
                output: std::mem::take(&mut this.captured),
            }
            .into()))),
            Err(e) => Poll::Ready(Some(Err(e.into()))),
        }
    }
}
