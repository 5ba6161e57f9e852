//! Colored terminal output for release runs
//!
//! Provides consistent, colored CLI output and renders task progress events

use crate::tasks::{ProgressEvent, StepState};
use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Write `pad`, a colored marker, then the message
    fn marked(
        &self,
        pad: &str,
        marker: &str,
        marker_spec: &ColorSpec,
        text_spec: Option<&mut ColorSpec>,
        message: &str,
    ) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = write!(&mut buffer, "{}", pad);
        let _ = buffer.set_color(marker_spec);
        let _ = write!(&mut buffer, "{}", marker);
        let _ = buffer.reset();
        if let Some(spec) = text_spec {
            let _ = buffer.set_color(spec);
        }
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print an info message (normal output)
    pub fn info(&self, message: &str) -> std::io::Result<()> {
        self.marked("", "ℹ", ColorSpec::new().set_fg(Some(Color::Cyan)), None, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.success_at("", message)
    }

    fn success_at(&self, pad: &str, message: &str) -> std::io::Result<()> {
        self.marked(
            pad,
            "✓",
            ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true),
            None,
            message,
        )
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.marked(
            "",
            "⚠",
            ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true),
            Some(ColorSpec::new().set_fg(Some(Color::Yellow))),
            message,
        )
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        // Try colored output to stderr
        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red))).is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.marked(
            "",
            "→",
            ColorSpec::new().set_fg(Some(Color::Blue)),
            Some(ColorSpec::new().set_fg(Some(Color::White))),
            message,
        )
    }

    /// Print a progress message with activity indicator
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.progress_at("", message)
    }

    fn progress_at(&self, pad: &str, message: &str) -> std::io::Result<()> {
        self.marked(pad, "⋯", ColorSpec::new().set_fg(Some(Color::Magenta)), None, message)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "    {}", message);
        self.bufwtr.print(&buffer)
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        self.bufwtr.print(&buffer)
    }

    /// Render one task progress event.
    ///
    /// Command output lines are only shown in verbose mode.
    pub fn render_event(&self, event: &ProgressEvent) -> std::io::Result<()> {
        let pad = "  ".repeat(event.depth);
        match &event.state {
            StepState::Running => self.progress_at(&pad, &event.title),
            StepState::Output(line) => {
                if !self.verbose || self.quiet {
                    return Ok(());
                }
                let mut buffer = self.bufwtr.buffer();
                let _ = buffer.set_color(ColorSpec::new().set_dimmed(true));
                let _ = writeln!(&mut buffer, "{}    {}", pad, line);
                let _ = buffer.reset();
                self.bufwtr.print(&buffer)
            }
            StepState::Skipped(reason) => self.marked(
                &pad,
                "↓",
                ColorSpec::new().set_fg(Some(Color::Yellow)),
                Some(ColorSpec::new().set_dimmed(true)),
                &format!("{} [skipped: {}]", event.title, reason),
            ),
            StepState::Succeeded => self.success_at(&pad, &event.title),
            StepState::Failed(message) => self.marked(
                &pad,
                "✗",
                ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
                Some(ColorSpec::new().set_fg(Some(Color::Red))),
                &format!("{}: {}", event.title, message),
            ),
        }
    }
}
