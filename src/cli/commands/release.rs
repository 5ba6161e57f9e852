//! Release command execution.
//!
//! Runs the full task list against the system `npm`/`git`/`yarn` and renders
//! progress while it runs.

use crate::cli::{Args, OutputManager, RuntimeConfig};
use crate::error::Result;
use crate::process::SystemRunner;
use crate::release;
use crate::tasks::{ProgressEvent, ProgressSender};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Execute release
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let options = args.to_options();
    let start = args.start_dir()?;

    config.println("🚀 Starting npm release");
    config.verbose_println(&format!("Looking for package.json from {}", start.display()));

    let (progress, events) = ProgressSender::channel();
    let renderer = spawn_renderer(events, config.output().clone());

    let result = release::run_in(
        &start,
        args.version.as_deref(),
        &options,
        Arc::new(SystemRunner),
        progress,
    )
    .await;

    // The sender is gone once run_in returns, so the renderer drains and exits
    if let Err(e) = renderer.await {
        log::debug!("Progress renderer stopped abnormally: {}", e);
    }

    let pkg = result?;

    config.success_println("🎉 Release complete!");
    config.success_println(&format!("   Package: {}", pkg.name));
    config.success_println(&format!("   Version: v{}", pkg.version));
    if !options.publish || pkg.private {
        config.indent("Not published to npm");
    }

    Ok(0)
}

fn spawn_renderer(
    mut events: UnboundedReceiver<ProgressEvent>,
    output: OutputManager,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let _ = output.render_event(&event);
        }
    })
}
