//! Preview command execution.
//!
//! Builds the task list a release would run and prints it without spawning
//! anything.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::tasks::OutlineEntry;
use crate::{metadata, release, version};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PreviewReport {
    name: String,
    current: String,
    next: String,
    manifest: String,
    steps: Vec<OutlineEntry>,
}

/// Execute preview
pub(super) async fn execute_preview(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let options = args.to_options();
    let start = args.start_dir()?;
    let input = version::normalize_input(args.version.as_deref());

    let manifest = metadata::load_nearest(&start).await?;
    let next = version::resolve_next(&manifest.package.version, &input)?;
    let tasks = release::build_tasks(&input, &manifest.package, &options, &manifest.root);

    let report = PreviewReport {
        name: manifest.package.name.clone(),
        current: manifest.package.version.clone(),
        next: next.to_string(),
        manifest: manifest.path.display().to_string(),
        steps: tasks.outline(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(0);
    }

    let output = config.output();
    let _ = output.section("Release preview");
    let _ = output.info(&format!(
        "{}: {} → {}",
        report.name, report.current, report.next
    ));
    config.verbose_println(&format!("Manifest: {}", report.manifest));

    let _ = output.section("Steps");
    for entry in &report.steps {
        let pad = "  ".repeat(entry.depth);
        let mut line = format!("{}{}", pad, entry.title);
        if let Some(command) = &entry.command {
            line.push_str(&format!("  ({})", command));
        }
        if entry.conditional {
            line.push_str("  [may be skipped]");
        }
        config.indent(&line);
    }

    if manifest.package.private && options.publish {
        config.warning_println("Private package: the publish step will be skipped");
    }

    config.println("");
    config.println("Nothing was run. Drop --preview to release.");
    Ok(0)
}
