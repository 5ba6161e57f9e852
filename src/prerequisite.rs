//! Prerequisite checks run before anything is mutated.
//!
//! Validates the requested version against package.json, makes sure the
//! tools the run needs are installed, and refuses to reuse an existing tag.

use crate::error::{PrerequisiteError, ReleaseError, Result, SubprocessError};
use crate::git::GitRepository;
use crate::metadata::PackageDescriptor;
use crate::process::{self, CommandRunner, Invocation};
use crate::tasks::{Step, TaskContext, TaskList};
use crate::version;
use crate::ReleaseOptions;
use semver::Version;
use std::path::Path;

/// Oldest npm whose `npm version --force` and `--follow-tags` flow is supported
pub const MIN_NPM_VERSION: Version = Version::new(2, 15, 8);

/// Prefix npm puts in front of version tags
pub const TAG_PREFIX: &str = "v";

/// Build the prerequisite sub-steps for `input` against `pkg`
pub fn tasks(
    input: &str,
    pkg: &PackageDescriptor,
    options: &ReleaseOptions,
    root: &Path,
) -> TaskList {
    let plan = options.plan();
    let mut list = TaskList::new();

    if plan.publish {
        let private = pkg.private;
        list.add(
            Step::exec("Ping npm registry", Invocation::new("npm").arg("ping").current_dir(root))
                .skip_if(move || private.then(|| "Private package: not publishing to npm.".to_string())),
        );
    }

    let npm_root = root.to_path_buf();
    list.add(Step::task("Check npm version", move |ctx| async move {
        check_npm_version(&ctx, &npm_root).await
    }));

    if plan.run_cleanup && options.yarn {
        let yarn_root = root.to_path_buf();
        list.add(Step::task("Check yarn availability", move |ctx| async move {
            let lines = tool_output(ctx.runner(), "yarn", &yarn_root).await?;
            if let Some(found) = lines.first() {
                ctx.output(format!("yarn {}", found.trim()));
            }
            Ok(())
        }));
    }

    let current = pkg.version.clone();
    let requested = input.to_string();
    let tag = options.tag.clone();
    let publishes = plan.publish && !pkg.private;
    list.add(Step::task("Validate version", move |ctx| async move {
        let next = validate_version(&current, &requested, tag.as_deref(), publishes)?;
        ctx.output(format!("{} -> {}", current, next));
        Ok(())
    }));

    let current = pkg.version.clone();
    let requested = input.to_string();
    let tag_root = root.to_path_buf();
    list.add(Step::task("Check git tag existence", move |ctx| async move {
        let next = version::resolve_next(&current, &requested)?;
        check_tag_absent(ctx.runner(), &tag_root, &next).await
    }));

    list
}

/// Resolve the next version.
///
/// When the run publishes to npm (`publishes`), a prerelease result also
/// needs a dist-tag so it never lands on `latest`.
pub fn validate_version(
    current: &str,
    input: &str,
    tag: Option<&str>,
    publishes: bool,
) -> Result<Version> {
    let next = version::resolve_next(current, input)?;
    if publishes && !next.pre.is_empty() && tag.is_none() {
        return Err(PrerequisiteError::PrereleaseNeedsTag {
            version: next.to_string(),
        }
        .into());
    }
    Ok(next)
}

async fn check_npm_version(ctx: &TaskContext, root: &Path) -> Result<()> {
    let lines = tool_output(ctx.runner(), "npm", root).await?;
    let reported = lines.first().map(|line| line.trim().to_string()).unwrap_or_default();

    match Version::parse(&reported) {
        Ok(found) if found < MIN_NPM_VERSION => Err(PrerequisiteError::ToolTooOld {
            tool: "npm".to_string(),
            found: reported,
            required: MIN_NPM_VERSION.to_string(),
        }
        .into()),
        Ok(_) => {
            ctx.output(format!("npm {}", reported));
            Ok(())
        }
        Err(_) => {
            log::warn!("Could not parse npm version from '{}', assuming it is recent", reported);
            Ok(())
        }
    }
}

/// Run `<tool> --version`, mapping a failed start to [`PrerequisiteError::ToolMissing`]
async fn tool_output(runner: &dyn CommandRunner, tool: &str, root: &Path) -> Result<Vec<String>> {
    let invocation = Invocation::new(tool).arg("--version").current_dir(root);
    match process::output(runner, &invocation).await {
        Err(ReleaseError::Subprocess(SubprocessError::Spawn { .. })) => {
            Err(PrerequisiteError::ToolMissing {
                tool: tool.to_string(),
            }
            .into())
        }
        other => other,
    }
}

async fn check_tag_absent(runner: &dyn CommandRunner, root: &Path, next: &Version) -> Result<()> {
    let tag = format!("{}{}", TAG_PREFIX, next);
    if GitRepository::new(runner, root).tag_exists(&tag).await? {
        return Err(PrerequisiteError::TagExists { tag }.into());
    }
    Ok(())
}
