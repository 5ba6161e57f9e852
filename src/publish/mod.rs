//! npm publishing steps.
//!
//! Publishes either straight from the project root or, with `--dist`, from a
//! built output directory after copying the packaging files into it.

use crate::error::{FileSystemError, Result};
use crate::metadata::PackageDescriptor;
use crate::process::Invocation;
use crate::tasks::{Step, TaskList};
use crate::ReleaseOptions;
use std::path::{Path, PathBuf};

/// Title of the publish step
pub const PUBLISH_TITLE: &str = "Publishing package";

/// Skip reason reported for private packages
pub const PRIVATE_SKIP_REASON: &str = "Private package: not publishing to npm.";

/// Files copied next to the build output before a dist publish.
///
/// Any of them may be missing.
pub const PACKAGING_FILES: [&str; 6] = [
    "package.json",
    "LICENSE",
    ".npmignore",
    "README.md",
    "CHANGELOG.md",
    "changelog.md",
];

/// `npm publish [--tag <tag>]` run in `cwd`
pub fn publish_command(cwd: &Path, tag: Option<&str>) -> Invocation {
    let mut invocation = Invocation::new("npm").arg("publish").current_dir(cwd);
    if let Some(tag) = tag {
        invocation = invocation.args(["--tag", tag]);
    }
    invocation
}

/// Build the publish step; private packages skip it at run time
pub fn publish_step(pkg: &PackageDescriptor, options: &ReleaseOptions, root: &Path) -> Step {
    let tag = options.tag.as_deref();
    let step = if options.plan().dist {
        Step::sequence(
            PUBLISH_TITLE,
            dist_tasks(root, &root.join(&options.dist_dir), tag),
        )
    } else {
        Step::exec(PUBLISH_TITLE, publish_command(root, tag))
    };

    let private = pkg.private;
    step.skip_if(move || private.then(|| PRIVATE_SKIP_REASON.to_string()))
}

fn dist_tasks(root: &Path, dist: &Path, tag: Option<&str>) -> TaskList {
    let mut list = TaskList::new();

    let (from, to) = (root.to_path_buf(), dist.to_path_buf());
    list.add(Step::task("Copy files", move |ctx| async move {
        for name in copy_packaging_files(&from, &to).await {
            ctx.output(format!("Copied {}", name));
        }
        Ok(())
    }));

    let target = dist.to_path_buf();
    list.add(Step::task("Change to dist folder", move |ctx| async move {
        let dir = ensure_directory(&target).await?;
        ctx.output(format!("Publishing from {}", dir.display()));
        Ok(())
    }));

    list.add(Step::exec("npm publish", publish_command(dist, tag)));
    list
}

/// Copy each of [`PACKAGING_FILES`] from `root` into `dist`.
///
/// Failures are logged and skipped. Returns the names that were copied.
pub async fn copy_packaging_files(root: &Path, dist: &Path) -> Vec<&'static str> {
    let mut copied = Vec::new();
    for name in PACKAGING_FILES {
        match tokio::fs::copy(root.join(name), dist.join(name)).await {
            Ok(_) => copied.push(name),
            Err(e) => log::debug!("Not copying {} into {}: {}", name, dist.display(), e),
        }
    }
    copied
}

/// Resolve `dir` and make sure it is an existing directory
async fn ensure_directory(dir: &Path) -> Result<PathBuf> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(dir.to_path_buf()),
        _ => Err(FileSystemError::MissingDirectory {
            path: dir.to_path_buf(),
        }
        .into()),
    }
}
