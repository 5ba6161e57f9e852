//! Release orchestration.
//!
//! Builds the ordered task list for a release from the options, runs it with
//! fail-fast semantics, and re-reads package.json once every step succeeded.
//! Nothing is rolled back on failure: a version bumped before a failed
//! publish stays bumped.

use crate::error::{FileSystemError, Result};
use crate::metadata::{self, PackageDescriptor};
use crate::process::{CommandRunner, Invocation};
use crate::tasks::{Executor, ProgressSender, Step, TaskList};
use crate::{git, prerequisite, publish, version, ReleaseOptions};
use std::path::Path;
use std::sync::Arc;

/// Directory removed by the cleanup step
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Build the task list for bumping `pkg` (rooted at `root`) with `input`.
///
/// The shape depends only on the options and the package; run-time checks
/// such as the private-package skip are attached as skip predicates.
pub fn build_tasks(
    input: &str,
    pkg: &PackageDescriptor,
    options: &ReleaseOptions,
    root: &Path,
) -> TaskList {
    let plan = options.plan();
    let mut tasks = TaskList::new();

    tasks
        .add(Step::sequence(
            "Prerequisite check",
            prerequisite::tasks(input, pkg, options, root),
        ))
        .add(Step::sequence("Git", git::tasks(options, root)));

    if plan.run_cleanup {
        let dependencies = root.join(DEPENDENCY_DIR);
        tasks
            .add(Step::task("Cleanup", move |_| async move {
                remove_dependencies(&dependencies).await
            }))
            .add(Step::exec(
                "Installing dependencies",
                install_command(root, options.yarn),
            ));
    }

    if plan.run_tests {
        tasks.add(Step::exec(
            "Running tests",
            Invocation::new("npm").arg("test").current_dir(root),
        ));
    }

    // --force: the git check above is the authoritative dirty-tree gate
    tasks.add(Step::exec(
        "Bumping version",
        Invocation::new("npm")
            .args(["version", input, "--force"])
            .current_dir(root),
    ));

    if plan.publish {
        tasks
            .add(publish::publish_step(pkg, options, root))
            .add(Step::exec("Pushing tags", git::push_follow_tags(root)));
    }

    tasks
}

/// Release the package containing the current directory
pub async fn run(
    input: Option<&str>,
    options: &ReleaseOptions,
    runner: Arc<dyn CommandRunner>,
    progress: ProgressSender,
) -> Result<PackageDescriptor> {
    let cwd = std::env::current_dir()?;
    run_in(&cwd, input, options, runner, progress).await
}

/// Release the package whose package.json is nearest to `start`.
///
/// Returns the re-read package.json, reflecting the bumped version.
pub async fn run_in(
    start: &Path,
    input: Option<&str>,
    options: &ReleaseOptions,
    runner: Arc<dyn CommandRunner>,
    progress: ProgressSender,
) -> Result<PackageDescriptor> {
    let input = version::normalize_input(input);
    if options.skip_cleanup {
        log::warn!("`skip_cleanup` is deprecated, use `cleanup: false` (--no-cleanup) instead");
    }

    let manifest = metadata::load_nearest(start).await?;
    log::info!(
        "Releasing {} {} ({})",
        manifest.package.name,
        manifest.package.version,
        input
    );

    let tasks = build_tasks(&input, &manifest.package, options, &manifest.root);
    Executor::new(runner, progress).run(tasks).await?;

    metadata::read_manifest(&manifest.path).await
}

fn install_command(root: &Path, yarn: bool) -> Invocation {
    let invocation = if yarn {
        Invocation::new("yarn")
    } else {
        Invocation::new("npm").arg("install")
    };
    invocation.current_dir(root)
}

async fn remove_dependencies(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FileSystemError::RemoveFailed {
            path: dir.to_path_buf(),
            source,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg() -> PackageDescriptor {
        PackageDescriptor {
            name: "unicorn".to_string(),
            version: "1.0.0".to_string(),
            private: false,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_install_command() {
        let root = Path::new("/pkg");
        assert_eq!(install_command(root, true).command_line(), "yarn");
        assert_eq!(install_command(root, false).command_line(), "npm install");
    }

    #[test]
    fn test_bump_uses_force_flag() {
        let tasks = build_tasks("minor", &pkg(), &ReleaseOptions::default(), Path::new("/pkg"));
        let bump = tasks
            .outline()
            .into_iter()
            .find(|entry| entry.title == "Bumping version")
            .expect("bump step present");
        assert_eq!(bump.command.as_deref(), Some("npm version minor --force"));
    }

    #[tokio::test]
    async fn test_remove_dependencies_tolerates_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let modules = dir.path().join(DEPENDENCY_DIR);
        remove_dependencies(&modules).await.expect("absent dir is fine");

        std::fs::create_dir_all(modules.join("left-pad")).expect("create modules");
        remove_dependencies(&modules).await.expect("removed");
        assert!(!modules.exists());
    }
}
