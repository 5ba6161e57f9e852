//! Git state checks that gate a release.
//!
//! These run before any mutation: the release must start from the main line
//! (unless `--any-branch`), from a clean working tree, and in sync with the
//! upstream branch.

mod operations;

pub use operations::{push_follow_tags, GitRepository};

use crate::error::{GitStateError, Result};
use crate::tasks::{Step, TaskList};
use crate::ReleaseOptions;
use std::path::Path;

/// Branches releases may be cut from without `--any-branch`
pub const RELEASE_BRANCHES: [&str; 2] = ["main", "master"];

/// Build the git sub-steps
pub fn tasks(options: &ReleaseOptions, root: &Path) -> TaskList {
    let mut list = TaskList::new();

    let any_branch = options.any_branch;
    let branch_root = root.to_path_buf();
    list.add(
        Step::task("Check current branch", move |ctx| async move {
            let branch = GitRepository::new(ctx.runner(), &branch_root)
                .current_branch()
                .await?;
            ensure_release_branch(&branch)
        })
        .skip_if(move || any_branch.then(|| "Releasing from any branch.".to_string())),
    );

    let tree_root = root.to_path_buf();
    list.add(Step::task("Check local working tree", move |ctx| async move {
        let changes = GitRepository::new(ctx.runner(), &tree_root)
            .uncommitted_changes()
            .await?;
        if !changes.is_empty() {
            return Err(GitStateError::DirtyWorkingTree { changes }.into());
        }
        Ok(())
    }));

    let history_root = root.to_path_buf();
    list.add(Step::task("Check remote history", move |ctx| async move {
        let behind = GitRepository::new(ctx.runner(), &history_root)
            .commits_behind_upstream()
            .await?;
        if behind != "0" {
            return Err(GitStateError::RemoteHistoryDiffers { behind }.into());
        }
        Ok(())
    }));

    list
}

fn ensure_release_branch(branch: &str) -> Result<()> {
    if RELEASE_BRANCHES.contains(&branch) {
        Ok(())
    } else {
        Err(GitStateError::WrongBranch {
            branch: branch.to_string(),
        }
        .into())
    }
}
