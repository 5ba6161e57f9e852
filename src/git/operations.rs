//! Git queries used by the release checks.
//!
//! Every query shells out to the system `git` through the run's
//! [`CommandRunner`], with the project root as working directory.

use crate::error::Result;
use crate::process::{self, CommandRunner, Invocation};
use std::path::Path;

/// Read-only view of the repository a package lives in
pub struct GitRepository<'a> {
    runner: &'a dyn CommandRunner,
    root: &'a Path,
}

impl<'a> GitRepository<'a> {
    /// Query the repository containing `root`
    pub fn new(runner: &'a dyn CommandRunner, root: &'a Path) -> Self {
        Self { runner, root }
    }

    /// Name of the checked out branch
    pub async fn current_branch(&self) -> Result<String> {
        let lines = self.run(&["symbolic-ref", "--short", "HEAD"]).await?;
        Ok(first_line(&lines))
    }

    /// `git status --porcelain` entries; empty when the tree is clean
    pub async fn uncommitted_changes(&self) -> Result<Vec<String>> {
        self.run(&["status", "--porcelain"]).await
    }

    /// Number of upstream commits not yet in HEAD, as printed by git
    pub async fn commits_behind_upstream(&self) -> Result<String> {
        let lines = self
            .run(&["rev-list", "--count", "--left-only", "@{u}...HEAD"])
            .await?;
        Ok(first_line(&lines))
    }

    /// Whether `tag` exists locally
    pub async fn tag_exists(&self, tag: &str) -> Result<bool> {
        let reference = format!("refs/tags/{}", tag);
        let invocation = git(self.root).args(["rev-parse", "--quiet", "--verify"]).arg(reference);
        process::succeeds(self.runner, &invocation).await
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<String>> {
        let invocation = git(self.root).args(args.iter().copied());
        process::output(self.runner, &invocation).await
    }
}

/// `git push --follow-tags`, pushing the commit and annotated tag `npm version` created
pub fn push_follow_tags(root: &Path) -> Invocation {
    git(root).args(["push", "--follow-tags"])
}

fn git(root: &Path) -> Invocation {
    Invocation::new("git").current_dir(root)
}

fn first_line(lines: &[String]) -> String {
    lines.first().map(|line| line.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_follow_tags_shape() {
        let invocation = push_follow_tags(Path::new("/repo"));
        assert_eq!(invocation.command_line(), "git push --follow-tags");
        assert_eq!(invocation.cwd.as_deref(), Some(Path::new("/repo")));
    }

    #[test]
    fn test_first_line_trims() {
        assert_eq!(first_line(&["  main \n".to_string()]), "main");
        assert_eq!(first_line(&[]), "");
    }
}
