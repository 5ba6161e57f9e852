//! Comprehensive error types for np_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for np_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all np_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Prerequisite check errors
    #[error("Prerequisite check failed: {0}")]
    Prerequisite(#[from] PrerequisiteError),

    /// Git repository state errors
    #[error("Git error: {0}")]
    Git(#[from] GitStateError),

    /// Shelled command errors
    #[error("{0}")]
    Subprocess(#[from] SubprocessError),

    /// Cleanup and copy errors
    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// package.json discovery and parsing errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version and tooling preconditions
#[derive(Error, Debug)]
pub enum PrerequisiteError {
    /// Bump input is neither a keyword nor a semver version
    #[error(
        "Version should be either {keywords}, or a valid semver version. Got '{input}'."
    )]
    InvalidVersionInput {
        /// Rejected input
        input: String,
        /// Comma separated list of accepted keywords
        keywords: String,
    },

    /// Explicit version does not move forward
    #[error("New version `{new}` should be higher than current version `{current}`")]
    VersionNotGreater {
        /// Version currently in package.json
        current: String,
        /// Version that was requested
        new: String,
    },

    /// Prerelease versions must not land on `latest`
    #[error(
        "You must specify a dist-tag using --tag when publishing a pre-release version ({version}). This prevents accidentally tagging unstable versions as \"latest\"."
    )]
    PrereleaseNeedsTag {
        /// Computed prerelease version
        version: String,
    },

    /// Required executable missing from PATH
    #[error("`{tool}` was not found on PATH")]
    ToolMissing {
        /// Executable name
        tool: String,
    },

    /// Installed tool is older than required
    #[error("`{tool}` {found} is too old, {required} or newer is required")]
    ToolTooOld {
        /// Executable name
        tool: String,
        /// Version reported by the tool
        found: String,
        /// Minimum supported version
        required: String,
    },

    /// Release tag already exists locally
    #[error("Git tag `{tag}` already exists.")]
    TagExists {
        /// Tag name
        tag: String,
    },
}

/// Repository state errors raised before any mutation happens
#[derive(Error, Debug)]
pub enum GitStateError {
    /// Releases are only cut from the main line unless overridden
    #[error("Not on `main` or `master` branch (currently on `{branch}`). Use --any-branch to publish anyway.")]
    WrongBranch {
        /// Branch currently checked out
        branch: String,
    },

    /// Uncommitted changes present
    #[error("Unclean working tree. Commit or stash changes first.")]
    DirtyWorkingTree {
        /// `git status --porcelain` lines
        changes: Vec<String>,
    },

    /// Upstream has commits that are not in HEAD
    #[error("Remote history differs ({behind} commit(s) behind upstream). Please pull changes.")]
    RemoteHistoryDiffers {
        /// Number of upstream commits missing locally
        behind: String,
    },
}

/// Failures of shelled commands
#[derive(Error, Debug)]
pub enum SubprocessError {
    /// Command could not be started
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Command exited unsuccessfully
    #[error("Command `{command}` failed with {}", exit_description(.code))]
    Failed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Non-empty output lines captured before exit
        output: Vec<String>,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

/// Cleanup and dist directory errors
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// Removing a directory tree failed
    #[error("Failed to remove {path}: {source}")]
    RemoveFailed {
        /// Directory being removed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Dist directory is missing or not a directory
    #[error("Output directory {path} does not exist. Build the package before publishing with --dist.")]
    MissingDirectory {
        /// Expected directory
        path: PathBuf,
    },
}

/// package.json errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No package.json in the start directory or any ancestor
    #[error("No package.json found in {start} or any parent directory")]
    NotFound {
        /// Directory the search started from
        start: PathBuf,
    },

    /// package.json exists but is not usable
    #[error("Invalid package.json at {path}: {reason}")]
    Invalid {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Git(GitStateError::DirtyWorkingTree { changes }) => {
                let mut suggestions = vec![
                    "Commit pending changes: git add . && git commit -m 'message'".to_string(),
                    "Stash changes temporarily: git stash".to_string(),
                ];
                if let Some(first) = changes.first() {
                    suggestions.push(format!("First uncommitted change: {}", first.trim()));
                }
                suggestions
            }
            ReleaseError::Git(GitStateError::WrongBranch { .. }) => vec![
                "Switch to the release branch: git checkout main".to_string(),
                "Or release from this branch with --any-branch".to_string(),
            ],
            ReleaseError::Git(GitStateError::RemoteHistoryDiffers { .. }) => vec![
                "Pull upstream changes: git pull --rebase".to_string(),
            ],
            ReleaseError::Prerequisite(PrerequisiteError::PrereleaseNeedsTag { .. }) => vec![
                "Publish under a dist-tag: --tag next".to_string(),
            ],
            ReleaseError::Prerequisite(PrerequisiteError::ToolMissing { tool }) => vec![
                format!("Install `{}` and make sure it is on PATH", tool),
                "Use --no-yarn to install dependencies with npm instead".to_string(),
            ],
            ReleaseError::Prerequisite(PrerequisiteError::TagExists { tag }) => vec![
                format!("Delete the stale tag: git tag -d {}", tag),
                "Or choose a different version".to_string(),
            ],
            ReleaseError::Subprocess(SubprocessError::Failed { output, .. }) => output
                .iter()
                .rev()
                .take(5)
                .rev()
                .map(|line| format!("output: {}", line))
                .collect(),
            ReleaseError::FileSystem(FileSystemError::MissingDirectory { .. }) => vec![
                "Run your build so the output directory exists".to_string(),
                "Point --dist-dir at the built package".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::NotFound { .. }) => vec![
                "Run from inside an npm package, or pass --cwd <dir>".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the run stopped before anything was mutated
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            ReleaseError::Prerequisite(_)
                | ReleaseError::Git(_)
                | ReleaseError::Manifest(_)
                | ReleaseError::Cli(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_subprocess_message_includes_code() {
        let err = ReleaseError::from(SubprocessError::Failed {
            command: "npm test".to_string(),
            code: Some(1),
            output: vec!["1 failing".to_string()],
        });
        assert_eq!(err.to_string(), "Command `npm test` failed with exit code 1");
    }

    #[test]
    fn test_signal_exit_message() {
        let err = SubprocessError::Failed {
            command: "yarn".to_string(),
            code: None,
            output: Vec::new(),
        };
        assert!(err.to_string().ends_with("termination by signal"));
    }

    #[test]
    fn test_subprocess_suggestions_show_output_tail() {
        let output = (1..=8).map(|i| format!("line {}", i)).collect();
        let err = ReleaseError::from(SubprocessError::Failed {
            command: "npm test".to_string(),
            code: Some(2),
            output,
        });
        let suggestions = err.recovery_suggestions();
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0], "output: line 4");
        assert_eq!(suggestions[4], "output: line 8");
    }

    #[test]
    fn test_precondition_classification() {
        let git = ReleaseError::from(GitStateError::DirtyWorkingTree { changes: vec![] });
        assert!(git.is_precondition_failure());

        let fs = ReleaseError::from(FileSystemError::MissingDirectory {
            path: PathBuf::from("dist"),
        });
        assert!(!fs.is_precondition_failure());
    }
}
