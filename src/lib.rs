//! # np_release
//!
//! A better `npm publish`.
//!
//! Runs the checks and shell operations of an npm release as one ordered,
//! fail-fast task list with live progress reporting.
//!
//! ## Features
//!
//! - **Prerequisite checks**: version input, npm/yarn availability, tag collisions
//! - **Git checks**: release branch, clean working tree, in sync with upstream
//! - **Fresh install**: removes `node_modules` and reinstalls before testing
//! - **Dist publishing**: publish a built output directory with its packaging files
//! - **Tag push**: pushes the version commit and tag with `--follow-tags`
//!
//! ## Usage
//!
//! ```bash
//! np_release                 # Bump patch version and publish
//! np_release minor --yolo    # Skip cleanup and tests
//! np_release 2.0.0-rc.1 --tag next
//! np_release patch --preview # Show the task list without running it
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod error;
pub mod git;
pub mod metadata;
pub mod prerequisite;
pub mod process;
pub mod publish;
pub mod release;
pub mod tasks;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use metadata::PackageDescriptor;
pub use process::{CommandRunner, Invocation, SystemRunner};
pub use release::{build_tasks, run, run_in};
pub use tasks::{ProgressEvent, ProgressSender, StepState, TaskList};
pub use version::VersionBump;

use std::path::PathBuf;

/// Options for a release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Skip cleanup and tests
    pub yolo: bool,
    /// Remove `node_modules` and reinstall before testing
    pub cleanup: bool,
    /// Deprecated alias for `cleanup: false`
    pub skip_cleanup: bool,
    /// Publish to npm and push tags
    pub publish: bool,
    /// Publish from `dist_dir` instead of the project root
    pub dist: bool,
    /// Output directory used when `dist` is set, relative to the project root
    pub dist_dir: PathBuf,
    /// npm dist-tag to publish under
    pub tag: Option<String>,
    /// Allow releasing from branches other than main/master
    pub any_branch: bool,
    /// Install dependencies with yarn instead of `npm install`
    pub yarn: bool,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            yolo: false,
            cleanup: true,
            skip_cleanup: false,
            publish: true,
            dist: false,
            dist_dir: PathBuf::from("dist"),
            tag: None,
            any_branch: false,
            yarn: true,
        }
    }
}

/// Which optional parts of the task list a set of options enables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Cleanup and dependency reinstall
    pub run_cleanup: bool,
    /// Test run
    pub run_tests: bool,
    /// Publish and tag push
    pub publish: bool,
    /// Publish from the output directory
    pub dist: bool,
}

impl ReleaseOptions {
    /// Resolve flag precedence; `yolo` wins over `cleanup`
    pub fn plan(&self) -> ReleasePlan {
        ReleasePlan {
            run_cleanup: self.cleanup && !self.skip_cleanup && !self.yolo,
            run_tests: !self.yolo,
            publish: self.publish,
            dist: self.publish && self.dist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_clean_test_and_publish() {
        let plan = ReleaseOptions::default().plan();
        assert!(plan.run_cleanup);
        assert!(plan.run_tests);
        assert!(plan.publish);
        assert!(!plan.dist);
    }

    #[test]
    fn test_yolo_overrides_cleanup() {
        let options = ReleaseOptions {
            yolo: true,
            cleanup: true,
            ..ReleaseOptions::default()
        };
        let plan = options.plan();
        assert!(!plan.run_cleanup);
        assert!(!plan.run_tests);
    }

    #[test]
    fn test_skip_cleanup_alias() {
        let options = ReleaseOptions {
            skip_cleanup: true,
            ..ReleaseOptions::default()
        };
        let plan = options.plan();
        assert!(!plan.run_cleanup);
        assert!(plan.run_tests);
    }
}
