//! Command line argument parsing and validation.
//!
//! One positional version argument plus flags; the tool is meant to be run
//! bare from inside a package and "just work".

use crate::error::CliError;
use crate::ReleaseOptions;
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// A better npm publish
#[derive(Parser, Debug)]
#[command(
    name = "np_release",
    version,
    about = "A better npm publish",
    long_about = "Check prerequisites and git state, reinstall dependencies, run tests,
bump the version, publish to npm and push the tag, stopping at the first failure.

Usage:
  np_release                      # patch release
  np_release minor
  np_release 2.0.0-rc.1 --tag next
  np_release major --yolo --no-publish"
)]
pub struct Args {
    /// patch | minor | major | prepatch | preminor | premajor | prerelease | <semver>
    #[arg(id = "version_input", index = 1, value_name = "VERSION")]
    pub version: Option<String>,

    /// Skip cleanup and testing
    #[arg(long)]
    pub yolo: bool,

    /// Skip removing node_modules and reinstalling
    #[arg(long)]
    pub no_cleanup: bool,

    /// Deprecated alias for --no-cleanup
    #[arg(long, hide = true)]
    pub skip_cleanup: bool,

    /// Skip publishing and tag push
    #[arg(long)]
    pub no_publish: bool,

    /// Publish from the build output directory
    #[arg(long)]
    pub dist: bool,

    /// Build output directory used by --dist
    #[arg(long, value_name = "DIR", requires = "dist")]
    pub dist_dir: Option<PathBuf>,

    /// Publish under the given npm dist-tag
    #[arg(long, value_name = "TAG", env = "NP_RELEASE_TAG")]
    pub tag: Option<String>,

    /// Allow publishing from any branch
    #[arg(long)]
    pub any_branch: bool,

    /// Install dependencies with `npm install` instead of yarn
    #[arg(long)]
    pub no_yarn: bool,

    /// Print the task list without running anything
    #[arg(long)]
    pub preview: bool,

    /// Print the preview as JSON
    #[arg(long, requires = "preview")]
    pub json: bool,

    /// Show output of every command
    #[arg(short, long)]
    pub verbose: bool,

    /// Start looking for package.json here instead of the current directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(tag) = &self.tag
            && tag.trim().is_empty()
        {
            return Err(CliError::InvalidArguments {
                reason: "--tag must not be empty".to_string(),
            });
        }

        if let Some(dir) = &self.dist_dir
            && dir.as_os_str().is_empty()
        {
            return Err(CliError::InvalidArguments {
                reason: "--dist-dir must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Release options described by these arguments
    pub fn to_options(&self) -> ReleaseOptions {
        let defaults = ReleaseOptions::default();
        ReleaseOptions {
            yolo: self.yolo,
            cleanup: !self.no_cleanup,
            skip_cleanup: self.skip_cleanup,
            publish: !self.no_publish,
            dist: self.dist,
            dist_dir: self.dist_dir.clone().unwrap_or(defaults.dist_dir),
            tag: self.tag.clone(),
            any_branch: self.any_branch,
            yarn: !self.no_yarn,
        }
    }

    /// Absolute directory manifest discovery starts from
    pub fn start_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.absolutize()?.to_path_buf()),
            None => std::env::current_dir(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, false),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("np_release").chain(argv.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.version, None);
        assert_eq!(args.to_options(), ReleaseOptions::default());
    }

    #[test]
    fn test_flags_map_to_options() {
        let args = parse(&[
            "minor",
            "--yolo",
            "--no-publish",
            "--any-branch",
            "--no-yarn",
            "--tag",
            "beta",
        ]);
        let options = args.to_options();

        assert_eq!(args.version.as_deref(), Some("minor"));
        assert!(options.yolo);
        assert!(!options.publish);
        assert!(options.any_branch);
        assert!(!options.yarn);
        assert_eq!(options.tag.as_deref(), Some("beta"));
    }

    #[test]
    fn test_dist_dir_requires_dist() {
        let argv = ["np_release", "--dist-dir", "build"];
        assert!(Args::try_parse_from(argv).is_err());

        let args = parse(&["--dist", "--dist-dir", "build"]);
        assert_eq!(args.to_options().dist_dir, PathBuf::from("build"));
    }

    #[test]
    fn test_deprecated_skip_cleanup_still_parses() {
        let options = parse(&["--skip-cleanup"]).to_options();
        assert!(options.cleanup);
        assert!(options.skip_cleanup);
        assert!(!options.plan().run_cleanup);
    }

    #[test]
    fn test_empty_tag_rejected() {
        let args = parse(&["--tag", " "]);
        assert!(args.validate().is_err());
    }
}
