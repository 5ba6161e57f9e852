//! Semantic version bump computation matching `npm version` increments.

use crate::error::PrerequisiteError;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Keywords accepted by `npm version`
pub const BUMP_KEYWORDS: [&str; 7] = [
    "patch",
    "minor",
    "major",
    "prepatch",
    "preminor",
    "premajor",
    "prerelease",
];

/// Version bump instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionBump {
    /// Bump major version (x.0.0)
    Major,
    /// Bump minor version (x.y.0)
    Minor,
    /// Bump patch version (x.y.z)
    Patch,
    /// Next major as a prerelease (x.0.0-0)
    Premajor,
    /// Next minor as a prerelease (x.y.0-0)
    Preminor,
    /// Next patch as a prerelease (x.y.z-0)
    Prepatch,
    /// Increment the prerelease counter
    Prerelease,
    /// Set an explicit version
    Exact(Version),
}

impl VersionBump {
    /// Parse a bump keyword or explicit semver version.
    ///
    /// A leading `v` on explicit versions is accepted, as npm does.
    pub fn parse(input: &str) -> Result<Self, PrerequisiteError> {
        let bump = match input {
            "major" => Self::Major,
            "minor" => Self::Minor,
            "patch" => Self::Patch,
            "premajor" => Self::Premajor,
            "preminor" => Self::Preminor,
            "prepatch" => Self::Prepatch,
            "prerelease" => Self::Prerelease,
            other => {
                let raw = other.strip_prefix('v').unwrap_or(other);
                let version =
                    Version::parse(raw).map_err(|_| PrerequisiteError::InvalidVersionInput {
                        input: input.to_string(),
                        keywords: BUMP_KEYWORDS.join(", "),
                    })?;
                Self::Exact(version)
            }
        };
        Ok(bump)
    }

    /// Compute the version that follows `current`.
    ///
    /// Fails when a component or prerelease counter would overflow.
    pub fn apply(&self, current: &Version) -> Result<Version, PrerequisiteError> {
        let mut next = current.clone();
        next.build = BuildMetadata::EMPTY;
        let is_pre = !current.pre.is_empty();

        match self {
            Self::Major => {
                // 1.0.0-beta.1 -> 1.0.0
                if !(is_pre && current.minor == 0 && current.patch == 0) {
                    next.major = bump(current, current.major)?;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Self::Minor => {
                if !(is_pre && current.patch == 0) {
                    next.minor = bump(current, current.minor)?;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Self::Patch => {
                if !is_pre {
                    next.patch = bump(current, current.patch)?;
                }
                next.pre = Prerelease::EMPTY;
            }
            Self::Premajor => {
                next.major = bump(current, current.major)?;
                next.minor = 0;
                next.patch = 0;
                next.pre = zero_prerelease();
            }
            Self::Preminor => {
                next.minor = bump(current, current.minor)?;
                next.patch = 0;
                next.pre = zero_prerelease();
            }
            Self::Prepatch => {
                next.patch = bump(current, current.patch)?;
                next.pre = zero_prerelease();
            }
            Self::Prerelease => {
                if is_pre {
                    next.pre = increment_prerelease(current)?;
                } else {
                    next.patch = bump(current, current.patch)?;
                    next.pre = zero_prerelease();
                }
            }
            Self::Exact(version) => return Ok(version.clone()),
        }

        Ok(next)
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Premajor => write!(f, "premajor"),
            Self::Preminor => write!(f, "preminor"),
            Self::Prepatch => write!(f, "prepatch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::Exact(version) => write!(f, "{}", version),
        }
    }
}

fn zero_prerelease() -> Prerelease {
    Prerelease::new("0").unwrap_or(Prerelease::EMPTY)
}

fn out_of_range(current: &Version) -> PrerequisiteError {
    PrerequisiteError::InvalidVersionInput {
        input: current.to_string(),
        keywords: BUMP_KEYWORDS.join(", "),
    }
}

fn bump(current: &Version, component: u64) -> Result<u64, PrerequisiteError> {
    component.checked_add(1).ok_or_else(|| out_of_range(current))
}

/// Increment the right-most numeric identifier, or append `.0` when none exists
fn increment_prerelease(current: &Version) -> Result<Prerelease, PrerequisiteError> {
    let pre = &current.pre;
    let mut parts: Vec<String> = pre.as_str().split('.').map(str::to_string).collect();

    let numeric = parts
        .iter()
        .rposition(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    match numeric {
        Some(index) => {
            let value: u64 = parts[index].parse().map_err(|_| out_of_range(current))?;
            parts[index] = bump(current, value)?.to_string();
        }
        None => parts.push("0".to_string()),
    }

    Prerelease::new(&parts.join(".")).map_err(|_| out_of_range(current))
}
