//! Version bump handling for npm releases.
//!
//! This module parses the bump instruction given on the command line and
//! computes the version `npm version` will produce, so prerequisites can be
//! validated before anything is mutated.

mod bumper;

pub use bumper::{VersionBump, BUMP_KEYWORDS};

use crate::error::{PrerequisiteError, Result};
use semver::Version;

/// Bump instruction used when none is given
pub const DEFAULT_BUMP: &str = "patch";

/// Normalize raw user input, falling back to [`DEFAULT_BUMP`]
pub fn normalize_input(input: Option<&str>) -> String {
    match input.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_BUMP.to_string(),
    }
}

/// Parse the current version from package.json and apply the bump.
///
/// Fails when the input is invalid or when an explicit version does not move
/// forward from `current`.
pub fn resolve_next(current: &str, input: &str) -> Result<Version> {
    let bump = VersionBump::parse(input)?;
    let current = Version::parse(current).map_err(|_| PrerequisiteError::InvalidVersionInput {
        input: current.to_string(),
        keywords: BUMP_KEYWORDS.join(", "),
    })?;

    let next = bump.apply(&current)?;
    // Build metadata does not count towards precedence
    if next.cmp_precedence(&current) != std::cmp::Ordering::Greater {
        return Err(PrerequisiteError::VersionNotGreater {
            current: current.to_string(),
            new: next.to_string(),
        }
        .into());
    }

    Ok(next)
}
