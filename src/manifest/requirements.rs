//! `requirements.txt` parsing.
//!
//! The plain requirements format is one requirement per line with `#`
//! comments and pip options mixed in. Which group the file declares is
//! decided by the caller (a `requirements-dev.txt` is a Dev file, the
//! rest are Main).

use std::fs;
use std::path::Path;

use super::requirement::parse_requirement;
use super::ManifestError;
use crate::dependencies::{Group, RawDependency};

/// Parses a requirements file into raw declarations tagged with `group`.
pub fn parse_requirements(path: &Path, group: Group) -> Result<Vec<RawDependency>, ManifestError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_requirements_str(&content, group))
}

/// Parses requirements content from a string.
///
/// Lines that are not requirements (comments, pip options, bare URLs)
/// are skipped; a malformed line never fails the whole file.
///
/// # Example
///
/// ```
/// use depscope::dependencies::Group;
/// use depscope::manifest::requirements::parse_requirements_str;
///
/// let deps = parse_requirements_str("requests>=2.0\n# dev tools\nclick\n", Group::Main);
/// assert_eq!(deps.len(), 2);
/// ```
pub fn parse_requirements_str(content: &str, group: Group) -> Vec<RawDependency> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter_map(parse_requirement)
        .map(|req| RawDependency::with_extras(req.name, group, req.extras))
        .collect()
}
