//! Issue types emitted by the classifier.
//!
//! The shape of [`Issue`] is the stable contract the reporters render;
//! everything downstream (text output, JSON output, exit codes) works off
//! this and nothing else.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The rule an issue was raised under.
///
/// Codes sort in rule order, which is also the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IssueCode {
    /// DEP001: module imported but not provided by any declared package.
    #[serde(rename = "DEP001")]
    Missing,
    /// DEP002: package declared but never imported.
    #[serde(rename = "DEP002")]
    Unused,
    /// DEP003: module satisfied only by a transitive dependency.
    #[serde(rename = "DEP003")]
    Transitive,
    /// DEP004: main-code import satisfied only by a dev declaration.
    #[serde(rename = "DEP004")]
    MisplacedDev,
}

impl IssueCode {
    /// The stable rule identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "DEP001",
            Self::Unused => "DEP002",
            Self::Transitive => "DEP003",
            Self::MisplacedDev => "DEP004",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue was observed.
///
/// Import-level issues point at the import; unused-dependency issues point
/// at the manifest with no line or column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Location {
    /// A location with a known position (1-based line, 0-based column).
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// A whole-file location, used for manifest declaration sites.
    pub fn file_only(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// A single dependency issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Rule the issue was raised under.
    pub code: IssueCode,
    /// The module or package the issue is about. For DEP003/DEP004 this is
    /// the matched package name, not the raw module name when they differ.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
    /// Where the issue was observed, when known.
    pub location: Option<Location>,
}

impl Issue {
    /// DEP001 for one import occurrence.
    pub fn missing(module: &str, location: Location) -> Self {
        Self {
            code: IssueCode::Missing,
            subject: module.to_string(),
            message: format!("'{module}' imported but missing from the dependency definitions"),
            location: Some(location),
        }
    }

    /// DEP002 for a declaration in the manifest.
    pub fn unused(package: &str, manifest: &Path) -> Self {
        Self {
            code: IssueCode::Unused,
            subject: package.to_string(),
            message: format!("'{package}' defined as a dependency but not used in the codebase"),
            location: Some(Location::file_only(manifest)),
        }
    }

    /// DEP003 for one import occurrence.
    pub fn transitive(package: &str, location: Location) -> Self {
        Self {
            code: IssueCode::Transitive,
            subject: package.to_string(),
            message: format!("'{package}' imported but it is a transitive dependency"),
            location: Some(location),
        }
    }

    /// DEP004 for one import occurrence.
    pub fn misplaced_dev(package: &str, location: Location) -> Self {
        Self {
            code: IssueCode::MisplacedDev,
            subject: package.to_string(),
            message: format!("'{package}' imported but declared as a dev dependency"),
            location: Some(location),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {} {}", self.code, self.message),
            None => write!(f, "{} {}", self.code, self.message),
        }
    }
}
