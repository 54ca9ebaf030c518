//! Import facts and their aggregation.
//!
//! Extraction produces immutable [`ImportOccurrence`] records; the
//! [`UsageMap`] aggregates them per top-level module name, preserving the
//! order occurrences were seen in so reports are reproducible.

mod extractor;
mod notebook;

pub use extractor::{ExtractError, ImportExtractor};
pub use notebook::extract_notebook_imports;

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A single import of a module at a known location.
///
/// One module may have many occurrences across files; each one surfaces
/// independently in location-carrying issues. Line numbers are 1-based,
/// columns 0-based, both optional for sources that cannot supply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOccurrence {
    /// Top-level module name, e.g. `numpy` for `import numpy.linalg`.
    pub module: String,
    /// File the import was found in.
    pub file: PathBuf,
    /// 1-based line number, if known.
    pub line: Option<usize>,
    /// 0-based column, if known.
    pub column: Option<usize>,
}

impl ImportOccurrence {
    /// Creates an occurrence with a known position.
    pub fn new(module: impl Into<String>, file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            module: module.into(),
            file: file.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

/// Aggregates, across all scanned files, each imported module name to the
/// ordered list of locations where it was imported.
///
/// # Example
///
/// ```
/// use depscope::imports::{ImportOccurrence, UsageMap};
///
/// let mut usage = UsageMap::new();
/// usage.add(ImportOccurrence::new("numpy", "src/main.py", 1, 0));
/// usage.add(ImportOccurrence::new("numpy", "src/util.py", 3, 0));
///
/// assert_eq!(usage.module_count(), 1);
/// assert_eq!(usage.occurrences("numpy").len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UsageMap {
    modules: BTreeMap<String, Vec<ImportOccurrence>>,
}

impl UsageMap {
    /// Creates an empty usage map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from a flat occurrence list.
    pub fn from_occurrences<I>(occurrences: I) -> Self
    where
        I: IntoIterator<Item = ImportOccurrence>,
    {
        let mut map = Self::new();
        for occurrence in occurrences {
            map.add(occurrence);
        }
        map
    }

    /// Records one occurrence, keeping insertion order per module.
    pub fn add(&mut self, occurrence: ImportOccurrence) {
        self.modules
            .entry(occurrence.module.clone())
            .or_default()
            .push(occurrence);
    }

    /// Distinct imported module names, in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Occurrences recorded for `module`, in the order they were added.
    pub fn occurrences(&self, module: &str) -> &[ImportOccurrence] {
        self.modules.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct imported modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no imports were recorded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
