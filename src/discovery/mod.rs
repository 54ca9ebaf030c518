//! Project file discovery.
//!
//! Walks the project tree for `.py` and `.ipynb` files with regex-based
//! exclude patterns, and determines which top-level module names are
//! first-party (owned by the project itself). First-party imports are
//! never dependency issues.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Errors that can occur while setting up discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// An exclude pattern is not a valid regular expression.
    #[error("invalid exclude pattern: {0}")]
    InvalidExclude(#[from] regex::Error),
}

/// Directories and files excluded from scanning unless overridden.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "venv",
    r"\.venv",
    r"\.direnv",
    r"\.git",
    r"\.tox",
    "build",
    "dist",
    "setup\\.py",
];

/// Recursive finder for Python source files.
///
/// Exclude patterns are regular expressions matched against the path
/// relative to the scanned root, using `/` separators on every platform.
/// A pattern matching a directory prunes the whole subtree.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use depscope::discovery::FileFinder;
///
/// let finder = FileFinder::new(&["tests".to_string()], false).unwrap();
/// let files = finder.find(Path::new("."));
/// ```
pub struct FileFinder {
    exclude: Option<Regex>,
    ignore_notebooks: bool,
}

impl FileFinder {
    /// Creates a finder with the given exclude patterns.
    ///
    /// An empty pattern list disables exclusion entirely.
    pub fn new(exclude: &[String], ignore_notebooks: bool) -> Result<Self, DiscoveryError> {
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("^(?:{})", exclude.join("|")))?)
        };
        Ok(Self {
            exclude,
            ignore_notebooks,
        })
    }

    /// Creates a finder with [`DEFAULT_EXCLUDE`] plus extra patterns.
    pub fn with_default_excludes(
        extend_exclude: &[String],
        ignore_notebooks: bool,
    ) -> Result<Self, DiscoveryError> {
        let mut patterns: Vec<String> = DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect();
        patterns.extend_from_slice(extend_exclude);
        Self::new(&patterns, ignore_notebooks)
    }

    /// Returns all non-excluded `.py` (and `.ipynb`) files under `root`,
    /// sorted for deterministic scan order.
    pub fn find(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(root, entry.path()))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.wants_file(path))
            .collect();
        files.sort();

        debug!("found {} Python files under {}", files.len(), root.display());
        files
    }

    fn wants_file(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => true,
            Some("ipynb") => !self.ignore_notebooks,
            _ => false,
        }
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Some(re) = &self.exclude else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        !relative.is_empty() && re.is_match(&relative)
    }
}

/// Determines the project's own top-level module names.
///
/// Looks at the project root and a `src/` layout directory for packages
/// (directories containing `__init__.py`) and top-level `.py` files.
pub fn first_party_modules(project_root: &Path) -> BTreeSet<String> {
    let mut modules = BTreeSet::new();
    for dir in [project_root.to_path_buf(), project_root.join("src")] {
        collect_top_level_modules(&dir, &mut modules);
    }
    modules
}

fn collect_top_level_modules(dir: &Path, modules: &mut BTreeSet<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if path.is_dir() && path.join("__init__.py").is_file() {
            modules.insert(name.to_string());
        } else if path.extension().and_then(|e| e.to_str()) == Some("py") {
            modules.insert(name.to_string());
        }
    }
}
