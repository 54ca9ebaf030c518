//! Canonical declared-dependency model.
//!
//! Manifest parsers produce raw `(name, group, extras)` records in whatever
//! shape their dialect uses; this module normalizes them into one
//! deduplicated representation and computes the transitive closure of
//! everything reachable from the Main-group declarations.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::environment::InstalledIndex;

/// Normalizes a distribution package name per PEP 503.
///
/// Names are compared case-insensitively with `-`, `_`, and `.` treated as
/// equivalent separators; runs of separators collapse to a single `-`.
///
/// # Example
///
/// ```
/// use depscope::dependencies::normalize_package_name;
///
/// assert_eq!(normalize_package_name("Typing_Extensions"), "typing-extensions");
/// assert_eq!(normalize_package_name("ruamel.yaml"), "ruamel-yaml");
/// ```
pub fn normalize_package_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_separator = false;

    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !last_was_separator && !normalized.is_empty() {
                normalized.push('-');
            }
            last_was_separator = true;
        } else {
            normalized.extend(ch.to_lowercase());
            last_was_separator = false;
        }
    }

    // A trailing separator never survives normalization
    if normalized.ends_with('-') {
        normalized.pop();
    }
    normalized
}

/// The dependency group a declaration belongs to.
///
/// Manifest dialects with arbitrary custom groups collapse every non-main
/// group to `Dev` during parsing, so the classifier only ever sees these
/// two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// Runtime dependencies of the shipped code.
    Main,
    /// Tooling, test, and other development-only dependencies.
    Dev,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Dev => write!(f, "dev"),
        }
    }
}

/// A raw declaration as produced by a manifest parser, before
/// normalization.
#[derive(Debug, Clone)]
pub struct RawDependency {
    /// Package name exactly as written in the manifest.
    pub name: String,
    /// Group the declaration appeared under.
    pub group: Group,
    /// Extras requested for the package, e.g. `requests[security]`.
    pub extras: BTreeSet<String>,
}

impl RawDependency {
    /// Creates a raw declaration without extras.
    pub fn new(name: impl Into<String>, group: Group) -> Self {
        Self {
            name: name.into(),
            group,
            extras: BTreeSet::new(),
        }
    }

    /// Creates a raw declaration with extras.
    pub fn with_extras<I, S>(name: impl Into<String>, group: Group, extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            group,
            extras: extras.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single normalized dependency declaration.
///
/// At most one record exists per `(package, group)` pair; duplicate
/// declarations merge their extras. The same package may still appear once
/// per group — a manifest declaring a package as both Main and Dev is
/// malformed but both records are honored as "declared".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// PEP 503 normalized package name.
    pub package: String,
    /// Group the package is declared under.
    pub group: Group,
    /// Normalized extras requested for the package.
    pub extras: BTreeSet<String>,
}

/// The full set of declarations from a project manifest, deduplicated and
/// normalized, together with where they came from.
#[derive(Debug, Clone)]
pub struct DeclaredDependencies {
    records: Vec<DeclaredDependency>,
    main: BTreeSet<String>,
    dev: BTreeSet<String>,
    manifest_path: PathBuf,
}

impl DeclaredDependencies {
    /// Builds the model from raw parser output.
    ///
    /// Records are normalized, then deduplicated on `(package, group)` with
    /// extras merged. Input order is preserved for first occurrences so the
    /// unused-dependency pass reports in declaration order.
    pub fn from_raw(raw: Vec<RawDependency>, manifest_path: &Path) -> Self {
        let mut records: Vec<DeclaredDependency> = Vec::new();
        let mut seen: HashMap<(String, Group), usize> = HashMap::new();

        for dep in raw {
            let package = normalize_package_name(&dep.name);
            if package.is_empty() {
                continue;
            }
            let extras: BTreeSet<String> =
                dep.extras.iter().map(|e| normalize_package_name(e)).collect();

            match seen.get(&(package.clone(), dep.group)) {
                Some(&idx) => {
                    records[idx].extras.extend(extras);
                }
                None => {
                    seen.insert((package.clone(), dep.group), records.len());
                    records.push(DeclaredDependency {
                        package,
                        group: dep.group,
                        extras,
                    });
                }
            }
        }

        let main = records
            .iter()
            .filter(|r| r.group == Group::Main)
            .map(|r| r.package.clone())
            .collect();
        let dev = records
            .iter()
            .filter(|r| r.group == Group::Dev)
            .map(|r| r.package.clone())
            .collect();

        Self {
            records,
            main,
            dev,
            manifest_path: manifest_path.to_path_buf(),
        }
    }

    /// All deduplicated records, in declaration order.
    pub fn records(&self) -> &[DeclaredDependency] {
        &self.records
    }

    /// Normalized names of Main-group declarations.
    pub fn main_packages(&self) -> &BTreeSet<String> {
        &self.main
    }

    /// Normalized names of Dev-group declarations.
    pub fn dev_packages(&self) -> &BTreeSet<String> {
        &self.dev
    }

    /// Path of the manifest these declarations came from. Unused-dependency
    /// issues point here.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Returns true if the normalized package name is declared in either
    /// group.
    pub fn is_declared(&self, package: &str) -> bool {
        self.main.contains(package) || self.dev.contains(package)
    }

    /// Computes the set of installed packages reachable from the
    /// Main-group declarations.
    ///
    /// Breadth-first traversal over the index's direct-dependency edges,
    /// unbounded depth, cycle-safe via a visited set. Dev-group
    /// declarations never seed the traversal: a main-code import satisfied
    /// only through a dev tool's own dependency is still suspect.
    /// Extras-conditioned requirements of a declared package are followed
    /// only for the extras the declaration actually requests.
    ///
    /// Packages not known to the index (uninstalled) are dropped from the
    /// result; they contribute no edges either.
    pub fn transitive_closure(&self, index: &InstalledIndex) -> BTreeSet<String> {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        for record in self.records.iter().filter(|r| r.group == Group::Main) {
            if visited.insert(record.package.clone()) {
                queue.push_back(record.package.clone());
            }
            for extra in &record.extras {
                for dep in index.extra_dependencies(&record.package, extra) {
                    if visited.insert(dep.to_string()) {
                        queue.push_back(dep.to_string());
                    }
                }
            }
        }

        while let Some(package) = queue.pop_front() {
            for dep in index.direct_dependencies(&package) {
                if visited.insert(dep.to_string()) {
                    queue.push_back(dep.to_string());
                }
            }
        }

        visited
            .into_iter()
            .filter(|p| index.contains_package(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, group: Group) -> RawDependency {
        RawDependency::new(name, group)
    }

    #[test]
    fn test_normalize_package_name() {
        assert_eq!(normalize_package_name("requests"), "requests");
        assert_eq!(normalize_package_name("Flask"), "flask");
        assert_eq!(normalize_package_name("typing_extensions"), "typing-extensions");
        assert_eq!(normalize_package_name("ruamel.yaml"), "ruamel-yaml");
        assert_eq!(normalize_package_name("foo--bar__baz"), "foo-bar-baz");
        assert_eq!(normalize_package_name("foo."), "foo");
    }

    #[test]
    fn test_from_raw_dedupes_within_group() {
        let deps = DeclaredDependencies::from_raw(
            vec![
                raw("requests", Group::Main),
                raw("Requests", Group::Main),
                raw("requests", Group::Dev),
            ],
            Path::new("pyproject.toml"),
        );

        assert_eq!(deps.records().len(), 2);
        assert!(deps.main_packages().contains("requests"));
        assert!(deps.dev_packages().contains("requests"));
    }

    #[test]
    fn test_from_raw_merges_extras() {
        let deps = DeclaredDependencies::from_raw(
            vec![
                RawDependency::with_extras("uvicorn", Group::Main, ["standard"]),
                RawDependency::with_extras("uvicorn", Group::Main, ["watch"]),
            ],
            Path::new("pyproject.toml"),
        );

        assert_eq!(deps.records().len(), 1);
        let extras: Vec<&str> = deps.records()[0].extras.iter().map(String::as_str).collect();
        assert_eq!(extras, vec!["standard", "watch"]);
    }

    #[test]
    fn test_is_declared() {
        let deps = DeclaredDependencies::from_raw(
            vec![raw("numpy", Group::Main), raw("pytest", Group::Dev)],
            Path::new("pyproject.toml"),
        );

        assert!(deps.is_declared("numpy"));
        assert!(deps.is_declared("pytest"));
        assert!(!deps.is_declared("scipy"));
    }

    #[test]
    fn test_transitive_closure_follows_edges() {
        let mut index = InstalledIndex::new();
        index.add_package("bar", &["bar"], &["foo"]);
        index.add_package("foo", &["foo"], &["baz"]);
        index.add_package("baz", &["baz"], &[]);

        let deps = DeclaredDependencies::from_raw(
            vec![raw("bar", Group::Main)],
            Path::new("pyproject.toml"),
        );

        let closure = deps.transitive_closure(&index);
        assert!(closure.contains("bar"));
        assert!(closure.contains("foo"));
        assert!(closure.contains("baz"));
    }

    #[test]
    fn test_transitive_closure_is_cycle_safe() {
        let mut index = InstalledIndex::new();
        index.add_package("a", &["a"], &["b"]);
        index.add_package("b", &["b"], &["a"]);

        let deps = DeclaredDependencies::from_raw(
            vec![raw("a", Group::Main)],
            Path::new("pyproject.toml"),
        );

        let closure = deps.transitive_closure(&index);
        assert_eq!(closure.len(), 2);
    }

    #[test]
    fn test_transitive_closure_excludes_dev_roots() {
        let mut index = InstalledIndex::new();
        index.add_package("pytest", &["pytest"], &["pluggy"]);
        index.add_package("pluggy", &["pluggy"], &[]);

        let deps = DeclaredDependencies::from_raw(
            vec![raw("pytest", Group::Dev)],
            Path::new("pyproject.toml"),
        );

        assert!(deps.transitive_closure(&index).is_empty());
    }

    #[test]
    fn test_transitive_closure_excludes_uninstalled() {
        let index = InstalledIndex::new();
        let deps = DeclaredDependencies::from_raw(
            vec![raw("ghost", Group::Main)],
            Path::new("pyproject.toml"),
        );

        assert!(deps.transitive_closure(&index).is_empty());
    }

    #[test]
    fn test_transitive_closure_monotonic() {
        let mut index = InstalledIndex::new();
        index.add_package("a", &["a"], &["shared"]);
        index.add_package("b", &["b"], &["extra-dep"]);
        index.add_package("shared", &["shared"], &[]);
        index.add_package("extra-dep", &["extra_dep"], &[]);

        let small = DeclaredDependencies::from_raw(
            vec![raw("a", Group::Main)],
            Path::new("pyproject.toml"),
        );
        let large = DeclaredDependencies::from_raw(
            vec![raw("a", Group::Main), raw("b", Group::Main)],
            Path::new("pyproject.toml"),
        );

        let small_closure = small.transitive_closure(&index);
        let large_closure = large.transitive_closure(&index);
        assert!(small_closure.is_subset(&large_closure));
    }

    #[test]
    fn test_transitive_closure_honors_declared_extras() {
        let mut index = InstalledIndex::new();
        index.add_package("uvicorn", &["uvicorn"], &["click"]);
        index.add_extra_dependency("uvicorn", "standard", "watchfiles");
        index.add_package("click", &["click"], &[]);
        index.add_package("watchfiles", &["watchfiles"], &[]);

        let without = DeclaredDependencies::from_raw(
            vec![raw("uvicorn", Group::Main)],
            Path::new("pyproject.toml"),
        );
        assert!(!without.transitive_closure(&index).contains("watchfiles"));

        let with = DeclaredDependencies::from_raw(
            vec![RawDependency::with_extras("uvicorn", Group::Main, ["standard"])],
            Path::new("pyproject.toml"),
        );
        assert!(with.transitive_closure(&index).contains("watchfiles"));
    }
}
