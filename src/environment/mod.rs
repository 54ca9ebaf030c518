//! Installed-distribution index.
//!
//! A per-run snapshot of the active environment: which import-level module
//! names each installed distribution provides, and which distributions each
//! one directly requires. The dependency edges live in a petgraph
//! `DiGraph`, with a name-to-index map for O(1) lookup; the transitive
//! closure in [`crate::dependencies`] walks these edges.

mod site_packages;

pub use site_packages::{find_site_packages, index_from_site_packages, EnvironmentError};

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::dependencies::normalize_package_name;

/// Maps import-level module names to the installed distributions that
/// provide them, plus each distribution's direct runtime requirements.
///
/// A module mapping to more than one package is preserved as a set, not
/// collapsed: namespace packages and re-exporting distributions make the
/// mapping genuinely many-to-many. Any match in the set satisfies "this
/// module is provided by a declared package".
///
/// # Example
///
/// ```
/// use depscope::environment::InstalledIndex;
///
/// let mut index = InstalledIndex::new();
/// index.add_package("opencv-python", &["cv2"], &["numpy"]);
/// index.add_package("numpy", &["numpy"], &[]);
///
/// let providers = index.packages_for_module("cv2").unwrap();
/// assert!(providers.contains("opencv-python"));
/// assert_eq!(index.direct_dependencies("opencv-python"), vec!["numpy"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstalledIndex {
    /// Directed graph of package requirement edges; node weight is the
    /// normalized package name.
    graph: DiGraph<String, ()>,
    /// Maps normalized package names to their node indices.
    node_indices: HashMap<String, NodeIndex>,
    /// Import-level module name to the set of providing distributions.
    module_to_packages: HashMap<String, BTreeSet<String>>,
    /// Extras-conditioned requirements, keyed by package then extra name.
    extra_dependencies: HashMap<String, HashMap<String, BTreeSet<String>>>,
    /// Packages with actual installed metadata. Requirement edges may point
    /// at packages that are not themselves installed; those get graph nodes
    /// but never enter this set.
    installed: HashSet<String>,
}

impl InstalledIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an installed distribution with the modules it provides
    /// and the packages it directly requires.
    ///
    /// Names are normalized on the way in. Re-registering a package merges
    /// modules and requirement edges rather than replacing them.
    pub fn add_package(&mut self, name: &str, modules: &[&str], dependencies: &[&str]) {
        let package = normalize_package_name(name);
        let package_idx = self.ensure_node(&package);
        self.installed.insert(package.clone());

        for module in modules {
            self.module_to_packages
                .entry(module.to_string())
                .or_default()
                .insert(package.clone());
        }

        for dep in dependencies {
            let dep = normalize_package_name(dep);
            let dep_idx = self.ensure_node(&dep);
            if !self.graph.contains_edge(package_idx, dep_idx) {
                self.graph.add_edge(package_idx, dep_idx, ());
            }
        }
    }

    /// Registers a requirement that only applies when `extra` is requested
    /// for `package` (the `extra == "..."` marker in metadata).
    pub fn add_extra_dependency(&mut self, package: &str, extra: &str, dependency: &str) {
        let package = normalize_package_name(package);
        let dependency = normalize_package_name(dependency);
        self.extra_dependencies
            .entry(package)
            .or_default()
            .entry(normalize_package_name(extra))
            .or_default()
            .insert(dependency);
    }

    /// The set of installed distributions providing `module`, if any.
    pub fn packages_for_module(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.module_to_packages.get(module)
    }

    /// Direct runtime requirements of `package`, sorted by name.
    ///
    /// Unknown packages have no edges and yield an empty list.
    pub fn direct_dependencies(&self, package: &str) -> Vec<&str> {
        let package = normalize_package_name(package);
        let Some(&idx) = self.node_indices.get(&package) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Requirements of `package` conditioned on `extra`, sorted by name.
    pub fn extra_dependencies(&self, package: &str, extra: &str) -> Vec<&str> {
        self.extra_dependencies
            .get(&normalize_package_name(package))
            .and_then(|extras| extras.get(&normalize_package_name(extra)))
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns true if `name` is an installed distribution.
    pub fn contains_package(&self, name: &str) -> bool {
        self.installed.contains(&normalize_package_name(name))
    }

    /// Number of installed distributions in the index.
    pub fn package_count(&self) -> usize {
        self.installed.len()
    }

    /// Number of distinct module names the index can resolve.
    pub fn module_count(&self) -> usize {
        self.module_to_packages.len()
    }

    fn ensure_node(&mut self, package: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(package) {
            return idx;
        }
        let idx = self.graph.add_node(package.to_string());
        self.node_indices.insert(package.to_string(), idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = InstalledIndex::new();
        assert_eq!(index.package_count(), 0);
        assert!(index.packages_for_module("numpy").is_none());
        assert!(index.direct_dependencies("numpy").is_empty());
    }

    #[test]
    fn test_module_lookup_normalizes_package_not_module() {
        let mut index = InstalledIndex::new();
        index.add_package("Typing_Extensions", &["typing_extensions"], &[]);

        // Module names stay case-sensitive and keep underscores
        let providers = index.packages_for_module("typing_extensions").unwrap();
        assert!(providers.contains("typing-extensions"));
        assert!(index.packages_for_module("Typing_Extensions").is_none());
    }

    #[test]
    fn test_module_provided_by_multiple_packages() {
        let mut index = InstalledIndex::new();
        index.add_package("opencv-python", &["cv2"], &[]);
        index.add_package("opencv-python-headless", &["cv2"], &[]);

        let providers = index.packages_for_module("cv2").unwrap();
        assert_eq!(providers.len(), 2);
    }

    #[test]
    fn test_direct_dependencies_sorted() {
        let mut index = InstalledIndex::new();
        index.add_package("pandas", &["pandas"], &["pytz", "numpy", "python-dateutil"]);

        assert_eq!(
            index.direct_dependencies("pandas"),
            vec!["numpy", "python-dateutil", "pytz"]
        );
    }

    #[test]
    fn test_requirement_edge_does_not_mark_installed() {
        let mut index = InstalledIndex::new();
        index.add_package("requests", &["requests"], &["urllib3"]);

        assert!(index.contains_package("requests"));
        assert!(!index.contains_package("urllib3"));
        assert_eq!(index.package_count(), 1);
    }

    #[test]
    fn test_reregistering_merges() {
        let mut index = InstalledIndex::new();
        index.add_package("pkg", &["pkg"], &["a"]);
        index.add_package("pkg", &["pkg_extra"], &["a", "b"]);

        assert_eq!(index.direct_dependencies("pkg"), vec!["a", "b"]);
        assert!(index.packages_for_module("pkg_extra").is_some());
    }

    #[test]
    fn test_extra_dependencies() {
        let mut index = InstalledIndex::new();
        index.add_package("uvicorn", &["uvicorn"], &["click"]);
        index.add_extra_dependency("uvicorn", "standard", "watchfiles");

        assert_eq!(index.extra_dependencies("uvicorn", "standard"), vec!["watchfiles"]);
        assert!(index.extra_dependencies("uvicorn", "other").is_empty());
        assert_eq!(index.direct_dependencies("uvicorn"), vec!["click"]);
    }
}
