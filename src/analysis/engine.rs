//! The dependency usage classifier.
//!
//! Consumes the usage map, the declared-dependency model, the installed
//! index, the standard-library registry, and the first-party module set,
//! and produces the ordered issue list. Classification is a pure pass over
//! immutable snapshots: it performs no I/O, raises nothing, and resolves
//! degraded input to "module unknown" instead of failing.

use std::collections::BTreeSet;

use tracing::debug;

use super::issues::{Issue, Location};
use crate::config::Config;
use crate::dependencies::DeclaredDependencies;
use crate::environment::InstalledIndex;
use crate::imports::{ImportOccurrence, UsageMap};
use crate::stdlib::{is_stdlib_module, PythonVersion};

/// Classifies every imported module and every declared dependency.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use depscope::analysis::Classifier;
/// use depscope::config::Config;
/// use depscope::dependencies::{DeclaredDependencies, Group, RawDependency};
/// use depscope::environment::InstalledIndex;
/// use depscope::imports::{ImportOccurrence, UsageMap};
/// use depscope::stdlib::PythonVersion;
///
/// let mut index = InstalledIndex::new();
/// index.add_package("requests", &["requests"], &[]);
///
/// let declared = DeclaredDependencies::from_raw(
///     vec![RawDependency::new("requests", Group::Main)],
///     Path::new("pyproject.toml"),
/// );
/// let usage = UsageMap::from_occurrences(vec![
///     ImportOccurrence::new("requests", "src/main.py", 1, 0),
/// ]);
///
/// let config = Config::default();
/// let classifier = Classifier::new(
///     &usage,
///     &declared,
///     &index,
///     Default::default(),
///     PythonVersion::default(),
///     &config,
/// );
/// assert!(classifier.classify().is_empty());
/// ```
pub struct Classifier<'a> {
    usage: &'a UsageMap,
    declared: &'a DeclaredDependencies,
    index: &'a InstalledIndex,
    first_party: BTreeSet<String>,
    version: PythonVersion,
    config: &'a Config,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier over one analysis run's snapshots.
    pub fn new(
        usage: &'a UsageMap,
        declared: &'a DeclaredDependencies,
        index: &'a InstalledIndex,
        first_party: BTreeSet<String>,
        version: PythonVersion,
        config: &'a Config,
    ) -> Self {
        Self {
            usage,
            declared,
            index,
            first_party,
            version,
            config,
        }
    }

    /// Runs the full rule set and returns the ordered issue list.
    ///
    /// Per module: standard-library and first-party imports are exempt;
    /// unknown modules are missing (DEP001); otherwise the candidate
    /// packages are intersected with Main declarations, Dev declarations,
    /// and the transitive closure in that priority order. The reverse pass
    /// then reports declarations never matched by any import (DEP002).
    /// Output is sorted by `(code, subject, file, line, column)`; the sort
    /// is stable, so full ties keep first-seen order.
    pub fn classify(&self) -> Vec<Issue> {
        let closure = self.declared.transitive_closure(self.index);
        debug!(
            "classifying {} modules against {} declarations ({} in closure)",
            self.usage.module_count(),
            self.declared.records().len(),
            closure.len()
        );

        let mut issues = Vec::new();
        // Declared packages matched by some import, recorded before any
        // ignore-filtering so an ignored DEP004 still counts as usage.
        let mut matched: BTreeSet<String> = BTreeSet::new();

        for module in self.usage.modules() {
            if is_stdlib_module(module, self.version) || self.first_party.contains(module) {
                continue;
            }
            self.classify_module(module, &closure, &mut matched, &mut issues);
        }

        for record in self.declared.records() {
            if matched.contains(&record.package) {
                continue;
            }
            if self.config.ignore_unused.contains(&record.package) {
                continue;
            }
            issues.push(Issue::unused(&record.package, self.declared.manifest_path()));
        }

        issues.sort_by(|a, b| {
            let key = |issue: &Issue| {
                (
                    issue.code,
                    issue.subject.clone(),
                    issue.location.as_ref().map(|l| l.file.clone()),
                    issue.location.as_ref().and_then(|l| l.line),
                    issue.location.as_ref().and_then(|l| l.column),
                )
            };
            key(a).cmp(&key(b))
        });
        issues
    }

    /// Resolves one module through the bucket-priority rules.
    fn classify_module(
        &self,
        module: &str,
        closure: &BTreeSet<String>,
        matched: &mut BTreeSet<String>,
        issues: &mut Vec<Issue>,
    ) {
        let candidates = self.index.packages_for_module(module);
        let Some(candidates) = candidates.filter(|c| !c.is_empty()) else {
            self.emit_missing(module, issues);
            return;
        };

        // Any declared candidate counts as matched, whichever bucket wins;
        // a sibling candidate of a satisfied module is not "unused".
        for candidate in candidates {
            if self.declared.is_declared(candidate) {
                matched.insert(candidate.clone());
            }
        }

        let main_match = candidates
            .iter()
            .any(|c| self.declared.main_packages().contains(c));
        if main_match {
            return;
        }

        // Tie-break within a bucket: lexicographically smallest package.
        // BTreeSet iteration is ordered, so the first hit is the subject.
        if let Some(package) = candidates
            .iter()
            .find(|c| self.declared.dev_packages().contains(*c))
        {
            if !self.config.ignore_misplaced_dev.contains(package) {
                for occurrence in self.usage.occurrences(module) {
                    issues.push(Issue::misplaced_dev(package, occurrence_location(occurrence)));
                }
            }
            return;
        }

        if let Some(package) = candidates.iter().find(|c| closure.contains(*c)) {
            if !self.config.ignore_transitive.contains(package) {
                for occurrence in self.usage.occurrences(module) {
                    issues.push(Issue::transitive(package, occurrence_location(occurrence)));
                }
            }
            return;
        }

        // Installed but wholly undeclared: same report as unknown
        self.emit_missing(module, issues);
    }

    fn emit_missing(&self, module: &str, issues: &mut Vec<Issue>) {
        if self.config.ignore_missing.contains(module) {
            return;
        }
        for occurrence in self.usage.occurrences(module) {
            issues.push(Issue::missing(module, occurrence_location(occurrence)));
        }
    }
}

fn occurrence_location(occurrence: &ImportOccurrence) -> Location {
    Location {
        file: occurrence.file.clone(),
        line: occurrence.line,
        column: occurrence.column,
    }
}
