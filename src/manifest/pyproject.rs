//! PEP 621 `pyproject.toml` parsing.
//!
//! `[project.dependencies]`, `[project.optional-dependencies]`, and the
//! legacy `[tool.poetry.dependencies]` table declare Main-group packages;
//! `[dependency-groups]` (PEP 735) entries collapse to the Dev group
//! regardless of their names, as do the poetry group tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::requirement::parse_requirement;
use super::ManifestError;
use crate::dependencies::{Group, RawDependency};

#[derive(Debug, Deserialize)]
struct PyprojectToml {
    project: Option<Project>,
    #[serde(rename = "dependency-groups", default)]
    dependency_groups: BTreeMap<String, Vec<toml::Value>>,
    tool: Option<Tool>,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(rename = "optional-dependencies", default)]
    optional_dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Tool {
    poetry: Option<PoetryTool>,
}

#[derive(Debug, Deserialize)]
struct PoetryTool {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default)]
    group: BTreeMap<String, PoetryGroup>,
}

#[derive(Debug, Deserialize)]
struct PoetryGroup {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

/// The declarations extracted from a pyproject file.
#[derive(Debug, Default)]
pub struct PyprojectManifest {
    /// Raw declarations for the canonical model to normalize.
    pub dependencies: Vec<RawDependency>,
    /// The `[project]` name, used to seed the first-party module set.
    pub project_name: Option<String>,
}

/// Parses a `pyproject.toml` file.
pub fn parse_pyproject(path: &Path) -> Result<PyprojectManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_pyproject_str(&content)
}

/// Parses pyproject content from a string.
///
/// # Example
///
/// ```
/// use depscope::manifest::pyproject::parse_pyproject_str;
///
/// let manifest = parse_pyproject_str(r#"
/// [project]
/// name = "my-app"
/// dependencies = ["requests>=2.0"]
///
/// [dependency-groups]
/// test = ["pytest"]
/// "#).unwrap();
///
/// assert_eq!(manifest.dependencies.len(), 2);
/// assert_eq!(manifest.project_name.as_deref(), Some("my-app"));
/// ```
pub fn parse_pyproject_str(content: &str) -> Result<PyprojectManifest, ManifestError> {
    let pyproject: PyprojectToml = toml::from_str(content)?;
    let mut manifest = PyprojectManifest::default();

    if let Some(project) = &pyproject.project {
        manifest.project_name = project.name.clone();

        for spec in &project.dependencies {
            if let Some(req) = parse_requirement(spec) {
                manifest
                    .dependencies
                    .push(RawDependency::with_extras(req.name, Group::Main, req.extras));
            }
        }
        // The project's own extras are still declarations of its packages
        for specs in project.optional_dependencies.values() {
            for spec in specs {
                if let Some(req) = parse_requirement(spec) {
                    manifest
                        .dependencies
                        .push(RawDependency::with_extras(req.name, Group::Main, req.extras));
                }
            }
        }
    }

    // PEP 735 groups: names are arbitrary, all collapse to Dev. Entries
    // may also be {include-group = "..."} tables, which carry no package.
    for specs in pyproject.dependency_groups.values() {
        for value in specs {
            let Some(spec) = value.as_str() else {
                continue;
            };
            if let Some(req) = parse_requirement(spec) {
                manifest
                    .dependencies
                    .push(RawDependency::with_extras(req.name, Group::Dev, req.extras));
            }
        }
    }

    if let Some(poetry) = pyproject.tool.as_ref().and_then(|t| t.poetry.as_ref()) {
        // Legacy poetry manifests declare main dependencies here instead of
        // [project.dependencies]. The `python` entry is an interpreter
        // constraint, not a package.
        for name in poetry.dependencies.keys() {
            if name == "python" {
                continue;
            }
            manifest
                .dependencies
                .push(RawDependency::new(name.clone(), Group::Main));
        }
        for group in poetry.group.values() {
            for name in group.dependencies.keys() {
                if name == "python" {
                    continue;
                }
                manifest
                    .dependencies
                    .push(RawDependency::new(name.clone(), Group::Dev));
            }
        }
    }

    Ok(manifest)
}
