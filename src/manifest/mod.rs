//! Manifest parsing.
//!
//! Each supported dialect produces raw `(name, group, extras)` records;
//! the canonical model in [`crate::dependencies`] treats them all
//! uniformly after that. Supported dialects:
//!
//! - **pyproject.toml** (PEP 621 project table, PEP 735 dependency
//!   groups, poetry group tables)
//! - **requirements.txt** (plus `requirements-dev.txt` /
//!   `dev-requirements.txt` as the Dev group)

pub mod pyproject;
pub mod requirement;
pub mod requirements;

pub use pyproject::{parse_pyproject, parse_pyproject_str, PyprojectManifest};
pub use requirements::{parse_requirements, parse_requirements_str};

use std::path::{Path, PathBuf};

use crate::dependencies::{Group, RawDependency};

/// Errors that can occur during manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the manifest from disk.
    #[error("Failed to read manifest: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content.
    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// No supported manifest was found in the project.
    #[error("No dependency manifest found in {0} (expected pyproject.toml or requirements.txt)")]
    NoManifest(PathBuf),
}

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A project's declared dependencies in raw form, with provenance.
#[derive(Debug)]
pub struct ProjectManifest {
    /// Raw declarations across all manifest files found.
    pub dependencies: Vec<RawDependency>,
    /// Normalizable project name, when the manifest states one.
    pub project_name: Option<String>,
    /// The primary manifest file; unused-dependency issues point here.
    pub path: PathBuf,
}

/// Dev-group requirements files recognized next to `requirements.txt`.
const DEV_REQUIREMENTS_FILES: &[&str] = &["requirements-dev.txt", "dev-requirements.txt"];

/// Locates and parses the project's manifest(s).
///
/// `pyproject.toml` wins when present; otherwise `requirements.txt` is
/// the Main group and any recognized dev requirements file contributes
/// the Dev group.
pub fn load_project_manifest(project_root: &Path) -> ManifestResult<ProjectManifest> {
    let pyproject_path = project_root.join("pyproject.toml");
    if pyproject_path.is_file() {
        let manifest = parse_pyproject(&pyproject_path)?;
        return Ok(ProjectManifest {
            dependencies: manifest.dependencies,
            project_name: manifest.project_name,
            path: pyproject_path,
        });
    }

    let requirements_path = project_root.join("requirements.txt");
    if requirements_path.is_file() {
        let mut dependencies = parse_requirements(&requirements_path, Group::Main)?;
        for dev_file in DEV_REQUIREMENTS_FILES {
            let dev_path = project_root.join(dev_file);
            if dev_path.is_file() {
                dependencies.extend(parse_requirements(&dev_path, Group::Dev)?);
            }
        }
        return Ok(ProjectManifest {
            dependencies,
            project_name: None,
            path: requirements_path,
        });
    }

    Err(ManifestError::NoManifest(project_root.to_path_buf()))
}
