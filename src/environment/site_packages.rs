//! Builds an [`InstalledIndex`] by scanning a `site-packages` directory.
//!
//! Each installed distribution leaves a `*.dist-info` directory behind:
//! `METADATA` carries the distribution name and its `Requires-Dist`
//! entries, `top_level.txt` lists the import-level modules it provides,
//! and `RECORD` lists every installed file. A distribution with an
//! unreadable record is skipped with a warning; one bad package never
//! aborts the index build.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use super::InstalledIndex;
use crate::dependencies::normalize_package_name;
use crate::manifest::requirement::parse_requirement;

/// Errors that can occur while scanning a site-packages directory.
///
/// Only the directory itself being unreadable is fatal; individual
/// distributions degrade to being skipped.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The site-packages directory could not be read at all.
    #[error("failed to read site-packages directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata extracted from one `*.dist-info` directory.
#[derive(Debug)]
struct Distribution {
    name: String,
    modules: Vec<String>,
    /// Unconditional direct requirements.
    requires: Vec<String>,
    /// Requirements conditioned on one of this distribution's extras.
    extra_requires: Vec<(String, String)>,
}

/// Scans `site_packages` and builds the index of installed distributions.
///
/// # Example
///
/// ```ignore
/// use depscope::environment::index_from_site_packages;
/// use std::path::Path;
///
/// let index = index_from_site_packages(Path::new(".venv/lib/python3.12/site-packages"))?;
/// println!("{} distributions indexed", index.package_count());
/// ```
pub fn index_from_site_packages(site_packages: &Path) -> Result<InstalledIndex, EnvironmentError> {
    let mut index = InstalledIndex::new();

    for entry in fs::read_dir(site_packages)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable site-packages entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        let is_dist_info = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".dist-info"));
        if !is_dist_info {
            continue;
        }

        match read_distribution(&path) {
            Some(dist) => {
                let modules: Vec<&str> = dist.modules.iter().map(String::as_str).collect();
                let requires: Vec<&str> = dist.requires.iter().map(String::as_str).collect();
                index.add_package(&dist.name, &modules, &requires);
                for (extra, dep) in &dist.extra_requires {
                    index.add_extra_dependency(&dist.name, extra, dep);
                }
            }
            None => {
                warn!("skipping corrupt distribution record: {}", path.display());
            }
        }
    }

    debug!(
        "indexed {} distributions providing {} modules",
        index.package_count(),
        index.module_count()
    );
    Ok(index)
}

/// Locates a site-packages directory inside a project-local virtual
/// environment (`.venv` or `venv`).
///
/// Handles both the POSIX layout (`lib/pythonX.Y/site-packages`) and the
/// Windows layout (`Lib/site-packages`).
pub fn find_site_packages(project_root: &Path) -> Option<std::path::PathBuf> {
    for venv in [".venv", "venv"] {
        let venv_dir = project_root.join(venv);

        let windows = venv_dir.join("Lib").join("site-packages");
        if windows.is_dir() {
            return Some(windows);
        }

        let lib = venv_dir.join("lib");
        let Ok(entries) = fs::read_dir(&lib) else {
            continue;
        };
        for entry in entries.flatten() {
            let candidate = entry.path().join("site-packages");
            let is_python_dir = entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.starts_with("python"));
            if is_python_dir && candidate.is_dir() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Reads one distribution's metadata. Returns `None` when the record is
/// too corrupt to use.
fn read_distribution(dist_info: &Path) -> Option<Distribution> {
    let metadata = fs::read_to_string(dist_info.join("METADATA")).ok()?;

    let name = metadata
        .lines()
        .find_map(|line| line.strip_prefix("Name: "))
        .map(|name| name.trim().to_string())
        .or_else(|| name_from_dir(dist_info))?;

    let mut requires = Vec::new();
    let mut extra_requires = Vec::new();
    for line in metadata.lines() {
        // Headers end at the first blank line; the body is the description
        if line.is_empty() {
            break;
        }
        let Some(spec) = line.strip_prefix("Requires-Dist: ") else {
            continue;
        };
        let Some(req) = parse_requirement(spec) else {
            continue;
        };
        match req.extra_condition() {
            Some(extra) => extra_requires.push((extra, req.name)),
            None => requires.push(req.name),
        }
    }

    Some(Distribution {
        modules: provided_modules(dist_info, &name),
        name,
        requires,
        extra_requires,
    })
}

/// Derives the distribution name from a `name-version.dist-info` directory
/// name when METADATA lacks one.
fn name_from_dir(dist_info: &Path) -> Option<String> {
    let dir_name = dist_info.file_name()?.to_str()?;
    let stem = dir_name.strip_suffix(".dist-info")?;
    Some(stem.split('-').next()?.to_string())
}

/// Determines the import-level modules a distribution provides.
///
/// Preference order: `top_level.txt`, then top-level entries in `RECORD`,
/// then the normalized distribution name with `-` replaced by `_`
/// (best-effort, per the metadata spec most single-module distributions
/// follow that convention).
fn provided_modules(dist_info: &Path, name: &str) -> Vec<String> {
    if let Ok(top_level) = fs::read_to_string(dist_info.join("top_level.txt")) {
        let modules: Vec<String> = top_level
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        if !modules.is_empty() {
            return modules;
        }
    }

    if let Ok(record) = fs::read_to_string(dist_info.join("RECORD")) {
        let modules = modules_from_record(&record);
        if !modules.is_empty() {
            return modules;
        }
    }

    vec![normalize_package_name(name).replace('-', "_")]
}

/// Extracts top-level module names from a RECORD file: the first path
/// segment of each installed `.py` file, or the file stem for single-file
/// modules.
fn modules_from_record(record: &str) -> Vec<String> {
    let mut modules = BTreeSet::new();

    for line in record.lines() {
        let path = line.split(',').next().unwrap_or_default();
        if path.starts_with("..") || path.contains(".dist-info/") {
            continue;
        }
        match path.split_once('/') {
            Some((top, rest)) => {
                if rest.ends_with(".py") || rest.contains('/') {
                    modules.insert(top.to_string());
                }
            }
            None => {
                if let Some(stem) = path.strip_suffix(".py") {
                    modules.insert(stem.to_string());
                }
            }
        }
    }

    modules.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_dist_info(
        site_packages: &Path,
        dir: &str,
        metadata: &str,
        top_level: Option<&str>,
    ) -> std::path::PathBuf {
        let dist_info = site_packages.join(dir);
        fs::create_dir_all(&dist_info).unwrap();
        fs::write(dist_info.join("METADATA"), metadata).unwrap();
        if let Some(top_level) = top_level {
            fs::write(dist_info.join("top_level.txt"), top_level).unwrap();
        }
        dist_info
    }

    #[test]
    fn test_index_from_site_packages() {
        let tmp = TempDir::new().unwrap();
        write_dist_info(
            tmp.path(),
            "opencv_python-4.9.0.dist-info",
            "Metadata-Version: 2.1\nName: opencv-python\nRequires-Dist: numpy (>=1.21)\n",
            Some("cv2\n"),
        );
        write_dist_info(
            tmp.path(),
            "numpy-1.26.4.dist-info",
            "Metadata-Version: 2.1\nName: numpy\n",
            Some("numpy\n"),
        );

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert_eq!(index.package_count(), 2);
        assert!(index
            .packages_for_module("cv2")
            .unwrap()
            .contains("opencv-python"));
        assert_eq!(index.direct_dependencies("opencv-python"), vec!["numpy"]);
    }

    #[test]
    fn test_extra_conditioned_requirements_kept_separate() {
        let tmp = TempDir::new().unwrap();
        write_dist_info(
            tmp.path(),
            "uvicorn-0.29.0.dist-info",
            concat!(
                "Metadata-Version: 2.1\n",
                "Name: uvicorn\n",
                "Requires-Dist: click >=7.0\n",
                "Requires-Dist: watchfiles >=0.13 ; extra == 'standard'\n",
            ),
            Some("uvicorn\n"),
        );

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert_eq!(index.direct_dependencies("uvicorn"), vec!["click"]);
        assert_eq!(
            index.extra_dependencies("uvicorn", "standard"),
            vec!["watchfiles"]
        );
    }

    #[test]
    fn test_missing_top_level_falls_back_to_record() {
        let tmp = TempDir::new().unwrap();
        let dist_info = write_dist_info(
            tmp.path(),
            "attrs-23.2.0.dist-info",
            "Metadata-Version: 2.1\nName: attrs\n",
            None,
        );
        fs::write(
            dist_info.join("RECORD"),
            "attr/__init__.py,sha256=abc,123\nattrs/__init__.py,sha256=def,456\nattrs-23.2.0.dist-info/METADATA,,\n",
        )
        .unwrap();

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert!(index.packages_for_module("attr").unwrap().contains("attrs"));
        assert!(index.packages_for_module("attrs").unwrap().contains("attrs"));
    }

    #[test]
    fn test_missing_everything_falls_back_to_package_name() {
        let tmp = TempDir::new().unwrap();
        write_dist_info(
            tmp.path(),
            "typing_extensions-4.11.0.dist-info",
            "Metadata-Version: 2.1\nName: typing_extensions\n",
            None,
        );

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert!(index
            .packages_for_module("typing_extensions")
            .unwrap()
            .contains("typing-extensions"));
    }

    #[test]
    fn test_corrupt_distribution_is_skipped() {
        let tmp = TempDir::new().unwrap();
        // dist-info directory without METADATA at all
        fs::create_dir_all(tmp.path().join("broken-1.0.dist-info")).unwrap();
        write_dist_info(
            tmp.path(),
            "requests-2.31.0.dist-info",
            "Metadata-Version: 2.1\nName: requests\n",
            Some("requests\n"),
        );

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert_eq!(index.package_count(), 1);
        assert!(index.contains_package("requests"));
    }

    #[test]
    fn test_non_dist_info_entries_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("numpy")).unwrap();
        fs::write(tmp.path().join("six.py"), "").unwrap();

        let index = index_from_site_packages(tmp.path()).unwrap();
        assert_eq!(index.package_count(), 0);
    }

    #[test]
    fn test_find_site_packages_posix_layout() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join(".venv/lib/python3.12/site-packages");
        fs::create_dir_all(&site).unwrap();

        assert_eq!(find_site_packages(tmp.path()), Some(site));
    }

    #[test]
    fn test_find_site_packages_windows_layout() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("venv/Lib/site-packages");
        fs::create_dir_all(&site).unwrap();

        assert_eq!(find_site_packages(tmp.path()), Some(site));
    }

    #[test]
    fn test_find_site_packages_absent() {
        let tmp = TempDir::new().unwrap();
        assert!(find_site_packages(tmp.path()).is_none());
    }

    #[test]
    fn test_name_from_dir() {
        assert_eq!(
            name_from_dir(Path::new("requests-2.31.0.dist-info")).as_deref(),
            Some("requests")
        );
        assert!(name_from_dir(Path::new("requests")).is_none());
    }

    #[test]
    fn test_modules_from_record_skips_metadata_paths() {
        let record = "pkg/__init__.py,,\npkg/sub/mod.py,,\npkg-1.0.dist-info/RECORD,,\nsix.py,,\n";
        assert_eq!(modules_from_record(record), vec!["pkg", "six"]);
    }
}
