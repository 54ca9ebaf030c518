//! Import extraction from Jupyter notebooks.
//!
//! A notebook is JSON with a list of cells; only `code` cells contain
//! imports. The code cell sources are concatenated and run through the
//! same tree-sitter extractor as plain source, with occurrences attributed
//! to the notebook file. Line numbers refer to the concatenated code, so
//! they are best-effort for notebooks.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::{ExtractError, ImportExtractor, ImportOccurrence};

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// Notebook tooling writes cell source either as a list of lines or as one
/// string; both shapes appear in the wild.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl CellSource {
    fn into_text(self) -> String {
        match self {
            Self::Lines(lines) => lines.concat(),
            Self::Text(text) => text,
        }
    }
}

/// Extracts import occurrences from all code cells of a notebook.
///
/// An undecodable notebook yields no imports (with a warning) rather than
/// aborting the scan; a malformed notebook in the tree should not hide
/// issues in the rest of the project.
pub fn extract_notebook_imports(
    extractor: &mut ImportExtractor,
    path: &Path,
) -> Result<Vec<ImportOccurrence>, ExtractError> {
    let raw = fs::read_to_string(path)?;
    let notebook: Notebook = match serde_json::from_str(&raw) {
        Ok(notebook) => notebook,
        Err(err) => {
            warn!("skipping undecodable notebook {}: {err}", path.display());
            return Ok(Vec::new());
        }
    };

    let code: String = notebook
        .cells
        .into_iter()
        .filter(|cell| cell.cell_type == "code")
        .map(|cell| {
            let mut text = cell.source.into_text();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        })
        .collect();

    extractor.extract_source(&code, path)
}
