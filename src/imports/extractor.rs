//! Import extraction from Python source using tree-sitter.
//!
//! Walks the syntax tree for `import_statement` and
//! `import_from_statement` nodes and records the top-level module segment
//! of each. Conditional imports (inside `try`/`if TYPE_CHECKING`/function
//! bodies) are ordinary nodes in the tree and are picked up the same way.
//! Relative imports reference the project itself and are skipped.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Node, Parser};

use super::ImportOccurrence;

/// Errors that can occur during import extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    ParseError { path: String },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Extracts top-level import occurrences from Python source.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use depscope::imports::ImportExtractor;
///
/// let mut extractor = ImportExtractor::new().unwrap();
/// let imports = extractor
///     .extract_source("import numpy.linalg\n", Path::new("src/main.py"))
///     .unwrap();
///
/// assert_eq!(imports[0].module, "numpy");
/// assert_eq!(imports[0].line, Some(1));
/// ```
pub struct ImportExtractor {
    parser: Parser,
}

impl ImportExtractor {
    /// Creates an extractor with the Python grammar loaded.
    pub fn new() -> Result<Self, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| ExtractError::LanguageInit)?;
        Ok(Self { parser })
    }

    /// Reads and extracts imports from a `.py` file.
    pub fn extract_file(&mut self, path: &Path) -> Result<Vec<ImportOccurrence>, ExtractError> {
        let source = fs::read_to_string(path)?;
        self.extract_source(&source, path)
    }

    /// Extracts imports from source text, attributing occurrences to
    /// `file`.
    pub fn extract_source(
        &mut self,
        source: &str,
        file: &Path,
    ) -> Result<Vec<ImportOccurrence>, ExtractError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::ParseError {
                path: file.display().to_string(),
            })?;

        let mut imports = Vec::new();
        collect_imports(tree.root_node(), source, file, &mut imports);
        Ok(imports)
    }
}

fn collect_imports(node: Node, source: &str, file: &Path, imports: &mut Vec<ImportOccurrence>) {
    match node.kind() {
        "import_statement" => collect_import_statement(node, source, file, imports),
        "import_from_statement" => collect_from_statement(node, source, file, imports),
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_imports(child, source, file, imports);
            }
        }
    }
}

/// Handles `import x.y, z` and `import x as alias`.
fn collect_import_statement(
    node: Node,
    source: &str,
    file: &Path,
    imports: &mut Vec<ImportOccurrence>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" => push_occurrence(child, source, file, imports),
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    if name.kind() == "dotted_name" {
                        push_occurrence(name, source, file, imports);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Handles `from x.y import z`; `from . import z` is relative and skipped.
fn collect_from_statement(
    node: Node,
    source: &str,
    file: &Path,
    imports: &mut Vec<ImportOccurrence>,
) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    if module.kind() == "dotted_name" {
        push_occurrence(module, source, file, imports);
    }
}

fn push_occurrence(name_node: Node, source: &str, file: &Path, imports: &mut Vec<ImportOccurrence>) {
    let text = name_node.utf8_text(source.as_bytes()).unwrap_or_default();
    let Some(top_level) = text.split('.').next().filter(|s| !s.is_empty()) else {
        return;
    };
    let position = name_node.start_position();
    imports.push(ImportOccurrence::new(
        top_level,
        file,
        position.row + 1,
        position.column,
    ));
}
