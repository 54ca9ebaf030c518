//! JSON report implementation.
//!
//! Emits the issue list as a JSON array for machine consumption. The
//! field names (`code`, `message`, `module_or_package`, `location`) are a
//! stable contract; renaming them breaks downstream tooling.

use std::io::{self, Write};

use serde::Serialize;

use super::Reporter;
use crate::analysis::Issue;

/// JSON reporter implementation.
pub struct JsonReporter;

/// Serializable issue for JSON output.
#[derive(Serialize)]
struct JsonIssue<'a> {
    code: &'static str,
    message: &'a str,
    module_or_package: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation>,
}

/// Serializable location for JSON output.
#[derive(Serialize)]
struct JsonLocation {
    file: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl Reporter for JsonReporter {
    fn render(&self, issues: &[Issue], writer: &mut dyn Write) -> io::Result<()> {
        let entries: Vec<JsonIssue> = issues
            .iter()
            .map(|issue| JsonIssue {
                code: issue.code.as_str(),
                message: &issue.message,
                module_or_package: &issue.subject,
                location: issue.location.as_ref().map(|location| JsonLocation {
                    file: location.file.display().to_string(),
                    line: location.line,
                    column: location.column,
                }),
            })
            .collect();

        serde_json::to_writer_pretty(&mut *writer, &entries)?;
        writeln!(writer)?;
        Ok(())
    }
}
