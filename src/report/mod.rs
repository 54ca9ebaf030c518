//! Rendering of classification results.
//!
//! Reporters consume the ordered issue list and write it out; the issue
//! shape itself is the stable contract, the renderers only change the
//! framing. Two formats: human-readable text and machine-readable JSON.

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use std::io::{self, Write};

use crate::analysis::Issue;

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Line-per-issue text for terminals.
    Text,
    /// JSON array, full issue data.
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Unknown report format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Common interface for all reporters.
pub trait Reporter {
    /// Renders the issue list to the given writer.
    fn render(&self, issues: &[Issue], writer: &mut dyn Write) -> io::Result<()>;
}

/// Renders issues in the requested format.
pub fn render(format: ReportFormat, issues: &[Issue], writer: &mut dyn Write) -> io::Result<()> {
    match format {
        ReportFormat::Text => TextReporter.render(issues, writer),
        ReportFormat::Json => JsonReporter.render(issues, writer),
    }
}
