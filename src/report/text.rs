//! Text report implementation.
//!
//! One line per issue in `file:line:col: CODE message` form, followed by a
//! count summary. Matches what editors and CI logs expect from a linter.

use std::io::{self, Write};

use super::Reporter;
use crate::analysis::Issue;

/// Text reporter implementation.
pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, issues: &[Issue], writer: &mut dyn Write) -> io::Result<()> {
        for issue in issues {
            writeln!(writer, "{issue}")?;
        }

        if issues.is_empty() {
            writeln!(writer, "Success! No dependency issues found.")?;
        } else {
            writeln!(writer)?;
            writeln!(
                writer,
                "Found {} dependency issue{}.",
                issues.len(),
                if issues.len() == 1 { "" } else { "s" }
            )?;
        }
        Ok(())
    }
}
