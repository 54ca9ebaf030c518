//! Minimal PEP 508 requirement-string parsing.
//!
//! Only the pieces the checker needs: the distribution name, any requested
//! extras, and the raw environment marker. Version specifiers are
//! irrelevant to usage classification and are discarded.

use std::collections::BTreeSet;

use regex::Regex;
use std::sync::OnceLock;

/// The parts of a requirement string the checker cares about.
///
/// # Example
///
/// ```
/// use depscope::manifest::requirement::parse_requirement;
///
/// let req = parse_requirement("requests[security] (>=2.0) ; python_version >= '3.9'").unwrap();
/// assert_eq!(req.name, "requests");
/// assert!(req.extras.contains("security"));
/// assert!(req.marker.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequirement {
    /// Distribution name exactly as written (not yet normalized).
    pub name: String,
    /// Extras requested in `name[extra1,extra2]` form.
    pub extras: BTreeSet<String>,
    /// Raw environment marker after `;`, if any.
    pub marker: Option<String>,
}

impl ParsedRequirement {
    /// Returns the extra name if the marker conditions this requirement on
    /// an extra (`extra == "foo"`), as `Requires-Dist` metadata does.
    pub fn extra_condition(&self) -> Option<String> {
        static EXTRA_RE: OnceLock<Regex> = OnceLock::new();
        let re = EXTRA_RE
            .get_or_init(|| Regex::new(r#"extra\s*==\s*["']([^"']+)["']"#).expect("valid regex"));
        self.marker
            .as_deref()
            .and_then(|marker| re.captures(marker))
            .map(|caps| caps[1].to_string())
    }
}

/// Parses a single requirement string.
///
/// Returns `None` for lines that are not requirements: empty strings,
/// pip options (`-r`, `--index-url`), and direct URL references.
pub fn parse_requirement(line: &str) -> Option<ParsedRequirement> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('-') || line.starts_with('#') {
        return None;
    }
    // Direct references ("name @ https://...") keep their name; bare URLs
    // and local paths have none to extract.
    if line.contains("://") && !line.contains('@') {
        return None;
    }

    let (spec, marker) = match line.split_once(';') {
        Some((spec, marker)) => (spec.trim(), Some(marker.trim().to_string())),
        None => (line, None),
    };

    let name_end = spec
        .find(|c: char| matches!(c, '[' | ' ' | '(' | '<' | '>' | '=' | '!' | '~' | '@'))
        .unwrap_or(spec.len());
    let name = spec[..name_end].trim();
    if name.is_empty() {
        return None;
    }

    let mut extras = BTreeSet::new();
    if let Some(open) = spec.find('[') {
        if let Some(close) = spec[open..].find(']') {
            for extra in spec[open + 1..open + close].split(',') {
                let extra = extra.trim();
                if !extra.is_empty() {
                    extras.insert(extra.to_string());
                }
            }
        }
    }

    Some(ParsedRequirement {
        name: name.to_string(),
        extras,
        marker,
    })
}
