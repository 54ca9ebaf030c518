//! Dependency usage classification.
//!
//! This module is the heart of the checker: given the aggregated usage
//! map, the declared-dependency model, the installed-distribution index,
//! and the first-party module set, it applies a deterministic rule set and
//! produces typed, located issues.
//!
//! # Rules
//!
//! - **DEP001** — module imported but not provided by any declared package
//! - **DEP002** — package declared but never imported
//! - **DEP003** — module satisfied only by a transitive dependency
//! - **DEP004** — main-code import satisfied only by a Dev declaration
//!
//! # Example
//!
//! ```ignore
//! use depscope::analysis::Classifier;
//!
//! let classifier = Classifier::new(&usage, &declared, &index, first_party, version, &config);
//! for issue in classifier.classify() {
//!     println!("{issue}");
//! }
//! ```

mod engine;
mod issues;

pub use engine::Classifier;
pub use issues::{Issue, IssueCode, Location};
