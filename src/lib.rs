//! depscope - dependency usage checker for Python projects
//!
//! This crate analyzes a Python source tree to determine whether its
//! declared third-party dependencies match what the code actually imports,
//! flagging missing, unused, transitive-only, and misplaced-development
//! dependencies.

pub mod analysis;
pub mod config;
pub mod dependencies;
pub mod discovery;
pub mod environment;
pub mod imports;
pub mod manifest;
pub mod report;
pub mod stdlib;
