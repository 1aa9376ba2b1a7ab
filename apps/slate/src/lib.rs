//! # Slate
//!
//! Command-line front end for the Slate gating engine.
//!
//! - `cli` - argument parsing, command dispatch, text/JSON rendering
//! - `project` - validated loading of project, metrics and config files

pub mod cli;
pub mod project;
