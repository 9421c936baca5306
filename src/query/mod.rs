//! Script execution.
//!
//! This module runs normalized statements in order and routes query results
//! to the formatter.

pub mod executor;

pub use executor::{RunSummary, ScriptExecutor};
