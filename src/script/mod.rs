//! SQL script loading and normalization.
//!
//! A script is plain text: `--` lines are comments, statements end with `;`
//! and may span several lines.

mod normalizer;
mod statement;

pub use normalizer::{consolidate, drop_blank_lines, normalize, strip_comments};
pub use statement::{Statement, StatementKind, TERMINATOR};

use crate::error::{Result, ScriptError};
use std::path::Path;
use tracing::info;

/// Reads a script file into its raw lines.
pub fn load_script(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScriptError::io(format!("Failed to read script {}: {e}", path.display()))
    })?;

    Ok(split_lines(&content))
}

/// Splits script text into lines, accepting both `\n` and `\r\n` endings.
pub fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(String::from).collect()
}

/// Loads and normalizes a script file in one step.
pub fn load_statements(path: &Path) -> Result<Vec<Statement>> {
    let statements = normalize(load_script(path)?);
    info!(
        "Loaded {} statements from {}",
        statements.len(),
        path.display()
    );
    Ok(statements)
}
