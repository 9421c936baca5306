//! Turns raw script lines into executable statements.
//!
//! Three filters run in order: whole-line comment removal, empty-line removal,
//! and joining of multi-line statements. Each takes and returns an ordered list
//! so they can be tested and reasoned about on their own.

use super::statement::{Statement, TERMINATOR};
use tracing::{debug, warn};

/// Prefix of a whole-line SQL comment.
const COMMENT_PREFIX: &str = "--";

/// Normalizes raw script lines into the statements to execute, in source order.
pub fn normalize(lines: Vec<String>) -> Vec<Statement> {
    let total = lines.len();
    let statements = consolidate(drop_blank_lines(strip_comments(lines)));
    debug!(
        "Normalized {} script lines into {} statements",
        total,
        statements.len()
    );
    statements
}

/// Drops every line that starts with `--`.
///
/// Only the raw line start is checked: indented comments and trailing
/// comments are left in place.
pub fn strip_comments(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !line.starts_with(COMMENT_PREFIX))
        .collect()
}

/// Drops empty lines. Whitespace-only lines are kept.
pub fn drop_blank_lines(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().filter(|line| !line.is_empty()).collect()
}

/// Joins lines with `\n` until one ends with the terminator.
///
/// Content after the last terminator never forms a statement and is dropped.
pub fn consolidate(lines: Vec<String>) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut pending = String::new();

    for line in lines {
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(&line);

        if line.ends_with(TERMINATOR) {
            statements.push(Statement::new(std::mem::take(&mut pending)));
        }
    }

    if !pending.is_empty() {
        warn!("Dropping unterminated statement at end of script: {pending}");
    }

    statements
}
