//! Rendering of query results.
//!
//! Formatters write a whole [`QueryResult`] to an output sink. The default is
//! the fixed-width, tab-separated text table; JSON lines are available for
//! scripting.

mod fixed_width;
mod json;

pub use fixed_width::{FixedWidthFormatter, Overflow, DEFAULT_FIELD_WIDTH};
pub use json::JsonLinesFormatter;

use crate::db::QueryResult;
use crate::error::{Result, ScriptError};
use std::io::Write;

/// Writes a query result to an output sink.
pub trait TableFormatter: Send + Sync {
    /// Renders the whole result.
    fn render(&self, result: &QueryResult, out: &mut dyn Write) -> Result<()>;

    /// Whether the line naming the statement belongs in the same output.
    ///
    /// Machine-readable formats return false so the output stays parseable.
    fn wants_header(&self) -> bool {
        true
    }
}

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed-width text table.
    #[default]
    Table,
    /// One JSON object per row.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: table or json")),
        }
    }
}

/// Checks that every row lines up with the column metadata.
pub(crate) fn check_shape(result: &QueryResult) -> Result<()> {
    if result.row_count != result.rows.len() {
        return Err(ScriptError::render(format!(
            "result reports {} rows but holds {}",
            result.row_count,
            result.rows.len()
        )));
    }

    let expected = result.columns.len();
    for (index, row) in result.rows.iter().enumerate() {
        if row.len() != expected {
            return Err(ScriptError::render(format!(
                "row {} has {} cells, expected {}",
                index + 1,
                row.len(),
                expected
            )));
        }
    }

    Ok(())
}
