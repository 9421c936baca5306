//! Fixed-width, tab-separated text table.

use super::{check_shape, TableFormatter};
use crate::db::QueryResult;
use crate::error::Result;
use std::io::Write;
use tracing::debug;

/// Characters each field is padded to unless configured otherwise.
pub const DEFAULT_FIELD_WIDTH: usize = 15;

/// What happens to text longer than the field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overflow {
    /// Print the full text; later tab stops shift.
    #[default]
    Extend,
    /// Cut the text at the field width.
    Truncate,
}

/// Renders a header row, a dashed separator row and one line per data row.
///
/// Every field is left-justified to the field width and followed by a tab.
/// NULL cells render as empty fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthFormatter {
    field_width: usize,
    overflow: Overflow,
}

impl Default for FixedWidthFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_WIDTH, Overflow::default())
    }
}

impl FixedWidthFormatter {
    pub fn new(field_width: usize, overflow: Overflow) -> Self {
        Self {
            field_width,
            overflow,
        }
    }

    fn field(&self, text: &str) -> String {
        let width = self.field_width;
        match self.overflow {
            Overflow::Extend => format!("{text:<width$}"),
            Overflow::Truncate => format!("{text:<width$.width$}"),
        }
    }

    fn line<I, S>(&self, cells: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for cell in cells {
            line.push_str(&self.field(cell.as_ref()));
            line.push('\t');
        }
        line.push('\n');
        line
    }
}

impl TableFormatter for FixedWidthFormatter {
    fn render(&self, result: &QueryResult, out: &mut dyn Write) -> Result<()> {
        check_shape(result)?;
        debug!(
            "Rendering {} rows x {} columns",
            result.row_count,
            result.columns.len()
        );

        out.write_all(self.line(result.labels()).as_bytes())?;

        // Dashes match the label length, not the field width.
        let underlines = result.labels().map(|label| "-".repeat(label.chars().count()));
        out.write_all(self.line(underlines).as_bytes())?;

        for row in &result.rows {
            let cells = row.iter().map(|value| value.as_cell().unwrap_or_default());
            out.write_all(self.line(cells).as_bytes())?;
        }

        out.flush()?;
        Ok(())
    }
}
