//! JSON lines output, one object per row.

use super::{check_shape, TableFormatter};
use crate::db::{QueryResult, Value};
use crate::error::{Result, ScriptError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;

/// A row as a JSON object keyed by column label, in column order.
struct JsonRow<'a> {
    labels: &'a [&'a str],
    cells: &'a [Value],
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (label, cell) in self.labels.iter().zip(self.cells) {
            map.serialize_entry(label, cell)?;
        }
        map.end()
    }
}

/// Writes each row as a single-line JSON object.
///
/// NULL cells become JSON `null`. An empty result writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesFormatter;

impl TableFormatter for JsonLinesFormatter {
    fn render(&self, result: &QueryResult, out: &mut dyn Write) -> Result<()> {
        check_shape(result)?;

        let labels: Vec<&str> = result.labels().collect();
        for row in &result.rows {
            let line = JsonRow {
                labels: &labels,
                cells: row,
            };
            serde_json::to_writer(&mut *out, &line)
                .map_err(|e| ScriptError::render(format!("Failed to serialize row: {e}")))?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    fn wants_header(&self) -> bool {
        false
    }
}
