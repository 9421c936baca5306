//! Sequential statement execution.
//!
//! Runs each statement in script order. Query results go to the formatter;
//! commands only run for their side effects. A failing statement is logged and
//! the run moves on to the next one.

use std::io::Write;

use crossterm::style::Stylize;
use tracing::{debug, error, info};

use crate::db::{DatabaseClient, ExecutionOutcome, QueryResult};
use crate::error::Result;
use crate::render::TableFormatter;
use crate::script::Statement;

/// Counters for one pass over a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Statements attempted.
    pub statements: usize,
    /// Query results written to the output.
    pub queries: usize,
    /// Commands that ran successfully.
    pub commands: usize,
    /// Rows reported as affected by commands.
    pub rows_affected: u64,
    /// Statements that failed to execute or render.
    pub failures: usize,
}

impl RunSummary {
    /// Returns true if every statement succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Executes statements against a database and renders query results.
pub struct ScriptExecutor<'a> {
    db: &'a dyn DatabaseClient,
    formatter: &'a dyn TableFormatter,
    color: bool,
}

impl<'a> ScriptExecutor<'a> {
    /// Creates a new script executor.
    pub fn new(db: &'a dyn DatabaseClient, formatter: &'a dyn TableFormatter) -> Self {
        Self {
            db,
            formatter,
            color: false,
        }
    }

    /// Highlights the line that introduces each result.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs every statement in order, writing query results to `out`.
    ///
    /// Never stops early: failures are logged and counted in the summary.
    pub async fn run(&self, statements: &[Statement], out: &mut dyn Write) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, statement) in statements.iter().enumerate() {
            summary.statements += 1;
            debug!(
                "Executing statement {} of {}: {}",
                index + 1,
                statements.len(),
                statement
            );

            let outcome = match self.db.execute(statement).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("{}: {}\n  in statement: {}", e.category(), e, statement);
                    summary.failures += 1;
                    continue;
                }
            };

            match outcome {
                ExecutionOutcome::Rows(result) => {
                    match self.write_result(statement, &result, out) {
                        Ok(()) => summary.queries += 1,
                        Err(e) => {
                            error!("{}: {}\n  in statement: {}", e.category(), e, statement);
                            summary.failures += 1;
                        }
                    }
                }
                ExecutionOutcome::Affected(rows) => {
                    debug!("Statement affected {} rows", rows);
                    summary.commands += 1;
                    summary.rows_affected += rows;
                }
            }
        }

        info!(
            "Ran {} statements: {} queries, {} commands ({} rows affected), {} failed",
            summary.statements,
            summary.queries,
            summary.commands,
            summary.rows_affected,
            summary.failures
        );
        summary
    }

    /// Renders into a buffer first so a render failure prints nothing at all.
    fn write_result(
        &self,
        statement: &Statement,
        result: &QueryResult,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut table = Vec::new();
        self.formatter.render(result, &mut table)?;

        if self.formatter.wants_header() {
            let header = self.header(statement);
            writeln!(out, "{header}")?;
            writeln!(out)?;
        } else {
            info!("SQL statement: {statement} produces the following result:");
        }
        out.write_all(&table)?;
        out.flush()?;

        debug!(
            "Rendered {} rows in {:?}",
            result.row_count, result.execution_time
        );
        Ok(())
    }

    fn header(&self, statement: &Statement) -> String {
        let text = format!("SQL statement: {statement} produces the following result:");
        if self.color {
            text.yellow().to_string()
        } else {
            text
        }
    }
}
