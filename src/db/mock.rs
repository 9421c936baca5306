//! Mock database clients for testing.
//!
//! Provides in-memory implementations that record what they were asked to run.

use super::{ColumnInfo, DatabaseClient, ExecutionOutcome, QueryResult, Value};
use crate::error::{Result, ScriptError};
use crate::script::{Statement, StatementKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A mock database client that returns predefined results.
///
/// Queries without a registered result get a one-cell echo of their SQL.
/// Commands report one affected row.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    results: HashMap<String, QueryResult>,
    failures: HashMap<String, String>,
    executed: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with no registered results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the result returned for an exact SQL text.
    pub fn with_result(mut self, sql: impl Into<String>, result: QueryResult) -> Self {
        self.results.insert(sql.into(), result);
        self
    }

    /// Makes the given SQL text fail with a statement error.
    pub fn with_failure(mut self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(sql.into(), message.into());
        self
    }

    /// Returns the SQL of every statement executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str) {
        if let Ok(mut log) = self.executed.lock() {
            log.push(sql.to_string());
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute(&self, statement: &Statement) -> Result<ExecutionOutcome> {
        let sql = statement.sql();
        self.record(sql);

        if let Some(message) = self.failures.get(sql) {
            return Err(ScriptError::statement(message.clone()));
        }

        match statement.kind() {
            StatementKind::Query => {
                let result = self.results.get(sql).cloned().unwrap_or_else(|| {
                    QueryResult::with_data(
                        vec![ColumnInfo::new("result", "text")],
                        vec![vec![Value::String(format!("Mock result for: {sql}"))]],
                    )
                });
                Ok(ExecutionOutcome::Rows(result))
            }
            StatementKind::Command => Ok(ExecutionOutcome::Affected(1)),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A database client whose statements always fail.
#[derive(Debug, Default)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that fails every statement with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute(&self, _statement: &Statement) -> Result<ExecutionOutcome> {
        Err(ScriptError::statement(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
