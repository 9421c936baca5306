//! Database abstraction layer for pgscript.
//!
//! The script pipeline only sees the [`DatabaseClient`] trait, so the
//! PostgreSQL driver can be swapped for the in-memory mock in tests.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{ColumnInfo, ExecutionOutcome, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::script::Statement;
use async_trait::async_trait;

/// Opens a connection for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Capability to run SQL against a live connection.
///
/// Queries come back as [`ExecutionOutcome::Rows`], everything else as
/// [`ExecutionOutcome::Affected`].
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes one statement.
    async fn execute(&self, statement: &Statement) -> Result<ExecutionOutcome>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
