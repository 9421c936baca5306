//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, ExecutionOutcome, QueryResult, Row, Value};
use crate::error::{Result, ScriptError};
use crate::script::{Statement, StatementKind};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgValueRef};
use sqlx::{Column as _, Connection as _, Executor as _, Row as _, TypeInfo, ValueRef as _};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL database client.
///
/// Holds a pool capped at one connection, so statements run one after another
/// on the same session.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Creates a new PostgresClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the given configuration, retrying transient failures.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let options = connect_options(config);

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(config.login_timeout)
                .connect_with(options.clone())
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                        last_error = Some(e);
                    } else {
                        return Err(map_connection_error(e, config));
                    }
                }
            }
        }

        Err(match last_error {
            Some(e) => map_connection_error(e, config),
            None => ScriptError::connection("No connection attempt was made"),
        })
    }

    // Statements go over the simple query protocol: nothing is prepared or
    // cached per SQL text, and every cell arrives in the server's text form.
    async fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let result = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ScriptError::statement(format_query_error(e)))?;

        let execution_time = start.elapsed();

        // Column metadata comes from the first row; an empty result needs a
        // description from the server instead.
        let columns = match result.first() {
            Some(first_row) => column_info(first_row),
            None => self.describe_columns(sql).await,
        };

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn run_command(&self, sql: &str) -> Result<u64> {
        let done = sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| ScriptError::statement(format_query_error(e)))?;

        Ok(done.rows_affected())
    }

    /// Fetches column metadata for a query by preparing it.
    ///
    /// The prepared statement is discarded afterwards so a later schema change
    /// never sees stale labels. Best effort: a failure leaves the result
    /// without column labels.
    async fn describe_columns(&self, sql: &str) -> Vec<ColumnInfo> {
        use sqlx::Statement as _;

        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                debug!("Could not acquire connection to describe columns: {e}");
                return Vec::new();
            }
        };

        let columns = match (&mut *conn).prepare(sql).await {
            Ok(prepared) => prepared
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            Err(e) => {
                debug!("Could not describe columns of empty result: {e}");
                Vec::new()
            }
        };

        if let Err(e) = conn.clear_cached_statements().await {
            debug!("Could not release described statement: {e}");
        }

        columns
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute(&self, statement: &Statement) -> Result<ExecutionOutcome> {
        match statement.kind() {
            StatementKind::Query => self
                .run_query(statement.sql())
                .await
                .map(ExecutionOutcome::Rows),
            StatementKind::Command => self
                .run_command(statement.sql())
                .await
                .map(ExecutionOutcome::Affected),
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Builds driver options from the connection config.
///
/// A missing password is sent as the empty string.
fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .port(config.port)
        .password(config.password_or_empty());

    if let Some(host) = &config.host {
        options = options.host(host);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    if let Some(user) = &config.user {
        options = options.username(user);
    }

    options
}

fn column_info(row: &PgRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| match row.try_get_raw(i) {
            Ok(raw) => convert_value(raw, col.type_info().name()),
            Err(e) => {
                debug!("Column {} missing from row: {}", i, e);
                Value::Null
            }
        })
        .collect()
}

/// Converts one text-format cell to our Value type.
///
/// The server's text is kept as is. Booleans and integers are typed so JSON
/// output can carry them natively; their cell text is unchanged by that.
fn convert_value(raw: PgValueRef<'_>, type_name: &str) -> Value {
    if raw.is_null() {
        return Value::Null;
    }

    let text = match raw.as_str() {
        Ok(text) => text,
        Err(e) => {
            debug!("Cell of type {} is not valid text: {}", type_name, e);
            let bytes = raw.as_bytes().unwrap_or_default();
            return Value::String(String::from_utf8_lossy(bytes).into_owned());
        }
    };

    typed_value(text, type_name)
}

fn typed_value(text: &str, type_name: &str) -> Value {
    let typed = match type_name {
        "BOOL" => match text {
            "t" => Some(Value::Bool(true)),
            "f" => Some(Value::Bool(false)),
            _ => None,
        },
        "INT2" | "INT4" | "INT8" => text.parse::<i64>().ok().map(Value::Int),
        _ => None,
    };

    typed.unwrap_or_else(|| Value::String(text.to_string()))
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    // Authentication and database-not-found errors are not transient
    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ScriptError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ScriptError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ScriptError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ScriptError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ScriptError::connection(format!(
            "Connection to {host}:{port} timed out after {:?}.",
            config.login_timeout
        ))
    } else {
        ScriptError::connection(error.to_string())
    }
}

/// Formats a statement error with the server's detail and hint, if any.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }

        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }

        if let Some(constraint) = pg_error.constraint() {
            result.push_str("\n  CONSTRAINT: ");
            result.push_str(constraint);
        }
    }

    result
}
