//! Top-level run of a script: resolve the connection, load the script,
//! execute it and release the connection.

use std::io::{IsTerminal, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::{Config, ConnectionConfig};
use crate::db::{self, DatabaseClient};
use crate::error::{Result, ScriptError};
use crate::query::{RunSummary, ScriptExecutor};
use crate::render::{FixedWidthFormatter, JsonLinesFormatter, OutputFormat, TableFormatter};
use crate::script::{self, Statement};

/// Runs the script named on the command line, printing results to stdout.
///
/// Only configuration, connection and script-loading failures are returned;
/// statement failures are logged and counted in the summary.
pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let connection = resolve_connection(cli.database_url.as_deref(), &cli.config_path())?;
    let format = cli.parse_output_format().map_err(ScriptError::config)?;
    let formatter = build_formatter(format, cli);
    let statements = script::load_statements(&cli.script)?;

    info!("Connecting to {}", connection.display_string());
    let client = db::connect(&connection).await?;

    let color = !cli.no_color && format == OutputFormat::Table && std::io::stdout().is_terminal();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    Ok(execute_script(&*client, &statements, &*formatter, color, &mut out).await)
}

/// Builds the connection config.
///
/// A connection string wins over the config file. Environment variables fill
/// in whatever is still missing.
pub fn resolve_connection(
    database_url: Option<&str>,
    config_path: &Path,
) -> Result<ConnectionConfig> {
    let mut connection = match database_url {
        Some(url) => {
            info!("Using connection string from command line or environment");
            ConnectionConfig::from_connection_string(url)?
        }
        None => {
            info!("Loading config from: {}", config_path.display());
            ConnectionConfig::from_config(&Config::load_from_file(config_path)?)?
        }
    };

    connection.apply_env_defaults();
    connection.validate()?;
    Ok(connection)
}

/// Builds the formatter for the chosen output format.
pub fn build_formatter(format: OutputFormat, cli: &Cli) -> Box<dyn TableFormatter> {
    match format {
        OutputFormat::Table => Box::new(FixedWidthFormatter::new(
            usize::from(cli.field_width),
            cli.overflow(),
        )),
        OutputFormat::Json => Box::new(JsonLinesFormatter),
    }
}

/// Executes all statements, then closes the connection whatever happened.
pub async fn execute_script(
    db: &dyn DatabaseClient,
    statements: &[Statement],
    formatter: &dyn TableFormatter,
    color: bool,
    out: &mut dyn Write,
) -> RunSummary {
    let summary = ScriptExecutor::new(db, formatter)
        .with_color(color)
        .run(statements, out)
        .await;

    if let Err(e) = db.close().await {
        warn!("Failed to close connection: {e}");
    }

    summary
}
