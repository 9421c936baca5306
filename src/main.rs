//! pgscript - run a SQL script against PostgreSQL and print query results.

use pgscript::app;
use pgscript::cli::Cli;
use pgscript::logging;
use tracing::{error, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine; PG* variables may come from the shell.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    match app::run(&cli).await {
        Ok(summary) if !summary.is_clean() => {
            warn!(
                "{} of {} statements failed",
                summary.failures, summary.statements
            );
        }
        Ok(_) => {}
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}
