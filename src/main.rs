mod shell;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eye_clinic::config::AppConfig;
use eye_clinic::logging::{init_logging, OperationTimer};
use eye_clinic::{ClinicService, Database, Navigator, QueryOutcome};
use rusqlite::types::Value;
use tracing::{error, info};

use crate::shell::Shell;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the clinic database and its tables
    Init,
    /// Start an interactive session
    Shell,
    /// Run one SQL statement against the clinic database
    Query {
        /// Statement to run, with ?1, ?2... placeholders
        #[arg(short, long)]
        sql: String,

        /// Positional parameter values
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Treat the statement as a write and report affected rows
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.file_path.as_deref().map(Path::new),
        config.logging.format == "json",
    )?;

    info!("Starting eye-clinic");

    let mut database_config = config.database.clone();
    database_config.url = config.get_database_url();
    let database = match Database::with_config(&database_config) {
        Ok(database) => database,
        Err(err) => {
            error!(error = %err, url = %database_config.url, "Failed to open database");
            report_fatal(&format!("Database connection failed: {err}"));
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Init => {
            info!(url = %database_config.url, "Clinic database initialized");
        }
        Commands::Shell => {
            let service = ClinicService::sqlite(database, config.password_hasher());
            let mut shell = Shell::new(Navigator::new(service));
            shell
                .run(io::stdin().lock(), &mut io::stdout().lock())
                .context("Interactive session failed")?;
        }
        Commands::Query { sql, params, write } => run_query(&database, &sql, &params, write)?,
    }

    Ok(())
}

#[allow(clippy::print_stderr)]
fn report_fatal(message: &str) {
    eprintln!("{message}");
}

/// Run a raw statement and print its outcome
fn run_query(database: &Database, sql: &str, params: &[String], write: bool) -> Result<()> {
    let timer = OperationTimer::new("query");
    let values: Vec<Value> = params.iter().map(|raw| parse_value(raw)).collect();
    let outcome = database.execute_query(sql, &values, !write);
    timer.finish();

    let mut out = io::stdout().lock();
    match outcome {
        QueryOutcome::Rows { columns, rows } => shell::write_rows(&mut out, &columns, &rows)?,
        QueryOutcome::Committed(changed) => shell::write_line(&mut out, &format!("Committed ({changed} rows)"))?,
        QueryOutcome::Failed => anyhow::bail!("Query failed; see the log for details"),
    }
    Ok(())
}

/// Integers and reals bind as numbers, `null` as NULL, anything else as text
fn parse_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        Value::Null
    } else if let Ok(integer) = raw.parse::<i64>() {
        Value::Integer(integer)
    } else if let Ok(real) = raw.parse::<f64>() {
        Value::Real(real)
    } else {
        Value::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_bind_by_shape() {
        assert_eq!(parse_value("7"), Value::Integer(7));
        assert_eq!(parse_value("2.5"), Value::Real(2.5));
        assert_eq!(parse_value("NULL"), Value::Null);
        assert_eq!(parse_value("Ana"), Value::Text("Ana".to_string()));
    }

    #[test]
    fn cli_parses_query_command() {
        let cli = Cli::try_parse_from(["eye-clinic", "--config", "c.toml", "query", "--sql", "SELECT 1", "--write"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Query { write: true, .. }));
    }
}
