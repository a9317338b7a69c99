//! sqlgate - ask questions of a SQLite database in plain language.

use std::sync::Arc;

use db_sqlgate::cli::{Cli, Command};
use db_sqlgate::config::Config;
use db_sqlgate::db::{seed_demo_database, SqliteClient};
use db_sqlgate::error::{Result, SqlGateError};
use db_sqlgate::llm::{create_client, LlmProvider};
use db_sqlgate::logging;
use db_sqlgate::service::{QueryResponse, QueryService};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse_args();

    match &cli.log_file {
        Some(path) => logging::init_file_logging(path),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e.public_message());
        std::process::exit(if e.is_caller_error() { 1 } else { 2 });
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    info!("Database: {}", config.database.path.display());

    match &cli.command {
        Command::Seed { force } => {
            seed_demo_database(&config.database.path, *force).await?;
            println!(
                "Created demo database at {}",
                config.database.path.display()
            );
        }
        Command::Schema { json } => {
            let service = build_service(&config, LlmProvider::Mock)?;
            let schema = service.schema().await?;
            if *json {
                println!("{}", to_json(&schema)?);
            } else {
                print!("{}", schema.format_for_display());
            }
        }
        Command::Sql { statement } => {
            let service = build_service(&config, LlmProvider::Mock)?;
            let response = service.run_sql(statement).await?;
            print_response(&response, cli.html)?;
        }
        Command::Ask { question } => {
            let provider: LlmProvider = config
                .llm
                .provider
                .parse()
                .map_err(SqlGateError::config)?;
            let service = build_service(&config, provider)?;
            let response = service.handle_query(question).await?;
            print_response(&response, cli.html)?;
        }
    }

    Ok(())
}

fn build_service(config: &Config, provider: LlmProvider) -> Result<QueryService> {
    let llm = create_client(provider, &config.llm)?;
    let db = Arc::new(SqliteClient::new(&config.database));
    Ok(QueryService::from_config(llm, db, config))
}

fn print_response(response: &QueryResponse, html_only: bool) -> Result<()> {
    if html_only {
        println!("{}", response.html);
    } else {
        println!("{}", to_json(response)?);
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SqlGateError::internal(format!("Failed to serialize output: {e}")))
}
