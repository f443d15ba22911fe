use crate::{config::Settings, error::CliError};
use clap::Parser;
use commands::Commands;
use connectors::rest::RestWarehouse;
use engine_runtime::app::App;
use model::{meta::SessionVariables, report::RunStatus};
use renderer::templates::TemplateCatalog;
use std::sync::Arc;
use tracing::Level;

mod commands;
mod config;
mod error;
mod output;
mod vars;

#[derive(Parser)]
#[command(name = "tideway", version = "0.0.1", about = "Warehouse transformation runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            process,
            variables,
            no_execute,
            output,
            config,
        } => {
            let settings = Settings::load(config.as_deref())?;
            let session = match variables.as_deref() {
                Some(raw) => vars::parse_variables(raw)?,
                None => SessionVariables::new(),
            };

            let database = settings.warehouse.database.clone();
            let warehouse = Arc::new(RestWarehouse::new(settings.warehouse));
            let app = App::new(
                warehouse,
                Arc::new(TemplateCatalog::new()),
                settings.metadata.schema,
                database,
            );

            let outcome = app.run_process(&process, session, !no_execute).await;

            match output {
                Some(path) => output::write_report(&outcome, path).await?,
                None => output::print_report(&outcome)?,
            }

            if outcome.report.status == RunStatus::Error {
                return Err(CliError::RunFailed(
                    outcome.report.status.as_str().to_string(),
                ));
            }
        }
    }

    Ok(())
}
