use crate::{
    log::persist_run,
    process::{ProcessOutcome, ProcessRunner},
};
use connectors::{catalog::SchemaCatalog, store::MetadataStore, warehouse::Warehouse};
use model::{meta::SessionVariables, report::RunReport};
use renderer::SqlRenderer;
use std::sync::Arc;
use tracing::error;

/// Wires a run end to end: metadata fetch, schema introspection, the
/// orchestrator loop and run-log persistence. Always returns an outcome;
/// pre-step failures come back as a failed report with no steps.
pub struct App {
    warehouse: Arc<dyn Warehouse>,
    renderer: Arc<dyn SqlRenderer>,
    meta_schema: String,
    database: String,
}

impl App {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        renderer: Arc<dyn SqlRenderer>,
        meta_schema: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        App {
            warehouse,
            renderer,
            meta_schema: meta_schema.into(),
            database: database.into(),
        }
    }

    pub async fn run_process(
        &self,
        process_name: &str,
        session: SessionVariables,
        execute: bool,
    ) -> ProcessOutcome {
        let process_name = process_name.trim().to_uppercase();
        let store = MetadataStore::new(
            self.warehouse.as_ref(),
            self.renderer.as_ref(),
            &self.meta_schema,
        );

        let process = match store.fetch_process(&process_name).await {
            Ok(process) => process,
            Err(err) => {
                error!(%err, "Failed to load process metadata");
                return failed(&process_name, session, execute, err.to_string());
            }
        };
        let dq_tests = match store.fetch_dq_tests(&process_name).await {
            Ok(tests) => tests,
            Err(err) => {
                error!(%err, "Failed to load DQ test metadata");
                return failed(&process_name, session, execute, err.to_string());
            }
        };

        let catalog = SchemaCatalog::new(self.warehouse.as_ref(), &self.database);
        let tables = match catalog.load(&process.rows).await {
            Ok(tables) => tables,
            Err(err) => {
                error!(%err, "Schema introspection failed");
                return failed(&process_name, session, execute, err.to_string());
            }
        };

        let runner = ProcessRunner::new(Arc::clone(&self.warehouse), Arc::clone(&self.renderer));
        let outcome = runner
            .run(&process, dq_tests, &session, Arc::new(tables), execute)
            .await;

        persist_run(
            self.warehouse.as_ref(),
            self.renderer.as_ref(),
            &self.meta_schema,
            &outcome.report,
            &outcome.dq_logs,
        )
        .await;

        outcome
    }
}

fn failed(
    process: &str,
    session: SessionVariables,
    execute: bool,
    message: String,
) -> ProcessOutcome {
    ProcessOutcome {
        report: RunReport::failed(process, session, execute, message),
        dq_logs: Vec::new(),
    }
}
