use connectors::warehouse::Warehouse;
use model::{dq::DqTestLog, report::RunReport};
use renderer::{SqlRenderer, params};
use tracing::warn;

/// Persists the run report and the data-quality logs into the metadata
/// store. Best-effort: a failed insert is logged and swallowed so the
/// caller still returns the in-memory report. Dry runs are not persisted.
pub async fn persist_run(
    warehouse: &dyn Warehouse,
    renderer: &dyn SqlRenderer,
    meta_schema: &str,
    report: &RunReport,
    dq_logs: &[DqTestLog],
) {
    if !report.execute {
        return;
    }

    if let Err(err) = insert_run_log(warehouse, renderer, meta_schema, report).await {
        warn!(%err, "Failed to persist run log");
    }
    for log in dq_logs {
        if let Err(err) = insert_dq_log(warehouse, renderer, meta_schema, report, log).await {
            warn!(%err, "Failed to persist DQ test log");
        }
    }
}

async fn insert_run_log(
    warehouse: &dyn Warehouse,
    renderer: &dyn SqlRenderer,
    meta_schema: &str,
    report: &RunReport,
) -> Result<(), crate::error::EngineError> {
    let sql = renderer.render(
        "process_log_insert",
        &params! { "metaSchema" => meta_schema },
    )?;
    let binds = vec![
        report.run_id.clone(),
        report.process.clone(),
        report.started_at.to_rfc3339(),
        report
            .ended_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        report.elapsed_seconds().to_string(),
        if report.execute { "Y" } else { "N" }.to_string(),
        report.status.as_str().to_string(),
        report.error_message.clone(),
        serde_json::to_string(report).unwrap_or_default(),
    ];
    warehouse.execute(&sql, &binds).await?;
    Ok(())
}

async fn insert_dq_log(
    warehouse: &dyn Warehouse,
    renderer: &dyn SqlRenderer,
    meta_schema: &str,
    report: &RunReport,
    log: &DqTestLog,
) -> Result<(), crate::error::EngineError> {
    let sql = renderer.render(
        "process_dq_log_insert",
        &params! { "metaSchema" => meta_schema },
    )?;
    let binds = vec![
        report.run_id.clone(),
        log.step_id.to_string(),
        log.test_name.clone(),
        log.target.clone(),
        log.column.clone(),
        log.query.clone(),
        log.started_at.to_rfc3339(),
        log.ended_at.to_rfc3339(),
        log.status.as_str().to_string(),
        serde_json::to_string(log).unwrap_or_default(),
    ];
    warehouse.execute(&sql, &binds).await?;
    Ok(())
}
