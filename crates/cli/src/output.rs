use crate::error::CliError;
use engine_runtime::process::ProcessOutcome;
use serde_json::json;

fn outcome_json(outcome: &ProcessOutcome) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(&json!({
        "report": outcome.report,
        "dq_logs": outcome.dq_logs,
    }))?;
    Ok(json)
}

pub async fn write_report(outcome: &ProcessOutcome, path: String) -> Result<(), CliError> {
    let report_json = outcome_json(outcome)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(outcome: &ProcessOutcome) -> Result<(), CliError> {
    let report_json = outcome_json(outcome)?;
    println!("{report_json}");
    Ok(())
}
