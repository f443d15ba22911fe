use crate::runner::StatementRunner;
use chrono::Utc;
use connectors::warehouse::Warehouse;
use engine_core::{
    actions::{Action, dq_test::DqTestAction},
    factory::{self, CompiledStep},
};
use model::{
    command::ProcessDescriptor,
    dq::{DqTestDescriptor, DqTestLog, DqTestStatus},
    meta::{ActionMetadata, SessionVariables},
    report::{RunReport, StepReport, StepStatus},
    table::TableMetadata,
};
use renderer::SqlRenderer;
use std::{collections::HashMap, sync::Arc};
use tracing::{error, info, warn};

/// The result of one orchestrator invocation: the run report plus the
/// data-quality log list parallel to it.
pub struct ProcessOutcome {
    pub report: RunReport,
    pub dq_logs: Vec<DqTestLog>,
}

/// Runs one process: command rows in store order, sequentially,
/// halting on the first step error. Data-quality tests execute even in
/// dry-run mode; everything else is rendered but withheld.
pub struct ProcessRunner {
    warehouse: Arc<dyn Warehouse>,
    renderer: Arc<dyn SqlRenderer>,
}

impl ProcessRunner {
    pub fn new(warehouse: Arc<dyn Warehouse>, renderer: Arc<dyn SqlRenderer>) -> Self {
        ProcessRunner {
            warehouse,
            renderer,
        }
    }

    pub async fn run(
        &self,
        process: &ProcessDescriptor,
        mut dq_tests: HashMap<i64, Vec<DqTestDescriptor>>,
        session: &SessionVariables,
        catalog: Arc<TableMetadata>,
        execute: bool,
    ) -> ProcessOutcome {
        info!(process = %process.name, execute, steps = process.rows.len(), "Starting run");

        let mut report = RunReport::new(&process.name, session.clone(), execute);
        let mut dq_logs = Vec::new();
        let runner = StatementRunner::new(Arc::clone(&self.warehouse), execute);

        for row in &process.rows {
            let meta = match ActionMetadata::normalize(row, session) {
                Ok(meta) => meta,
                Err(err) => {
                    error!(step = row.process_cmd_id, %err, "Metadata normalization failed");
                    let mut step = StepReport {
                        step_id: row.process_cmd_id,
                        action: row.cmd_type.trim().to_uppercase(),
                        status: StepStatus::Error,
                        error_message: String::new(),
                        parameters: Default::default(),
                        commands: Vec::new(),
                    };
                    step.mark_error(err.to_string());
                    report.steps.push(step);
                    report.fail(err.to_string());
                    break;
                }
            };

            let tests = dq_tests.remove(&meta.step_id).unwrap_or_default();
            let CompiledStep { action, report: step } =
                factory::compile(&meta, &catalog, execute, tests);

            let halt = match &action {
                Action::DqTest(dq) => {
                    self.run_dq_step(dq, step, &mut report, &mut dq_logs).await
                }
                _ => self.run_step(&action, step, &runner, &mut report).await,
            };
            if halt {
                break;
            }
        }

        report.finish();
        info!(
            process = %report.process,
            status = report.status.as_str(),
            elapsed = report.elapsed_seconds(),
            "Run finished"
        );
        ProcessOutcome { report, dq_logs }
    }

    /// Renders and, when live, submits the step's statements. Returns true
    /// when the run must halt.
    async fn run_step(
        &self,
        action: &Action,
        mut step: StepReport,
        runner: &StatementRunner,
        report: &mut RunReport,
    ) -> bool {
        let commands = match action.commands(self.renderer.as_ref()) {
            Ok(commands) => commands,
            Err(err) => {
                error!(step = step.step_id, %err, "SQL generation failed");
                step.mark_error(err.to_string());
                let message = err.to_string();
                report.steps.push(step);
                report.fail(message);
                return true;
            }
        };
        step.commands = commands.iter().map(|c| c.text.clone()).collect();

        if step.status == StepStatus::Success {
            for command in &commands {
                if let Err(err) = runner.submit(command).await {
                    error!(step = step.step_id, %err, "Statement failed");
                    step.mark_error(err.to_string());
                    let message = err.to_string();
                    report.steps.push(step);
                    report.fail(message);
                    return true;
                }
            }
        }

        report.steps.push(step);
        false
    }

    /// Executes the step's data-quality queries against the warehouse,
    /// regardless of the execute flag. A non-empty result set fails the
    /// test: the run is demoted to WARNING, or halted when the test is
    /// declared error-and-abort.
    async fn run_dq_step(
        &self,
        action: &DqTestAction,
        mut step: StepReport,
        report: &mut RunReport,
        dq_logs: &mut Vec<DqTestLog>,
    ) -> bool {
        if step.status == StepStatus::NoExecute {
            step.status = StepStatus::Success;
        }

        let rendered = match action.queries(self.renderer.as_ref()) {
            Ok(rendered) => rendered,
            Err(err) => {
                error!(step = step.step_id, %err, "SQL generation failed");
                step.mark_error(err.to_string());
                let message = err.to_string();
                report.steps.push(step);
                report.fail(message);
                return true;
            }
        };
        step.commands = rendered.iter().map(|t| t.sql.clone()).collect();

        for test in &rendered {
            let started_at = Utc::now();
            let output = match self.warehouse.execute(&test.sql, &[]).await {
                Ok(output) => output,
                Err(err) => {
                    error!(step = step.step_id, test = %test.descriptor.test_name, %err, "Test query failed");
                    step.mark_error(err.to_string());
                    let message = err.to_string();
                    report.steps.push(step);
                    report.fail(message);
                    return true;
                }
            };

            let status = if output.rows.is_empty() {
                DqTestStatus::Passed
            } else {
                DqTestStatus::Failed
            };
            dq_logs.push(DqTestLog {
                step_id: step.step_id,
                test_name: test.descriptor.test_name.clone(),
                target: test.descriptor.target.clone(),
                column: test.descriptor.column.clone(),
                query: test.sql.clone(),
                result_rows: output
                    .rows
                    .iter()
                    .map(|row| serde_json::Value::Object(row.clone()))
                    .collect(),
                started_at,
                ended_at: Utc::now(),
                status,
                error_and_abort: test.descriptor.error_and_abort,
            });

            if status == DqTestStatus::Failed {
                let message = format!(
                    "DQ test {} failed on {}.{}",
                    test.descriptor.test_name, test.descriptor.target, test.descriptor.column
                );
                if test.descriptor.error_and_abort {
                    error!(step = step.step_id, "{message}");
                    step.mark_error(message.clone());
                    report.steps.push(step);
                    report.fail(message);
                    return true;
                }
                warn!(step = step.step_id, "{message}");
                report.warn(message);
            }
        }

        report.steps.push(step);
        false
    }
}
