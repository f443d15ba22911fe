use crate::meta::{ActionMetadata, SessionVariables};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-step outcome. SUCCESS is reserved for rows that were both active and
/// actually executed; the status is computed before execution so a report
/// exists even for rows that are never run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Skipped,
    NoExecute,
    Success,
    Error,
}

/// Overall run outcome, derived while the run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    Warning,
    NoExecute,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Warning => "WARNING",
            RunStatus::NoExecute => "NO_EXECUTE",
            RunStatus::Error => "ERROR",
        }
    }
}

/// Row parameters echoed into the step report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepParameters {
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub binds: Vec<String>,
    pub temp_table: bool,
    pub active: bool,
}

impl StepParameters {
    pub fn from_meta(meta: &ActionMetadata) -> Self {
        StepParameters {
            source: meta.source.clone(),
            target: meta.target.clone(),
            where_clause: meta.where_clause.clone(),
            binds: meta.bind_names.clone(),
            temp_table: meta.temp_table,
            active: meta.active,
        }
    }
}

/// Report for one command row, appended to the run report in step order and
/// never reordered or mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step_id: i64,
    pub action: String,
    pub status: StepStatus,
    pub error_message: String,
    pub parameters: StepParameters,
    /// Rendered SQL, present even for dry-run and skipped-by-error steps.
    pub commands: Vec<String>,
}

impl StepReport {
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = StepStatus::Error;
        self.error_message = message.into();
    }
}

/// The structured result of one orchestrator invocation, serialized at the
/// end of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub process: String,
    pub status: RunStatus,
    pub execute: bool,
    pub session_variables: SessionVariables,
    pub error_message: String,
    pub warning_message: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new(process: impl Into<String>, session: SessionVariables, execute: bool) -> Self {
        RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            process: process.into(),
            status: if execute {
                RunStatus::Success
            } else {
                RunStatus::NoExecute
            },
            execute,
            session_variables: session,
            error_message: String::new(),
            warning_message: String::new(),
            started_at: Utc::now(),
            ended_at: None,
            steps: Vec::new(),
        }
    }

    /// A report for a run that failed before any step was attempted
    /// (validation or introspection failure).
    pub fn failed(
        process: impl Into<String>,
        session: SessionVariables,
        execute: bool,
        message: impl Into<String>,
    ) -> Self {
        let mut report = Self::new(process, session, execute);
        report.fail(message);
        report.finish();
        report
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Error;
        self.error_message = message.into();
    }

    /// Promotes SUCCESS to WARNING; ERROR and NO_EXECUTE are left alone.
    pub fn warn(&mut self, message: impl Into<String>) {
        if self.status == RunStatus::Success {
            self.status = RunStatus::Warning;
        }
        let message = message.into();
        if self.warning_message.is_empty() {
            self.warning_message = message;
        } else {
            self.warning_message.push_str("; ");
            self.warning_message.push_str(&message);
        }
    }

    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.ended_at
            .map(|end| (end - self.started_at).num_seconds())
            .unwrap_or(0)
    }
}
