use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A data-quality test bound to a command row: a named query template
/// applied to one target table and column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DqTestDescriptor {
    pub process_cmd_id: i64,
    /// Template name: `uniqueness`, `not_null` or `accepted_values`.
    pub test_name: String,
    pub target: String,
    pub column: String,
    pub accepted_values: Option<String>,
    /// When set, a failing test halts the run like an execution error
    /// instead of being recorded as a warning.
    pub error_and_abort: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqTestStatus {
    Passed,
    Failed,
}

impl DqTestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DqTestStatus::Passed => "PASSED",
            DqTestStatus::Failed => "FAILED",
        }
    }
}

/// Log entry for one executed data-quality test. DQ logs form a list
/// parallel to the run report, keyed by the declaring step id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqTestLog {
    pub step_id: i64,
    pub test_name: String,
    pub target: String,
    pub column: String,
    pub query: String,
    pub result_rows: Vec<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub status: DqTestStatus,
    pub error_and_abort: bool,
}
