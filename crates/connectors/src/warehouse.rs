use crate::error::WarehouseError;
use async_trait::async_trait;

/// One result row, keyed by column name as reported by the warehouse.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Result keys the warehouse uses to report row-affected counts.
const COUNT_KEYS: [&str; 6] = [
    "number of rows inserted",
    "number of rows updated",
    "number of rows deleted",
    "rows_loaded",
    "rows_unloaded",
    "status",
];

#[derive(Debug, Default, Clone)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
}

impl QueryOutput {
    pub fn new(rows: Vec<Row>) -> Self {
        QueryOutput { rows }
    }

    /// Row-affected counts and statuses reported in the result set, in the
    /// shape the warehouse returns them for DML statements.
    pub fn affected_counts(&self) -> Vec<(String, String)> {
        let mut counts = Vec::new();
        for row in &self.rows {
            for key in COUNT_KEYS {
                if let Some(value) = row.get(key) {
                    counts.push((key.to_string(), display_value(value)));
                }
            }
        }
        counts
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A live warehouse session. A run owns exactly one session for its
/// lifetime; sessions are never shared between concurrent runs.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Submits a statement with positional binds and materializes its
    /// result rows.
    async fn execute(&self, sql: &str, binds: &[String]) -> Result<QueryOutput, WarehouseError>;

    /// Submits a statement and returns the warehouse query-execution id,
    /// without materializing the result set.
    async fn execute_returning_query_id(&self, sql: &str) -> Result<String, WarehouseError>;

    /// Materializes the result set of a previously executed statement by
    /// its query-execution id.
    async fn describe_by_query_id(&self, query_id: &str) -> Result<Vec<Row>, WarehouseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn affected_counts_picks_known_keys() {
        let mut row = Row::new();
        row.insert("number of rows inserted".into(), json!(42));
        row.insert("unrelated".into(), json!("x"));
        let output = QueryOutput::new(vec![row]);
        assert_eq!(
            output.affected_counts(),
            vec![("number of rows inserted".to_string(), "42".to_string())]
        );
    }
}
