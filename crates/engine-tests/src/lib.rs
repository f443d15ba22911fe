#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{
    error::WarehouseError,
    warehouse::{QueryOutput, Row, Warehouse},
};
use serde_json::json;
use std::sync::Mutex;

pub mod integration;

/// In-memory warehouse double. Returns scripted result sets by statement
/// fragment, injects failures the same way, and records every submitted
/// statement with its binds.
pub struct MockWarehouse {
    submitted: Mutex<Vec<(String, Vec<String>)>>,
    scripted: Mutex<Vec<(String, Vec<Row>)>>,
    failures: Mutex<Vec<String>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        MockWarehouse {
            submitted: Mutex::new(Vec::new()),
            scripted: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Statements containing `fragment` return `rows`. Earlier scripts win
    /// when several fragments match.
    pub fn script(&self, fragment: &str, rows: Vec<Row>) {
        self.scripted
            .lock()
            .expect("scripted lock")
            .push((fragment.to_string(), rows));
    }

    /// Statements containing `fragment` fail with an execution error.
    pub fn fail_on(&self, fragment: &str) {
        self.failures
            .lock()
            .expect("failures lock")
            .push(fragment.to_string());
    }

    pub fn submitted(&self) -> Vec<(String, Vec<String>)> {
        self.submitted.lock().expect("submitted lock").clone()
    }

    pub fn submitted_sql(&self) -> Vec<String> {
        self.submitted()
            .into_iter()
            .map(|(sql, _)| sql)
            .collect()
    }

    fn record(&self, sql: &str, binds: &[String]) {
        tracing::debug!(sql, ?binds, "mock statement submitted");
        self.submitted
            .lock()
            .expect("submitted lock")
            .push((sql.to_string(), binds.to_vec()));
    }

    fn respond(&self, sql: &str) -> Result<Vec<Row>, WarehouseError> {
        if let Some(fragment) = self
            .failures
            .lock()
            .expect("failures lock")
            .iter()
            .find(|fragment| sql.contains(fragment.as_str()))
        {
            return Err(WarehouseError::Execution(format!(
                "injected failure on `{fragment}`"
            )));
        }
        Ok(self
            .scripted
            .lock()
            .expect("scripted lock")
            .iter()
            .find(|(fragment, _)| sql.contains(fragment))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

impl Default for MockWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn execute(&self, sql: &str, binds: &[String]) -> Result<QueryOutput, WarehouseError> {
        self.record(sql, binds);
        Ok(QueryOutput::new(self.respond(sql)?))
    }

    async fn execute_returning_query_id(&self, sql: &str) -> Result<String, WarehouseError> {
        self.record(sql, &[]);
        self.respond(sql)?;
        Ok("01b0-mock-query-id".to_string())
    }

    async fn describe_by_query_id(&self, query_id: &str) -> Result<Vec<Row>, WarehouseError> {
        // Scripts match against the query id here, so tests key describe
        // results off the fixed id handed out above.
        self.respond(query_id)
    }
}

pub fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    let mut row = Row::new();
    for (key, value) in pairs {
        row.insert(key.to_string(), value.clone());
    }
    row
}

/// A SHOW COLUMNS result row the schema catalog understands.
pub fn show_column(schema: &str, table: &str, column: &str) -> Row {
    row(&[
        ("schema_name", json!(schema)),
        ("table_name", json!(table)),
        ("column_name", json!(column)),
        ("data_type", json!("{\"type\":\"TEXT\",\"length\":256}")),
        ("kind", json!("COLUMN")),
    ])
}
