use crate::{
    error::WarehouseError,
    warehouse::{QueryOutput, Row, Warehouse},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const STATEMENT_TIMEOUT_SECS: u64 = 3600;

/// Session parameters for the warehouse SQL-over-REST endpoint. Credential
/// acquisition is the caller's concern; the engine only carries the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseProfile {
    pub base_url: String,
    pub token: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub role: String,
}

/// Warehouse session over the statements REST API. Statements are
/// submitted synchronously; the returned statement handle doubles as the
/// query-execution id for later result materialization.
pub struct RestWarehouse {
    http: reqwest::Client,
    profile: WarehouseProfile,
}

impl RestWarehouse {
    pub fn new(profile: WarehouseProfile) -> Self {
        RestWarehouse {
            http: reqwest::Client::new(),
            profile,
        }
    }

    fn statements_url(&self) -> String {
        format!("{}/api/v2/statements", self.profile.base_url.trim_end_matches('/'))
    }

    async fn submit(
        &self,
        sql: &str,
        binds: &[String],
    ) -> Result<StatementResponse, WarehouseError> {
        debug!(statement = sql, "submitting statement");

        let mut bindings = BTreeMap::new();
        for (position, value) in binds.iter().enumerate() {
            bindings.insert(
                (position + 1).to_string(),
                Binding {
                    kind: "TEXT",
                    value: value.clone(),
                },
            );
        }

        let request = StatementRequest {
            statement: sql,
            timeout: STATEMENT_TIMEOUT_SECS,
            database: &self.profile.database,
            schema: &self.profile.schema,
            warehouse: &self.profile.warehouse,
            role: &self.profile.role,
            bindings,
        };

        let response = self
            .http
            .post(self.statements_url())
            .bearer_auth(&self.profile.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: StatementResponse = response.json().await?;
        if !status.is_success() {
            return Err(WarehouseError::Execution(
                body.message
                    .unwrap_or_else(|| format!("warehouse returned HTTP {status}")),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl Warehouse for RestWarehouse {
    async fn execute(&self, sql: &str, binds: &[String]) -> Result<QueryOutput, WarehouseError> {
        let body = self.submit(sql, binds).await?;
        Ok(QueryOutput::new(body.into_rows()?))
    }

    async fn execute_returning_query_id(&self, sql: &str) -> Result<String, WarehouseError> {
        let body = self.submit(sql, &[]).await?;
        body.statement_handle
            .ok_or_else(|| WarehouseError::Response("response carried no statement handle".into()))
    }

    async fn describe_by_query_id(&self, query_id: &str) -> Result<Vec<Row>, WarehouseError> {
        let response = self
            .http
            .get(format!("{}/{}", self.statements_url(), query_id))
            .bearer_auth(&self.profile.token)
            .send()
            .await?;

        let status = response.status();
        let body: StatementResponse = response.json().await?;
        if !status.is_success() {
            return Err(WarehouseError::Execution(body.message.unwrap_or_else(|| {
                format!("query id {query_id} lookup returned HTTP {status}")
            })));
        }
        body.into_rows()
    }
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    database: &'a str,
    schema: &'a str,
    warehouse: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding>,
}

#[derive(Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "statementHandle")]
    statement_handle: Option<String>,
    message: Option<String>,
    #[serde(rename = "resultSetMetaData")]
    result_set_meta_data: Option<ResultSetMetaData>,
    data: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "rowType")]
    row_type: Vec<RowType>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
}

impl StatementResponse {
    /// Zips the column descriptors with the positional data arrays into
    /// name-keyed rows. Statements without a result set yield no rows.
    fn into_rows(self) -> Result<Vec<Row>, WarehouseError> {
        let (meta, data) = match (self.result_set_meta_data, self.data) {
            (Some(meta), Some(data)) => (meta, data),
            _ => return Ok(Vec::new()),
        };

        let mut rows = Vec::with_capacity(data.len());
        for values in data {
            if values.len() != meta.row_type.len() {
                return Err(WarehouseError::Response(format!(
                    "row has {} values but {} columns were described",
                    values.len(),
                    meta.row_type.len()
                )));
            }
            let mut row = Row::new();
            for (column, value) in meta.row_type.iter().zip(values) {
                row.insert(column.name.clone(), value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_rows_are_keyed_by_column_name() {
        let response = StatementResponse {
            statement_handle: Some("01b2-0604".into()),
            message: None,
            result_set_meta_data: Some(ResultSetMetaData {
                row_type: vec![
                    RowType {
                        name: "column_name".into(),
                    },
                    RowType {
                        name: "kind".into(),
                    },
                ],
            }),
            data: Some(vec![vec![json!("CUST_ID"), json!("COLUMN")]]),
        };
        let rows = response.into_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("column_name"), Some(&json!("CUST_ID")));
    }

    #[test]
    fn column_count_mismatch_is_a_response_error() {
        let response = StatementResponse {
            statement_handle: None,
            message: None,
            result_set_meta_data: Some(ResultSetMetaData {
                row_type: vec![RowType {
                    name: "column_name".into(),
                }],
            }),
            data: Some(vec![vec![json!("A"), json!("B")]]),
        };
        assert!(matches!(
            response.into_rows(),
            Err(WarehouseError::Response(_))
        ));
    }
}
