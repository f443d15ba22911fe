use crate::{
    error::StoreError,
    warehouse::{Row, Warehouse},
};
use model::{
    command::{CommandRow, ProcessDescriptor},
    dq::DqTestDescriptor,
};
use renderer::{SqlRenderer, params};
use std::collections::HashMap;
use tracing::info;

/// Reads process and data-quality metadata from the metadata store. Rows
/// are consumed once per run; the store is never written during a run
/// except for run-log persistence.
pub struct MetadataStore<'a> {
    warehouse: &'a dyn Warehouse,
    renderer: &'a dyn SqlRenderer,
    meta_schema: String,
}

impl<'a> MetadataStore<'a> {
    pub fn new(
        warehouse: &'a dyn Warehouse,
        renderer: &'a dyn SqlRenderer,
        meta_schema: impl Into<String>,
    ) -> Self {
        MetadataStore {
            warehouse,
            renderer,
            meta_schema: meta_schema.into().to_uppercase(),
        }
    }

    /// Fetches the ordered command rows for one process (or every process
    /// when the name is `ALL`).
    pub async fn fetch_process(&self, process_name: &str) -> Result<ProcessDescriptor, StoreError> {
        info!(process = process_name, "Fetching process metadata");

        let sql = self.renderer.render(
            "process_metadata",
            &params! {
                "metaSchema" => self.meta_schema,
                "processName" => process_name,
            },
        )?;
        let output = self.warehouse.execute(&sql, &[]).await?;
        if output.rows.is_empty() {
            return Err(StoreError::UnknownProcess(process_name.to_string()));
        }

        let rows = output
            .rows
            .iter()
            .map(command_row)
            .collect::<Result<Vec<_>, _>>()?;

        info!(process = process_name, steps = rows.len(), "Fetched process metadata");
        Ok(ProcessDescriptor::new(process_name, rows))
    }

    /// Fetches declared data-quality tests, keyed by the command row that
    /// declares them.
    pub async fn fetch_dq_tests(
        &self,
        process_name: &str,
    ) -> Result<HashMap<i64, Vec<DqTestDescriptor>>, StoreError> {
        let sql = self.renderer.render(
            "process_dq_metadata",
            &params! {
                "metaSchema" => self.meta_schema,
                "processName" => process_name,
            },
        )?;
        let output = self.warehouse.execute(&sql, &[]).await?;

        let mut tests: HashMap<i64, Vec<DqTestDescriptor>> = HashMap::new();
        for row in &output.rows {
            let descriptor = DqTestDescriptor {
                process_cmd_id: integer(row, "PROCESS_CMD_ID")?,
                test_name: text(row, "DQ_TEST_NAME")
                    .unwrap_or_default()
                    .to_lowercase(),
                target: text(row, "TGT_NAME").unwrap_or_default(),
                column: text(row, "ATTRIBUTE_NAME").unwrap_or_default(),
                accepted_values: text(row, "ACCEPTED_VALUES"),
                error_and_abort: text(row, "ERROR_AND_ABORT").as_deref() == Some("Y"),
            };
            tests
                .entry(descriptor.process_cmd_id)
                .or_default()
                .push(descriptor);
        }
        Ok(tests)
    }
}

fn command_row(row: &Row) -> Result<CommandRow, StoreError> {
    Ok(CommandRow {
        process_cmd_id: integer(row, "PROCESS_CMD_ID")?,
        cmd_type: text(row, "CMD_TYPE").unwrap_or_default(),
        cmd_src: text(row, "CMD_SRC"),
        cmd_tgt: text(row, "CMD_TGT"),
        cmd_where: text(row, "CMD_WHERE"),
        cmd_binds: text(row, "CMD_BINDS"),
        refresh_type: text(row, "REFRESH_TYPE"),
        business_key: text(row, "BUSINESS_KEY"),
        active: text(row, "ACTIVE"),
        merge_on_fields: text(row, "MERGE_ON_FIELDS"),
        generate_merge_matched_clause: text(row, "GENERATE_MERGE_MATCHED_CLAUSE"),
        generate_merge_non_matched_clause: text(row, "GENERATE_MERGE_NON_MATCHED_CLAUSE"),
        additional_fields: text(row, "ADDITIONAL_FIELDS"),
        temp_table: text(row, "TEMP_TABLE"),
        dq_type: text(row, "DQ_TYPE"),
    })
}

fn lookup<'r>(row: &'r Row, key: &str) -> Option<&'r serde_json::Value> {
    row.get(key).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn text(row: &Row, key: &str) -> Option<String> {
    match lookup(row, key) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

fn integer(row: &Row, key: &str) -> Result<i64, StoreError> {
    let value = lookup(row, key)
        .ok_or_else(|| StoreError::MalformedRow(format!("missing column `{key}`")))?;
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| StoreError::MalformedRow(format!("`{key}` is not an integer"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| StoreError::MalformedRow(format!("`{key}` is not an integer: {s}"))),
        other => Err(StoreError::MalformedRow(format!(
            "`{key}` has unexpected type: {other}"
        ))),
    }
}
