use crate::{
    error::CatalogError,
    warehouse::{Row, Warehouse},
};
use model::{
    command::CommandRow,
    table::{ColumnInfo, TableMetadata},
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Introspects the warehouse for column lists, primary keys and sequences
/// covering every schema referenced by a process. Built once per run and
/// read-only afterwards; any introspection failure aborts the run.
pub struct SchemaCatalog<'a> {
    warehouse: &'a dyn Warehouse,
    database: String,
}

impl<'a> SchemaCatalog<'a> {
    pub fn new(warehouse: &'a dyn Warehouse, database: impl Into<String>) -> Self {
        SchemaCatalog {
            warehouse,
            database: database.into().to_uppercase(),
        }
    }

    pub async fn load(&self, rows: &[CommandRow]) -> Result<TableMetadata, CatalogError> {
        info!("Fetching column metadata");

        let schemas = referenced_schemas(rows);

        let mut column_rows: Vec<Row> = Vec::new();
        let mut pk_tables: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut sequences: BTreeSet<String> = BTreeSet::new();

        for schema in &schemas {
            let introspection = |source| CatalogError::Introspection {
                schema: schema.clone(),
                source,
            };

            let sql = format!("SHOW COLUMNS IN SCHEMA {}.{}", self.database, schema);
            let output = self
                .warehouse
                .execute(&sql, &[])
                .await
                .map_err(introspection)?;
            column_rows.extend(output.rows);

            let sql = format!(
                "SELECT TABLE_SCHEMA || '.' || TABLE_NAME AS TABLE_NAME \
                 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
                 WHERE TABLE_CATALOG = '{}' AND TABLE_SCHEMA = '{}' \
                 AND CONSTRAINT_TYPE = 'PRIMARY KEY'",
                self.database, schema
            );
            let output = self
                .warehouse
                .execute(&sql, &[])
                .await
                .map_err(introspection)?;
            for row in &output.rows {
                pk_tables.insert(text(row, "TABLE_NAME").to_uppercase(), Vec::new());
            }

            let sql = format!(
                "SELECT SEQUENCE_SCHEMA || '.' || SEQUENCE_NAME AS SEQUENCE_NAME \
                 FROM INFORMATION_SCHEMA.SEQUENCES \
                 WHERE SEQUENCE_CATALOG = '{}' AND SEQUENCE_SCHEMA = '{}'",
                self.database, schema
            );
            let output = self
                .warehouse
                .execute(&sql, &[])
                .await
                .map_err(introspection)?;
            for row in &output.rows {
                sequences.insert(text(row, "SEQUENCE_NAME").to_uppercase());
            }
        }

        // Primary-key column names are only reachable through DESC TABLE,
        // materialized from the describe's own query-execution id.
        for (table, columns) in pk_tables.iter_mut() {
            let describe = |source| CatalogError::PrimaryKeyDescribe {
                table: table.clone(),
                source,
            };

            let query_id = self
                .warehouse
                .execute_returning_query_id(&format!("DESC TABLE {table}"))
                .await
                .map_err(describe)?;

            let rows = self
                .warehouse
                .describe_by_query_id(&query_id)
                .await
                .map_err(describe)?;
            for row in &rows {
                if text(row, "kind") == "COLUMN" && text(row, "primary key") == "Y" {
                    columns.push(text(row, "name").to_uppercase());
                }
            }
        }

        let metadata = build_table_metadata(&column_rows, &pk_tables, &sequences);
        info!("Fetched column metadata");
        Ok(metadata)
    }
}

/// Schema names referenced by the source and target locators of a
/// process, deduplicated and filtered through the identifier pattern.
/// Locators that are not schema-qualified identifiers (file paths, stage
/// references) are skipped.
pub fn referenced_schemas(rows: &[CommandRow]) -> BTreeSet<String> {
    let mut schemas = BTreeSet::new();
    for row in rows {
        for locator in [row.cmd_src.as_deref(), row.cmd_tgt.as_deref()] {
            if let Some(schema) = schema_of(locator.unwrap_or_default()) {
                schemas.insert(schema);
            }
        }
    }
    schemas
}

fn schema_of(locator: &str) -> Option<String> {
    let (schema, _) = locator.split_once('.')?;
    if is_valid_identifier(schema) {
        Some(schema.to_uppercase())
    } else {
        None
    }
}

/// Identifier pattern: starts with a letter or underscore, then word
/// characters or `$` only.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn build_table_metadata(
    column_rows: &[Row],
    pk_tables: &BTreeMap<String, Vec<String>>,
    sequences: &BTreeSet<String>,
) -> TableMetadata {
    let mut grouped: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();

    for row in column_rows {
        let schema = text(row, "schema_name").to_uppercase();
        let table = text(row, "table_name").to_uppercase();
        let key = format!("{schema}.{table}");
        let name = text(row, "column_name").to_uppercase();

        let mut column = ColumnInfo::new(name, parse_data_type(&text(row, "data_type")));
        column.is_virtual = text(row, "kind") == "VIRTUAL_COLUMN";
        column.is_primary_key = pk_tables
            .get(&key)
            .is_some_and(|cols| cols.contains(&column.name));
        if column.is_key_like() {
            let sequence = format!("{schema}.SEQ_{table}");
            if sequences.contains(&sequence) {
                column.sequence_name = Some(sequence);
            }
        }

        grouped.entry(key).or_default().push(column);
    }

    let mut metadata = TableMetadata::new();
    for (table, columns) in grouped {
        metadata.insert(table, columns);
    }
    metadata
}

/// SHOW COLUMNS reports the data type as a JSON payload; the type tag is
/// its `type` member. Non-JSON values are carried through verbatim.
fn parse_data_type(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

/// Column lookup tolerant to the warehouse's case conventions.
fn text(row: &Row, key: &str) -> String {
    let value = row.get(key).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column_row(schema: &str, table: &str, column: &str, kind: &str) -> Row {
        let mut row = Row::new();
        row.insert("schema_name".into(), json!(schema));
        row.insert("table_name".into(), json!(table));
        row.insert("column_name".into(), json!(column));
        row.insert(
            "data_type".into(),
            json!("{\"type\":\"NUMBER\",\"precision\":38}"),
        );
        row.insert("kind".into(), json!(kind));
        row
    }

    #[test]
    fn referenced_schemas_skip_non_identifiers() {
        let rows = vec![
            CommandRow {
                cmd_src: Some("STG.CUST".into()),
                cmd_tgt: Some("DW.CUST".into()),
                ..Default::default()
            },
            CommandRow {
                cmd_src: Some("DW.CUST".into()),
                cmd_tgt: Some("@my_stage/extract/cust.csv".into()),
                ..Default::default()
            },
            CommandRow {
                cmd_tgt: Some("unqualified".into()),
                ..Default::default()
            },
        ];
        let schemas: Vec<String> = referenced_schemas(&rows).into_iter().collect();
        assert_eq!(schemas, vec!["DW".to_string(), "STG".to_string()]);
    }

    #[test]
    fn sequence_is_associated_with_key_like_columns_only() {
        let rows = vec![
            column_row("DW", "CUST_DIM", "CUST_KEY", "COLUMN"),
            column_row("DW", "CUST_DIM", "CUST_NAME", "COLUMN"),
        ];
        let sequences = BTreeSet::from(["DW.SEQ_CUST_DIM".to_string()]);
        let metadata = build_table_metadata(&rows, &BTreeMap::new(), &sequences);

        let columns = metadata.columns("DW.CUST_DIM", false);
        assert_eq!(
            columns[0].sequence_name.as_deref(),
            Some("DW.SEQ_CUST_DIM")
        );
        assert_eq!(columns[1].sequence_name, None);
    }

    #[test]
    fn virtual_columns_and_pk_flags_are_captured() {
        let rows = vec![
            column_row("DW", "CUST", "CUST_ID", "COLUMN"),
            column_row("DW", "CUST", "FULL_NAME", "VIRTUAL_COLUMN"),
        ];
        let pk = BTreeMap::from([("DW.CUST".to_string(), vec!["CUST_ID".to_string()])]);
        let metadata = build_table_metadata(&rows, &pk, &BTreeSet::new());

        let columns = metadata.columns("DW.CUST", false);
        assert!(columns[0].is_primary_key);
        assert!(!columns[0].is_virtual);
        assert!(columns[1].is_virtual);
        assert_eq!(columns[0].data_type, "NUMBER");
    }

    #[test]
    fn identifier_pattern_matches_word_characters_and_dollar() {
        assert!(is_valid_identifier("STG"));
        assert!(is_valid_identifier("_INTERNAL$1"));
        assert!(!is_valid_identifier("1STG"));
        assert!(!is_valid_identifier("@my_stage/load"));
    }
}
