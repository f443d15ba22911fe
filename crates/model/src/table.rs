use crate::meta::AdditionalField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One warehouse column as captured during schema introspection. Rebuilt
/// once per run; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_virtual: bool,
    pub is_primary_key: bool,
    pub sequence_name: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        ColumnInfo {
            name: name.into(),
            data_type: data_type.into(),
            is_virtual: false,
            is_primary_key: false,
            sequence_name: None,
        }
    }

    /// Columns with these suffixes are surrogate-key candidates eligible
    /// for sequence-driven value synthesis on insert.
    pub fn is_key_like(&self) -> bool {
        let upper = self.name.to_uppercase();
        upper.ends_with("_KEY") || upper.ends_with("_ID") || upper.ends_with("_SEQ")
    }
}

/// The schema catalog for one run: fully-qualified table name -> ordered
/// column list. Lookups are case-insensitive on the table name.
#[derive(Debug, Clone, Default)]
pub struct TableMetadata {
    tables: HashMap<String, Vec<ColumnInfo>>,
}

/// Select and field clause lists derived from a common-column set plus
/// additional fields. The select clause carries expressions; the field
/// clause carries bare column names used for matching.
#[derive(Debug, Clone, Default)]
pub struct FieldClauses {
    pub select_clause: Vec<String>,
    pub field_clause: Vec<String>,
}

impl TableMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: impl Into<String>, columns: Vec<ColumnInfo>) {
        self.tables.insert(table.into().to_uppercase(), columns);
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_uppercase())
    }

    /// Ordered columns of a table; unknown tables yield an empty list.
    pub fn columns(&self, table: &str, exclude_virtual: bool) -> Vec<ColumnInfo> {
        self.tables
            .get(&table.to_uppercase())
            .map(|cols| {
                cols.iter()
                    .filter(|c| !(exclude_virtual && c.is_virtual))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The column-name intersection between source and target, compared
    /// case-insensitively and excluding virtual columns. Target column
    /// order is preserved.
    pub fn common_columns(&self, source: &str, target: &str) -> Vec<ColumnInfo> {
        let source_names: Vec<String> = self
            .columns(source, true)
            .into_iter()
            .map(|c| c.name.to_uppercase())
            .collect();

        self.columns(target, true)
            .into_iter()
            .filter(|c| source_names.contains(&c.name.to_uppercase()))
            .collect()
    }

    /// Builds the select clause (column names plus aliased additional-field
    /// expressions) and the field clause (bare names plus aliases) for a
    /// common-column set.
    pub fn select_and_field_clauses(
        &self,
        common_columns: &[ColumnInfo],
        additional_fields: &[AdditionalField],
    ) -> FieldClauses {
        let mut clauses = FieldClauses::default();
        for column in common_columns {
            clauses.select_clause.push(column.name.clone());
            clauses.field_clause.push(column.name.clone());
        }
        for field in additional_fields {
            clauses
                .select_clause
                .push(format!("{} AS {}", field.expression, field.alias));
            clauses.field_clause.push(field.alias.clone());
        }
        clauses
    }
}

/// Joins clause entries into a comma-delimited SQL list.
pub fn comma_delimited(entries: &[String]) -> String {
    entries.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TableMetadata {
        let mut metadata = TableMetadata::new();
        metadata.insert(
            "STG.CUST",
            vec![
                ColumnInfo::new("CUST_ID", "NUMBER"),
                ColumnInfo::new("CUST_NAME", "TEXT"),
                ColumnInfo::new("SEGMENT", "TEXT"),
            ],
        );
        let mut derived = ColumnInfo::new("FULL_NAME", "TEXT");
        derived.is_virtual = true;
        metadata.insert(
            "DW.CUST_DIM",
            vec![
                ColumnInfo::new("CUST_ID", "NUMBER"),
                ColumnInfo::new("CUST_NAME", "TEXT"),
                ColumnInfo::new("BALANCE", "NUMBER"),
                derived,
            ],
        );
        metadata
    }

    #[test]
    fn common_columns_intersect_case_insensitively() {
        let names: Vec<String> = catalog()
            .common_columns("stg.cust", "dw.cust_dim")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["CUST_ID".to_string(), "CUST_NAME".to_string()]);
    }

    #[test]
    fn virtual_columns_never_participate() {
        let columns = catalog().columns("DW.CUST_DIM", true);
        assert!(columns.iter().all(|c| c.name != "FULL_NAME"));
        let columns = catalog().columns("DW.CUST_DIM", false);
        assert!(columns.iter().any(|c| c.name == "FULL_NAME"));
    }

    #[test]
    fn clauses_widen_with_additional_fields() {
        let metadata = catalog();
        let common = metadata.common_columns("STG.CUST", "DW.CUST_DIM");
        let clauses = metadata.select_and_field_clauses(
            &common,
            &[AdditionalField::new("current_timestamp()", "LOAD_TS")],
        );
        assert_eq!(
            clauses.select_clause,
            vec![
                "CUST_ID".to_string(),
                "CUST_NAME".to_string(),
                "current_timestamp() AS LOAD_TS".to_string(),
            ]
        );
        assert_eq!(
            clauses.field_clause,
            vec![
                "CUST_ID".to_string(),
                "CUST_NAME".to_string(),
                "LOAD_TS".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_table_yields_no_columns() {
        assert!(catalog().columns("DW.MISSING", true).is_empty());
    }
}
