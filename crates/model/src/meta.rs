use crate::{
    command::{CommandKind, CommandRow, RefreshKind},
    error::ModelError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied bind-variable name -> literal value. Read-only for the
/// duration of a run.
pub type SessionVariables = BTreeMap<String, String>;

/// One additional field: a SQL expression and the alias it is selected as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalField {
    pub expression: String,
    pub alias: String,
}

impl AdditionalField {
    pub fn new(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        AdditionalField {
            expression: expression.into(),
            alias: alias.into(),
        }
    }
}

/// A command row with its micro-languages parsed and its defaults resolved.
/// Produced once per row by `normalize`; nothing downstream re-splits the
/// pipe- or space-delimited metadata values.
#[derive(Debug, Clone)]
pub struct ActionMetadata {
    pub step_id: i64,
    /// `None` when the row names a command the engine does not know; such
    /// rows compile to the no-op default action.
    pub kind: Option<CommandKind>,
    /// The raw command name, echoed into the step report.
    pub kind_name: String,
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub additional_fields: Vec<AdditionalField>,
    /// Bind names as declared on the row, in declaration order.
    pub bind_names: Vec<String>,
    /// Session-variable values resolved for `bind_names`, same order.
    pub binds: Vec<String>,
    pub temp_table: bool,
    pub business_key: Vec<String>,
    pub refresh_kind: Option<RefreshKind>,
    /// Lower-cased, blank entries dropped.
    pub merge_on_fields: Vec<String>,
    pub generate_merge_matched: bool,
    pub generate_merge_non_matched: bool,
    pub active: bool,
}

impl ActionMetadata {
    /// Pure normalization of a raw command row, no I/O. Every referenced
    /// bind name must resolve against the session variables.
    pub fn normalize(row: &CommandRow, session: &SessionVariables) -> Result<Self, ModelError> {
        let mut additional_fields = Vec::new();
        for entry in split_pipes(row.additional_fields.as_deref()) {
            // Expression and alias are space-delimited; repeated whitespace
            // between them is tolerated.
            let mut parts = entry.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(expression), Some(alias)) => {
                    additional_fields.push(AdditionalField::new(expression, alias));
                }
                _ => return Err(ModelError::MalformedAdditionalField(entry)),
            }
        }

        let bind_names = split_pipes(row.cmd_binds.as_deref());
        let mut binds = Vec::with_capacity(bind_names.len());
        for name in &bind_names {
            match session.get(name) {
                Some(value) => binds.push(value.clone()),
                None => return Err(ModelError::MissingBindVariable(name.clone())),
            }
        }

        let merge_on_fields = split_pipes(row.merge_on_fields.as_deref())
            .into_iter()
            .map(|f| f.to_lowercase())
            .collect();

        let business_key = split_pipes(row.business_key.as_deref())
            .into_iter()
            .map(|f| f.to_lowercase())
            .collect();

        Ok(ActionMetadata {
            step_id: row.process_cmd_id,
            kind: CommandKind::parse(&row.cmd_type),
            kind_name: row.cmd_type.trim().to_uppercase(),
            source: row.cmd_src.clone().unwrap_or_default(),
            target: row.cmd_tgt.clone().unwrap_or_default(),
            where_clause: row.cmd_where.clone().unwrap_or_default(),
            additional_fields,
            bind_names,
            binds,
            temp_table: flag(row.temp_table.as_deref()),
            business_key,
            refresh_kind: row
                .refresh_type
                .as_deref()
                .and_then(RefreshKind::parse),
            merge_on_fields,
            generate_merge_matched: flag(row.generate_merge_matched_clause.as_deref()),
            generate_merge_non_matched: flag(row.generate_merge_non_matched_clause.as_deref()),
            active: flag(row.active.as_deref()),
        })
    }
}

/// Splits a pipe-delimited metadata value, trimming entries and dropping
/// blanks. `None` behaves as an empty value.
fn split_pipes(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn flag(value: Option<&str>) -> bool {
    value.map(str::trim) == Some("Y")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(pairs: &[(&str, &str)]) -> SessionVariables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn row() -> CommandRow {
        CommandRow {
            process_cmd_id: 10,
            cmd_type: "MERGE".into(),
            cmd_src: Some("STG.CUST".into()),
            cmd_tgt: Some("DW.CUST_DIM".into()),
            cmd_where: Some("COBID = :1".into()),
            cmd_binds: Some("COBID".into()),
            merge_on_fields: Some("CUST_ID | ".into()),
            additional_fields: Some("current_timestamp()   LOAD_TS | 'N' DELETED_FLAG".into()),
            active: Some("Y".into()),
            generate_merge_matched_clause: Some("Y".into()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_parses_micro_languages_once() {
        let meta =
            ActionMetadata::normalize(&row(), &session(&[("COBID", "20210401")])).unwrap();
        assert_eq!(meta.kind, Some(CommandKind::Merge));
        assert_eq!(meta.binds, vec!["20210401".to_string()]);
        assert_eq!(meta.merge_on_fields, vec!["cust_id".to_string()]);
        assert_eq!(
            meta.additional_fields,
            vec![
                AdditionalField::new("current_timestamp()", "LOAD_TS"),
                AdditionalField::new("'N'", "DELETED_FLAG"),
            ]
        );
        assert!(meta.generate_merge_matched);
        assert!(!meta.generate_merge_non_matched);
        assert!(meta.active);
    }

    #[test]
    fn normalize_rejects_missing_bind_variable() {
        let err = ActionMetadata::normalize(&row(), &session(&[])).unwrap_err();
        assert!(matches!(err, ModelError::MissingBindVariable(ref name) if name == "COBID"));
    }

    #[test]
    fn normalize_defaults_null_locators_to_empty() {
        let mut raw = row();
        raw.cmd_src = None;
        raw.cmd_where = None;
        raw.cmd_binds = None;
        let meta = ActionMetadata::normalize(&raw, &session(&[])).unwrap();
        assert_eq!(meta.source, "");
        assert_eq!(meta.where_clause, "");
        assert!(meta.binds.is_empty());
    }

    #[test]
    fn malformed_additional_field_is_rejected() {
        let mut raw = row();
        raw.additional_fields = Some("lonely_expression".into());
        let err =
            ActionMetadata::normalize(&raw, &session(&[("COBID", "20210401")])).unwrap_err();
        assert!(matches!(err, ModelError::MalformedAdditionalField(_)));
    }
}
