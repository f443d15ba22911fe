use crate::{
    actions::{clone_table::CloneTableAction, insert_lists},
    binds::quote_positional_binds,
    error::ActionError,
};
use model::{
    meta::AdditionalField,
    sql::SqlCommand,
    table::{TableMetadata, comma_delimited},
};
use renderer::{SqlRenderer, params};
use std::sync::Arc;

/// Publishes a slowly-changing-dimension (type 2) target: current versions
/// whose tracked values changed are closed out, then new open versions are
/// inserted, keyed by the declared business key.
pub struct Scd2PublishAction {
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub metadata: Arc<TableMetadata>,
    pub binds: Vec<String>,
    pub additional_fields: Vec<AdditionalField>,
    pub business_key: Vec<String>,
    pub temp_table: bool,
}

impl Scd2PublishAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        if self.business_key.is_empty() {
            return Err(ActionError::EmptyBusinessKey(self.target.clone()));
        }

        let mut commands = Vec::new();
        if self.temp_table {
            commands.push(CloneTableAction::of(&self.target).command(renderer)?);
        }

        let common = self.metadata.common_columns(&self.source, &self.target);
        let clauses = self
            .metadata
            .select_and_field_clauses(&common, &self.additional_fields);

        let mut select_list = comma_delimited(&clauses.select_clause);
        let mut where_clause = self.where_clause.clone();
        quote_positional_binds(&mut [&mut where_clause, &mut select_list])?;

        let key_predicate = self
            .business_key
            .iter()
            .map(|key| format!("s.{key} = t.{key}"))
            .collect::<Vec<_>>()
            .join(" AND ");

        // A version is re-published only when a non-key tracked value
        // actually changed.
        let change_predicate = clauses
            .field_clause
            .iter()
            .filter(|field| {
                !self
                    .business_key
                    .iter()
                    .any(|key| key.eq_ignore_ascii_case(field))
            })
            .map(|field| format!("t.{field} <> s.{field}"))
            .collect::<Vec<_>>()
            .join(" OR ");

        let (insert_list, value_list) =
            insert_lists(&self.metadata, &self.target, &clauses.field_clause);

        let close = renderer.render(
            "scd2_close",
            &params! {
                "target" => self.target,
                "source" => self.source,
                "selectList" => select_list,
                "whereClause" => where_clause,
                "businessKeyPredicate" => key_predicate,
                "changePredicate" => change_predicate,
            },
        )?;
        commands.push(SqlCommand::new(close, self.binds.clone()));

        let insert = renderer.render(
            "scd2_insert",
            &params! {
                "target" => self.target,
                "source" => self.source,
                "insertFieldList" => comma_delimited(&insert_list),
                "valueFieldList" => comma_delimited(&value_list),
                "whereClause" => where_clause,
                "businessKeyPredicate" => key_predicate,
            },
        )?;
        commands.push(SqlCommand::new(insert, self.binds.clone()));
        Ok(commands)
    }
}
