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

/// Upserts source rows into the target. The update assignment list is the
/// field clause minus the merge-on set; the insert lists add sequence-fed
/// surrogate keys the source does not carry.
pub struct MergeAction {
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub metadata: Arc<TableMetadata>,
    pub binds: Vec<String>,
    pub additional_fields: Vec<AdditionalField>,
    pub merge_on_fields: Vec<String>,
    pub generate_matched_clause: bool,
    pub generate_non_matched_clause: bool,
    pub temp_table: bool,
}

impl MergeAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let mut commands = Vec::new();
        if self.temp_table {
            commands.push(CloneTableAction::of(&self.target).command(renderer)?);
        }

        if self.merge_on_fields.is_empty() {
            return Err(ActionError::EmptyMergeKeys(self.target.clone()));
        }

        let common = self.metadata.common_columns(&self.source, &self.target);
        let clauses = self
            .metadata
            .select_and_field_clauses(&common, &self.additional_fields);

        let mut select_list = comma_delimited(&clauses.select_clause);
        let mut where_clause = self.where_clause.clone();
        quote_positional_binds(&mut [&mut where_clause, &mut select_list])?;

        let merge_on_list = self
            .merge_on_fields
            .iter()
            .map(|field| format!("s.{field} = t.{field}"))
            .collect::<Vec<_>>()
            .join(" AND ");

        let update_list = if self.generate_matched_clause {
            let assignments: Vec<String> = clauses
                .field_clause
                .iter()
                .filter(|field| {
                    !self
                        .merge_on_fields
                        .iter()
                        .any(|key| key.eq_ignore_ascii_case(field))
                })
                .map(|field| format!("t.{field} = s.{field}"))
                .collect();
            assignments.join(", ")
        } else {
            String::new()
        };

        let (insert_list, value_list) = if self.generate_non_matched_clause {
            insert_lists(&self.metadata, &self.target, &clauses.field_clause)
        } else {
            (Vec::new(), Vec::new())
        };

        let sql = renderer.render(
            "merge",
            &params! {
                "target" => self.target,
                "source" => self.source,
                "selectList" => select_list,
                "whereClause" => where_clause,
                "mergeOnFieldList" => merge_on_list,
                "updateFieldList" => update_list,
                "insertFieldList" => comma_delimited(&insert_list),
                "valueFieldList" => comma_delimited(&value_list),
            },
        )?;
        commands.push(SqlCommand::new(sql, self.binds.clone()));
        Ok(commands)
    }
}
