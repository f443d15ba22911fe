use crate::{actions::clone_table::CloneTableAction, error::ActionError};
use model::{
    meta::AdditionalField,
    sql::SqlCommand,
    table::{TableMetadata, comma_delimited},
};
use renderer::{SqlRenderer, params};
use std::sync::Arc;

/// Inserts the common column set between source and target, optionally
/// widened by additional-field expressions and guarded by a filter clause.
pub struct AppendAction {
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub metadata: Arc<TableMetadata>,
    pub binds: Vec<String>,
    pub additional_fields: Vec<AdditionalField>,
    pub overwrite: bool,
    pub temp_table: bool,
}

impl AppendAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let mut commands = Vec::new();
        if self.temp_table {
            commands.push(CloneTableAction::of(&self.target).command(renderer)?);
        }
        commands.push(self.insert_command(renderer)?);
        Ok(commands)
    }

    /// The insert-select itself, shared with the refresh strategies.
    pub(crate) fn insert_command(
        &self,
        renderer: &dyn SqlRenderer,
    ) -> Result<SqlCommand, ActionError> {
        let common = self.metadata.common_columns(&self.source, &self.target);
        let clauses = self
            .metadata
            .select_and_field_clauses(&common, &self.additional_fields);

        let sql = renderer.render(
            "append",
            &params! {
                "target" => self.target,
                "source" => self.source,
                "fieldList" => comma_delimited(&clauses.field_clause),
                "selectList" => comma_delimited(&clauses.select_clause),
                "whereClause" => self.where_clause,
                "overwrite" => if self.overwrite { "Y" } else { "" },
            },
        )?;
        Ok(SqlCommand::new(sql, self.binds.clone()))
    }
}
