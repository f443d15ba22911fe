use crate::{binds::quote_positional_binds, error::ActionError};
use model::sql::SqlCommand;
use renderer::{SqlRenderer, params};

/// Unloads the filtered source table into a file target. The positional
/// bind rewrite applies to the filter clause only; there is no select
/// clause to inspect.
pub struct CopyIntoFileAction {
    pub source: String,
    pub target: String,
    pub where_clause: String,
    pub binds: Vec<String>,
}

impl CopyIntoFileAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let mut where_clause = self.where_clause.clone();
        quote_positional_binds(&mut [&mut where_clause])?;

        let sql = renderer.render(
            "copy_into_file",
            &params! {
                "fileName" => self.target,
                "tableName" => self.source,
                "whereClause" => where_clause,
            },
        )?;
        Ok(vec![SqlCommand::new(sql, self.binds.clone())])
    }
}
