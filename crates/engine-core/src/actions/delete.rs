use crate::error::ActionError;
use model::sql::SqlCommand;
use renderer::{SqlRenderer, params};

/// Deletes from the source locator, guarded by the filter clause. The
/// target locator is unused for this kind.
pub struct DeleteAction {
    pub table: String,
    pub where_clause: String,
    pub binds: Vec<String>,
}

impl DeleteAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let sql = renderer.render(
            "delete",
            &params! {
                "tableName" => self.table,
                "whereClause" => self.where_clause,
            },
        )?;
        Ok(vec![SqlCommand::new(sql, self.binds.clone())])
    }
}
