use crate::error::ActionError;
use model::sql::SqlCommand;
use renderer::{SqlRenderer, params};

/// Clones a table into a temporary table of the same name so a following
/// mutation operates against an isolated copy.
pub struct CloneTableAction {
    pub source: String,
    pub target: String,
}

impl CloneTableAction {
    /// A same-name clone, the shape used by the temp-table flag.
    pub fn of(table: &str) -> Self {
        CloneTableAction {
            source: table.to_string(),
            target: table.to_string(),
        }
    }

    pub fn command(&self, renderer: &dyn SqlRenderer) -> Result<SqlCommand, ActionError> {
        let sql = renderer.render(
            "clone_table",
            &params! {
                "target" => self.target,
                "source" => self.source,
            },
        )?;
        Ok(SqlCommand::without_binds(sql))
    }
}
