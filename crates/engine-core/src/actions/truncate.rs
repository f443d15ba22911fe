use crate::error::ActionError;
use model::sql::SqlCommand;
use renderer::{SqlRenderer, params};

pub struct TruncateAction {
    pub target: String,
}

impl TruncateAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let sql = renderer.render("truncate", &params! { "tableName" => self.target })?;
        Ok(vec![SqlCommand::without_binds(sql)])
    }
}
