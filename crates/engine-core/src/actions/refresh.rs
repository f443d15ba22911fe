use crate::{actions::append::AppendAction, error::ActionError};
use model::{command::RefreshKind, sql::SqlCommand};
use renderer::{SqlRenderer, params};

/// Table refresh in one of three strategies. All three share the append
/// insert; they differ only in the preceding statement and in whether the
/// insert overwrites.
///
/// - DI (delta-insert): delete the filtered slice, insert it back.
/// - OI (overwrite-insert): single overwriting insert.
/// - TI (truncate-insert): truncate the target, insert everything.
pub struct RefreshAction {
    pub kind: RefreshKind,
    pub append: AppendAction,
}

impl RefreshAction {
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        let mut commands = Vec::new();
        match self.kind {
            RefreshKind::Di => {
                let sql = renderer.render(
                    "delete",
                    &params! {
                        "tableName" => self.append.target,
                        "whereClause" => self.append.where_clause,
                    },
                )?;
                commands.push(SqlCommand::new(sql, self.append.binds.clone()));
            }
            RefreshKind::Ti => {
                let sql = renderer.render(
                    "truncate",
                    &params! { "tableName" => self.append.target },
                )?;
                commands.push(SqlCommand::without_binds(sql));
            }
            RefreshKind::Oi => {}
        }
        commands.push(self.append.insert_command(renderer)?);
        Ok(commands)
    }
}
