pub mod append;
pub mod clone_table;
pub mod copy_into_file;
pub mod delete;
pub mod dq_test;
pub mod merge;
pub mod refresh;
pub mod scd2;
pub mod truncate;

use crate::error::ActionError;
use model::{sql::SqlCommand, table::TableMetadata};
use renderer::SqlRenderer;

/// One compiled command row: a closed set of variants, dispatched with an
/// exhaustive match. `Default` is the no-op compiled from inactive or
/// unrecognized rows.
pub enum Action {
    Append(append::AppendAction),
    Merge(merge::MergeAction),
    Scd2Publish(scd2::Scd2PublishAction),
    Refresh(refresh::RefreshAction),
    Delete(delete::DeleteAction),
    Truncate(truncate::TruncateAction),
    CopyIntoFile(copy_into_file::CopyIntoFileAction),
    DqTest(dq_test::DqTestAction),
    Default,
}

impl Action {
    /// The ordered list of SQL commands this action submits.
    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        match self {
            Action::Append(action) => action.commands(renderer),
            Action::Merge(action) => action.commands(renderer),
            Action::Scd2Publish(action) => action.commands(renderer),
            Action::Refresh(action) => action.commands(renderer),
            Action::Delete(action) => action.commands(renderer),
            Action::Truncate(action) => action.commands(renderer),
            Action::CopyIntoFile(action) => action.commands(renderer),
            Action::DqTest(action) => action.commands(renderer),
            Action::Default => Ok(Vec::new()),
        }
    }
}

/// Builds the INSERT column and value lists for a merge-style statement:
/// every non-virtual target column present in the field clause is inserted
/// from the source, and every key-like target column with an associated
/// sequence is synthesized from `{sequence}.nextval` even when the source
/// does not supply it.
pub(crate) fn insert_lists(
    metadata: &TableMetadata,
    target: &str,
    field_clause: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut insert_list = Vec::new();
    let mut value_list = Vec::new();
    for column in metadata.columns(target, true) {
        if field_clause
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&column.name))
        {
            insert_list.push(column.name.clone());
            value_list.push(format!("s.{}", column.name));
        } else if column.is_key_like() {
            if let Some(sequence) = &column.sequence_name {
                insert_list.push(column.name.clone());
                value_list.push(format!("{sequence}.nextval"));
            }
        }
    }
    (insert_list, value_list)
}
