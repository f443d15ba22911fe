use serde::{Deserialize, Serialize};

/// The fixed set of transformation commands a process step can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Append,
    Merge,
    Delete,
    Truncate,
    PublishScd2Dim,
    Refresh,
    CopyIntoFile,
    DqTest,
}

impl CommandKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "APPEND" => Some(CommandKind::Append),
            "MERGE" => Some(CommandKind::Merge),
            "DELETE" => Some(CommandKind::Delete),
            "TRUNCATE" => Some(CommandKind::Truncate),
            "PUBLISH_SCD2_DIM" => Some(CommandKind::PublishScd2Dim),
            "REFRESH" => Some(CommandKind::Refresh),
            "COPY_INTO_FILE" => Some(CommandKind::CopyIntoFile),
            "DQ_TEST" => Some(CommandKind::DqTest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Append => "APPEND",
            CommandKind::Merge => "MERGE",
            CommandKind::Delete => "DELETE",
            CommandKind::Truncate => "TRUNCATE",
            CommandKind::PublishScd2Dim => "PUBLISH_SCD2_DIM",
            CommandKind::Refresh => "REFRESH",
            CommandKind::CopyIntoFile => "COPY_INTO_FILE",
            CommandKind::DqTest => "DQ_TEST",
        }
    }
}

/// Table refresh strategy: delta-insert, overwrite-insert or truncate-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshKind {
    Di,
    Oi,
    Ti,
}

impl RefreshKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "DI" => Some(RefreshKind::Di),
            "OI" => Some(RefreshKind::Oi),
            "TI" => Some(RefreshKind::Ti),
            _ => None,
        }
    }
}

/// One raw command row as read from the metadata store. Pipe-delimited
/// micro-languages are still unparsed here; `ActionMetadata::normalize`
/// turns this into a typed representation exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandRow {
    pub process_cmd_id: i64,
    pub cmd_type: String,
    pub cmd_src: Option<String>,
    pub cmd_tgt: Option<String>,
    pub cmd_where: Option<String>,
    pub cmd_binds: Option<String>,
    pub refresh_type: Option<String>,
    pub business_key: Option<String>,
    pub active: Option<String>,
    pub merge_on_fields: Option<String>,
    pub generate_merge_matched_clause: Option<String>,
    pub generate_merge_non_matched_clause: Option<String>,
    pub additional_fields: Option<String>,
    pub temp_table: Option<String>,
    pub dq_type: Option<String>,
}

/// A named process and its command rows, kept in the order the metadata
/// store returned them: grouped by process, ascending step id within each
/// group. Immutable once loaded for a run.
#[derive(Debug, Clone, Default)]
pub struct ProcessDescriptor {
    pub name: String,
    pub rows: Vec<CommandRow>,
}

impl ProcessDescriptor {
    pub fn new(name: impl Into<String>, rows: Vec<CommandRow>) -> Self {
        ProcessDescriptor {
            name: name.into(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_parses_case_insensitively() {
        assert_eq!(CommandKind::parse(" merge "), Some(CommandKind::Merge));
        assert_eq!(
            CommandKind::parse("publish_scd2_dim"),
            Some(CommandKind::PublishScd2Dim)
        );
        assert_eq!(CommandKind::parse("PIVOT"), None);
    }

    #[test]
    fn process_rows_keep_the_store_ordering() {
        // Two processes fetched as ALL: step ids restart per group, and the
        // groups must not be interleaved by a client-side re-sort.
        let rows = vec![
            CommandRow {
                process_cmd_id: 10,
                ..Default::default()
            },
            CommandRow {
                process_cmd_id: 20,
                ..Default::default()
            },
            CommandRow {
                process_cmd_id: 15,
                ..Default::default()
            },
        ];
        let process = ProcessDescriptor::new("ALL", rows);
        let ids: Vec<i64> = process.rows.iter().map(|r| r.process_cmd_id).collect();
        assert_eq!(ids, vec![10, 20, 15]);
    }
}
