use crate::{SqlRenderer, TemplateParams, error::RenderError};

/// Built-in template catalog for the Snowflake-style warehouse dialect.
/// Each action kind maps to one statement shape; rendered text is
/// whitespace-squeezed the way the statements are meant to be logged and
/// submitted (single line, single spaces).
#[derive(Debug, Default, Clone)]
pub struct TemplateCatalog;

impl TemplateCatalog {
    pub fn new() -> Self {
        TemplateCatalog
    }
}

impl SqlRenderer for TemplateCatalog {
    fn render(&self, template: &str, params: &TemplateParams) -> Result<String, RenderError> {
        let sql = match template {
            "append" => render_append(params)?,
            "merge" => render_merge(params)?,
            "delete" => format!(
                "DELETE FROM {}{}",
                req(template, params, "tableName")?,
                where_sql(opt(params, "whereClause")),
            ),
            "truncate" => format!("TRUNCATE TABLE {}", req(template, params, "tableName")?),
            "clone_table" => format!(
                "CREATE OR REPLACE TEMPORARY TABLE {} CLONE {}",
                req(template, params, "target")?,
                req(template, params, "source")?,
            ),
            "copy_into_file" => format!(
                "COPY INTO {} FROM (SELECT * FROM {}{}) OVERWRITE = TRUE HEADER = TRUE",
                req(template, params, "fileName")?,
                req(template, params, "tableName")?,
                where_sql(opt(params, "whereClause")),
            ),
            "scd2_close" => render_scd2_close(params)?,
            "scd2_insert" => render_scd2_insert(params)?,
            "uniqueness" => format!(
                "SELECT {column}, COUNT(*) AS occurrences FROM {target} \
                 GROUP BY {column} HAVING COUNT(*) > 1",
                column = req(template, params, "column")?,
                target = req(template, params, "target")?,
            ),
            "not_null" => format!(
                "SELECT {column} FROM {target} WHERE {column} IS NULL",
                column = req(template, params, "column")?,
                target = req(template, params, "target")?,
            ),
            "accepted_values" => format!(
                "SELECT DISTINCT {column} FROM {target} WHERE {column} NOT IN ({values})",
                column = req(template, params, "column")?,
                target = req(template, params, "target")?,
                values = req(template, params, "acceptedValues")?,
            ),
            "process_metadata" => render_process_metadata(params)?,
            "process_dq_metadata" => render_process_dq_metadata(params)?,
            "process_log_insert" => format!(
                "INSERT INTO {meta}.PROCESS_LOG \
                 (RUN_ID, PROCESS_NAME, START_TIME, END_TIME, ELAPSED_SECONDS, \
                  EXECUTE_FLAG, STATUS, ERROR_MESSAGE, RUN_REPORT) \
                 SELECT :1, :2, :3, :4, :5, :6, :7, :8, PARSE_JSON(:9)",
                meta = req(template, params, "metaSchema")?,
            ),
            "process_dq_log_insert" => format!(
                "INSERT INTO {meta}.PROCESS_DQ_LOG \
                 (RUN_ID, PROCESS_CMD_ID, DQ_TEST_NAME, TGT_NAME, ATTRIBUTE_NAME, \
                  DQ_QUERY, START_TIME, END_TIME, STATUS, DQ_LOG) \
                 SELECT :1, :2, :3, :4, :5, :6, :7, :8, :9, PARSE_JSON(:10)",
                meta = req(template, params, "metaSchema")?,
            ),
            other => return Err(RenderError::UnknownTemplate(other.to_string())),
        };

        Ok(squeeze(&sql))
    }
}

fn render_append(params: &TemplateParams) -> Result<String, RenderError> {
    let overwrite = if opt(params, "overwrite") == "Y" {
        "INSERT OVERWRITE INTO"
    } else {
        "INSERT INTO"
    };
    Ok(format!(
        "{overwrite} {target} ({fields}) SELECT {select} FROM {source}{where_clause}",
        target = req("append", params, "target")?,
        fields = req("append", params, "fieldList")?,
        select = req("append", params, "selectList")?,
        source = req("append", params, "source")?,
        where_clause = where_sql(opt(params, "whereClause")),
    ))
}

fn render_merge(params: &TemplateParams) -> Result<String, RenderError> {
    let mut sql = format!(
        "MERGE INTO {target} t USING (SELECT {select} FROM {source}{where_clause}) s ON {on}",
        target = req("merge", params, "target")?,
        select = req("merge", params, "selectList")?,
        source = req("merge", params, "source")?,
        where_clause = where_sql(opt(params, "whereClause")),
        on = req("merge", params, "mergeOnFieldList")?,
    );

    let update_list = opt(params, "updateFieldList");
    if !update_list.is_empty() {
        sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {update_list}"));
    }

    let insert_list = opt(params, "insertFieldList");
    if !insert_list.is_empty() {
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({insert_list}) VALUES ({values})",
            values = req("merge", params, "valueFieldList")?,
        ));
    }

    Ok(sql)
}

fn render_scd2_close(params: &TemplateParams) -> Result<String, RenderError> {
    let change = opt(params, "changePredicate");
    let matched = if change.is_empty() {
        "WHEN MATCHED".to_string()
    } else {
        format!("WHEN MATCHED AND ({change})")
    };
    Ok(format!(
        "MERGE INTO {target} t USING (SELECT {select} FROM {source}{where_clause}) s \
         ON {on} AND t.effective_end_date IS NULL \
         {matched} THEN UPDATE SET t.effective_end_date = current_timestamp()",
        target = req("scd2_close", params, "target")?,
        select = req("scd2_close", params, "selectList")?,
        source = req("scd2_close", params, "source")?,
        where_clause = where_sql(opt(params, "whereClause")),
        on = req("scd2_close", params, "businessKeyPredicate")?,
    ))
}

fn render_scd2_insert(params: &TemplateParams) -> Result<String, RenderError> {
    let where_clause = opt(params, "whereClause");
    let guard = format!(
        "NOT EXISTS (SELECT 1 FROM {target} t WHERE {on} AND t.effective_end_date IS NULL)",
        target = req("scd2_insert", params, "target")?,
        on = req("scd2_insert", params, "businessKeyPredicate")?,
    );
    let filter = if where_clause.is_empty() {
        format!(" WHERE {guard}")
    } else {
        format!(" WHERE ({where_clause}) AND {guard}")
    };
    Ok(format!(
        "INSERT INTO {target} ({fields}, effective_start_date, effective_end_date) \
         SELECT {values}, current_timestamp(), NULL FROM {source} s{filter}",
        target = req("scd2_insert", params, "target")?,
        fields = req("scd2_insert", params, "insertFieldList")?,
        values = req("scd2_insert", params, "valueFieldList")?,
        source = req("scd2_insert", params, "source")?,
    ))
}

fn render_process_metadata(params: &TemplateParams) -> Result<String, RenderError> {
    let meta = req("process_metadata", params, "metaSchema")?;
    let process = req("process_metadata", params, "processName")?;
    let filter = if process == "ALL" {
        String::new()
    } else {
        format!(" WHERE p.PROCESS_CODE = '{process}'")
    };
    Ok(format!(
        "SELECT p.PROCESS_CODE AS PROCESS_NAME, c.PROCESS_CMD_ID, c.CMD_TYPE, c.CMD_SRC, \
         c.CMD_TGT, c.CMD_WHERE, c.CMD_BINDS, c.REFRESH_TYPE, c.BUSINESS_KEY, c.ACTIVE, \
         c.MERGE_ON_FIELDS, c.GENERATE_MERGE_MATCHED_CLAUSE, \
         c.GENERATE_MERGE_NON_MATCHED_CLAUSE, c.ADDITIONAL_FIELDS, c.TEMP_TABLE, c.DQ_TYPE \
         FROM {meta}.PROCESS p \
         JOIN {meta}.PROCESS_CMD c ON c.PROCESS_ID = p.PROCESS_ID\
         {filter} ORDER BY p.PROCESS_CODE, c.PROCESS_CMD_ID",
    ))
}

fn render_process_dq_metadata(params: &TemplateParams) -> Result<String, RenderError> {
    let meta = req("process_dq_metadata", params, "metaSchema")?;
    let process = req("process_dq_metadata", params, "processName")?;
    let filter = if process == "ALL" {
        String::new()
    } else {
        format!(" WHERE p.PROCESS_CODE = '{process}'")
    };
    Ok(format!(
        "SELECT c.PROCESS_CMD_ID, t.DQ_TEST_NAME, t.TGT_NAME, t.ATTRIBUTE_NAME, \
         t.ACCEPTED_VALUES, t.ERROR_AND_ABORT \
         FROM {meta}.PROCESS p \
         JOIN {meta}.PROCESS_CMD c ON c.PROCESS_ID = p.PROCESS_ID \
         JOIN {meta}.PROCESS_DQ_TEST t ON t.PROCESS_CMD_ID = c.PROCESS_CMD_ID\
         {filter} ORDER BY c.PROCESS_CMD_ID",
    ))
}

fn req<'a>(
    template: &str,
    params: &'a TemplateParams,
    parameter: &str,
) -> Result<&'a str, RenderError> {
    params
        .get(parameter)
        .map(String::as_str)
        .ok_or_else(|| RenderError::MissingParameter {
            template: template.to_string(),
            parameter: parameter.to_string(),
        })
}

fn opt<'a>(params: &'a TemplateParams, parameter: &str) -> &'a str {
    params.get(parameter).map(String::as_str).unwrap_or("")
}

fn where_sql(clause: &str) -> String {
    if clause.trim().is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clause.trim())
    }
}

/// Strips, folds newlines into spaces and collapses repeated spaces, so
/// every rendered statement is a single line.
fn squeeze(sql: &str) -> String {
    sql.trim().split_whitespace().collect::<Vec<_>>().join(" ")
}
