#[cfg(test)]
mod tests {
    use crate::{MockWarehouse, row, show_column};
    use connectors::{catalog::SchemaCatalog, warehouse::Warehouse};
    use engine_runtime::{app::App, process::ProcessOutcome};
    use model::{
        command::CommandRow,
        meta::SessionVariables,
        report::{RunReport, RunStatus, StepStatus},
    };
    use renderer::templates::TemplateCatalog;
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    const META_SCHEMA: &str = "TW_MD_SCHEMA";
    const DATABASE: &str = "ANALYTICS";

    /// Scripts warehouse responses for a two-step LOAD_CUST process: an
    /// append of staged orders followed by a keyed merge into the customer
    /// dimension, with a sequence behind the dimension's surrogate key.
    fn load_cust_warehouse() -> Arc<MockWarehouse> {
        let warehouse = Arc::new(MockWarehouse::new());

        warehouse.script(
            "t.DQ_TEST_NAME",
            vec![row(&[
                ("PROCESS_CMD_ID", json!(30)),
                ("DQ_TEST_NAME", json!("UNIQUENESS")),
                ("TGT_NAME", json!("DW.ORDERS")),
                ("ATTRIBUTE_NAME", json!("ORDER_ID")),
                ("ACCEPTED_VALUES", json!(null)),
                ("ERROR_AND_ABORT", json!("N")),
            ])],
        );
        warehouse.script(
            "c.CMD_TYPE",
            vec![
                row(&[
                    ("PROCESS_CMD_ID", json!(10)),
                    ("CMD_TYPE", json!("APPEND")),
                    ("CMD_SRC", json!("STG.ORDERS")),
                    ("CMD_TGT", json!("DW.ORDERS")),
                    ("CMD_WHERE", json!("COBID = :1")),
                    ("CMD_BINDS", json!("COBID")),
                    ("ACTIVE", json!("Y")),
                ]),
                row(&[
                    ("PROCESS_CMD_ID", json!(20)),
                    ("CMD_TYPE", json!("MERGE")),
                    ("CMD_SRC", json!("STG.CUST")),
                    ("CMD_TGT", json!("DW.CUST_DIM")),
                    ("MERGE_ON_FIELDS", json!("CUST_ID")),
                    ("GENERATE_MERGE_MATCHED_CLAUSE", json!("Y")),
                    ("GENERATE_MERGE_NON_MATCHED_CLAUSE", json!("Y")),
                    ("ACTIVE", json!("Y")),
                ]),
                row(&[
                    ("PROCESS_CMD_ID", json!(30)),
                    ("CMD_TYPE", json!("DQ_TEST")),
                    ("ACTIVE", json!("Y")),
                ]),
            ],
        );

        warehouse.script(
            "SHOW COLUMNS IN SCHEMA ANALYTICS.STG",
            vec![
                show_column("STG", "ORDERS", "ORDER_ID"),
                show_column("STG", "ORDERS", "AMOUNT"),
                show_column("STG", "ORDERS", "COBID"),
                show_column("STG", "CUST", "CUST_ID"),
                show_column("STG", "CUST", "CUST_NAME"),
            ],
        );
        warehouse.script(
            "SHOW COLUMNS IN SCHEMA ANALYTICS.DW",
            vec![
                show_column("DW", "ORDERS", "ORDER_ID"),
                show_column("DW", "ORDERS", "AMOUNT"),
                show_column("DW", "ORDERS", "COBID"),
                show_column("DW", "CUST_DIM", "CUSTOMER_KEY"),
                show_column("DW", "CUST_DIM", "CUST_ID"),
                show_column("DW", "CUST_DIM", "CUST_NAME"),
            ],
        );
        warehouse.script(
            "SEQUENCE_SCHEMA = 'DW'",
            vec![row(&[("SEQUENCE_NAME", json!("DW.SEQ_CUST_DIM"))])],
        );

        warehouse
    }

    fn session() -> SessionVariables {
        [("COBID".to_string(), "20210401".to_string())]
            .into_iter()
            .collect()
    }

    async fn run_app(
        warehouse: &Arc<MockWarehouse>,
        process: &str,
        execute: bool,
    ) -> ProcessOutcome {
        let as_warehouse: Arc<dyn Warehouse> = warehouse.clone();
        let app = App::new(
            as_warehouse,
            Arc::new(TemplateCatalog::new()),
            META_SCHEMA,
            DATABASE,
        );
        app.run_process(process, session(), execute).await
    }

    #[traced_test]
    #[tokio::test]
    async fn load_cust_runs_end_to_end() {
        let warehouse = load_cust_warehouse();
        let outcome = run_app(&warehouse, "load_cust", true).await;

        assert_eq!(outcome.report.process, "LOAD_CUST");
        assert_eq!(outcome.report.status, RunStatus::Success);
        assert_eq!(outcome.report.steps.len(), 3);
        assert!(
            outcome
                .report
                .steps
                .iter()
                .all(|s| s.status == StepStatus::Success)
        );

        let append = &outcome.report.steps[0].commands[0];
        assert!(append.starts_with(
            "INSERT INTO DW.ORDERS (ORDER_ID, AMOUNT, COBID) \
             SELECT ORDER_ID, AMOUNT, COBID FROM STG.ORDERS WHERE COBID = :1"
        ));

        let merge = &outcome.report.steps[1].commands[0];
        assert!(merge.contains("ON s.cust_id = t.cust_id"));
        assert!(merge.contains("WHEN MATCHED THEN UPDATE SET t.CUST_NAME = s.CUST_NAME"));
        assert!(merge.contains(
            "WHEN NOT MATCHED THEN INSERT (CUSTOMER_KEY, CUST_ID, CUST_NAME) \
             VALUES (DW.SEQ_CUST_DIM.nextval, s.CUST_ID, s.CUST_NAME)"
        ));

        // The append's bind value reached the warehouse alongside its SQL.
        let submitted = warehouse.submitted();
        let (_, binds) = submitted
            .iter()
            .find(|(sql, _)| sql.starts_with("INSERT INTO DW.ORDERS"))
            .expect("append was submitted");
        assert_eq!(binds, &vec!["20210401".to_string()]);
    }

    #[tokio::test]
    async fn live_run_persists_report_and_dq_logs() {
        let warehouse = load_cust_warehouse();
        let outcome = run_app(&warehouse, "LOAD_CUST", true).await;
        assert_eq!(outcome.dq_logs.len(), 1);

        let submitted = warehouse.submitted();
        let (_, binds) = submitted
            .iter()
            .find(|(sql, _)| sql.contains("INSERT INTO TW_MD_SCHEMA.PROCESS_LOG"))
            .expect("run log was persisted");
        assert_eq!(binds.len(), 9);
        assert_eq!(binds[0], outcome.report.run_id);
        assert_eq!(binds[1], "LOAD_CUST");
        assert_eq!(binds[6], "SUCCESS");
        let report: RunReport = serde_json::from_str(&binds[8]).expect("report json");
        assert_eq!(report.steps.len(), 3);

        let (_, binds) = submitted
            .iter()
            .find(|(sql, _)| sql.contains("INSERT INTO TW_MD_SCHEMA.PROCESS_DQ_LOG"))
            .expect("dq log was persisted");
        assert_eq!(binds.len(), 10);
        assert_eq!(binds[2], "uniqueness");
        assert_eq!(binds[8], "PASSED");
    }

    #[tokio::test]
    async fn dry_run_submits_only_reads() {
        let warehouse = load_cust_warehouse();
        let outcome = run_app(&warehouse, "LOAD_CUST", false).await;

        assert_eq!(outcome.report.status, RunStatus::NoExecute);
        assert_eq!(outcome.report.steps.len(), 3);
        assert_eq!(outcome.report.steps[0].status, StepStatus::NoExecute);
        assert_eq!(outcome.report.steps[1].status, StepStatus::NoExecute);
        // The quality check ran for real, so it reports SUCCESS.
        assert_eq!(outcome.report.steps[2].status, StepStatus::Success);
        // SQL is still rendered into the report.
        assert!(!outcome.report.steps[0].commands.is_empty());

        let submitted = warehouse.submitted_sql();
        assert!(!submitted.iter().any(|sql| sql.starts_with("INSERT INTO DW.")));
        assert!(!submitted.iter().any(|sql| sql.starts_with("MERGE INTO")));
        assert!(!submitted.iter().any(|sql| sql.contains("PROCESS_LOG")));
    }

    #[tokio::test]
    async fn primary_keys_come_back_through_the_describe_round_trip() {
        let warehouse = Arc::new(MockWarehouse::new());
        warehouse.script(
            "SHOW COLUMNS IN SCHEMA ANALYTICS.DW",
            vec![
                show_column("DW", "CUST_DIM", "CUST_ID"),
                show_column("DW", "CUST_DIM", "CUST_NAME"),
            ],
        );
        warehouse.script(
            "TABLE_CONSTRAINTS",
            vec![row(&[("TABLE_NAME", json!("DW.CUST_DIM"))])],
        );
        warehouse.script(
            "01b0-mock-query-id",
            vec![
                row(&[
                    ("name", json!("CUST_ID")),
                    ("kind", json!("COLUMN")),
                    ("primary key", json!("Y")),
                ]),
                row(&[
                    ("name", json!("CUST_NAME")),
                    ("kind", json!("COLUMN")),
                    ("primary key", json!("N")),
                ]),
            ],
        );

        let rows = vec![CommandRow {
            cmd_tgt: Some("DW.CUST_DIM".into()),
            ..Default::default()
        }];
        let metadata = SchemaCatalog::new(warehouse.as_ref(), "ANALYTICS")
            .load(&rows)
            .await
            .expect("catalog load");

        let columns = metadata.columns("DW.CUST_DIM", false);
        assert!(
            columns
                .iter()
                .any(|c| c.name == "CUST_ID" && c.is_primary_key)
        );
        assert!(
            columns
                .iter()
                .any(|c| c.name == "CUST_NAME" && !c.is_primary_key)
        );
        // The describe itself is the only statement the table needed.
        assert!(
            warehouse
                .submitted_sql()
                .iter()
                .any(|sql| sql == "DESC TABLE DW.CUST_DIM")
        );
    }

    #[tokio::test]
    async fn unknown_process_fails_without_steps() {
        let warehouse = Arc::new(MockWarehouse::new());
        let outcome = run_app(&warehouse, "MISSING", true).await;

        assert_eq!(outcome.report.status, RunStatus::Error);
        assert!(outcome.report.steps.is_empty());
        assert!(outcome.report.error_message.contains("MISSING"));
    }

    #[tokio::test]
    async fn introspection_failure_aborts_before_any_step() {
        let warehouse = load_cust_warehouse();
        warehouse.fail_on("SHOW COLUMNS IN SCHEMA ANALYTICS.DW");
        let outcome = run_app(&warehouse, "LOAD_CUST", true).await;

        assert_eq!(outcome.report.status, RunStatus::Error);
        assert!(outcome.report.steps.is_empty());
        assert!(
            !warehouse
                .submitted_sql()
                .iter()
                .any(|sql| sql.starts_with("INSERT INTO DW."))
        );
    }
}
