use crate::actions::{
    Action, append::AppendAction, copy_into_file::CopyIntoFileAction, delete::DeleteAction,
    dq_test::DqTestAction, merge::MergeAction, refresh::RefreshAction, scd2::Scd2PublishAction,
    truncate::TruncateAction,
};
use model::{
    command::CommandKind,
    dq::DqTestDescriptor,
    meta::ActionMetadata,
    report::{StepParameters, StepReport, StepStatus},
    table::TableMetadata,
};
use std::sync::Arc;

/// A compiled command row: the action plus its step-report stub. The step
/// status is computed here, before execution, so the report exists even
/// for rows that are never run: SKIPPED for inactive rows, NO_EXECUTE for
/// dry runs, SUCCESS only for rows that will actually execute.
pub struct CompiledStep {
    pub action: Action,
    pub report: StepReport,
}

/// Maps normalized action metadata and the schema catalog to a concrete
/// action. Dispatch is a pure match on command kind and refresh sub-type;
/// unrecognized and inactive rows compile to the no-op default.
pub fn compile(
    meta: &ActionMetadata,
    catalog: &Arc<TableMetadata>,
    execute: bool,
    dq_tests: Vec<DqTestDescriptor>,
) -> CompiledStep {
    let status = if !meta.active {
        StepStatus::Skipped
    } else if !execute {
        StepStatus::NoExecute
    } else {
        StepStatus::Success
    };

    let report = StepReport {
        step_id: meta.step_id,
        action: meta.kind_name.clone(),
        status,
        error_message: String::new(),
        parameters: StepParameters::from_meta(meta),
        commands: Vec::new(),
    };

    let action = if meta.active {
        build_action(meta, catalog, dq_tests)
    } else {
        Action::Default
    };

    CompiledStep { action, report }
}

fn build_action(
    meta: &ActionMetadata,
    catalog: &Arc<TableMetadata>,
    dq_tests: Vec<DqTestDescriptor>,
) -> Action {
    match meta.kind {
        Some(CommandKind::Append) => Action::Append(AppendAction {
            source: meta.source.clone(),
            target: meta.target.clone(),
            where_clause: meta.where_clause.clone(),
            metadata: Arc::clone(catalog),
            binds: meta.binds.clone(),
            additional_fields: meta.additional_fields.clone(),
            overwrite: false,
            temp_table: meta.temp_table,
        }),
        Some(CommandKind::Merge) => Action::Merge(MergeAction {
            source: meta.source.clone(),
            target: meta.target.clone(),
            where_clause: meta.where_clause.clone(),
            metadata: Arc::clone(catalog),
            binds: meta.binds.clone(),
            additional_fields: meta.additional_fields.clone(),
            merge_on_fields: meta.merge_on_fields.clone(),
            generate_matched_clause: meta.generate_merge_matched,
            generate_non_matched_clause: meta.generate_merge_non_matched,
            temp_table: meta.temp_table,
        }),
        Some(CommandKind::PublishScd2Dim) => Action::Scd2Publish(Scd2PublishAction {
            source: meta.source.clone(),
            target: meta.target.clone(),
            where_clause: meta.where_clause.clone(),
            metadata: Arc::clone(catalog),
            binds: meta.binds.clone(),
            additional_fields: meta.additional_fields.clone(),
            business_key: meta.business_key.clone(),
            temp_table: meta.temp_table,
        }),
        Some(CommandKind::Refresh) => match meta.refresh_kind {
            Some(kind) => Action::Refresh(RefreshAction {
                kind,
                append: AppendAction {
                    source: meta.source.clone(),
                    target: meta.target.clone(),
                    where_clause: meta.where_clause.clone(),
                    metadata: Arc::clone(catalog),
                    binds: meta.binds.clone(),
                    additional_fields: meta.additional_fields.clone(),
                    overwrite: kind == model::command::RefreshKind::Oi,
                    temp_table: meta.temp_table,
                },
            }),
            None => Action::Default,
        },
        Some(CommandKind::Delete) => Action::Delete(DeleteAction {
            table: meta.source.clone(),
            where_clause: meta.where_clause.clone(),
            binds: meta.binds.clone(),
        }),
        Some(CommandKind::Truncate) => Action::Truncate(TruncateAction {
            target: meta.target.clone(),
        }),
        Some(CommandKind::CopyIntoFile) => Action::CopyIntoFile(CopyIntoFileAction {
            source: meta.source.clone(),
            target: meta.target.clone(),
            where_clause: meta.where_clause.clone(),
            binds: meta.binds.clone(),
        }),
        Some(CommandKind::DqTest) => Action::DqTest(DqTestAction {
            step_id: meta.step_id,
            tests: dq_tests,
        }),
        None => Action::Default,
    }
}
