use renderer::error::RenderError;
use thiserror::Error;

/// Errors raised while an action renders its SQL commands. All of them
/// surface as the owning step's ERROR status and halt the run.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Positional binds must be numbered contiguously from `:1`.
    #[error("non-contiguous bind placeholders: `:{found}` is referenced but `:{missing}` is not")]
    NonContiguousBinds { found: u32, missing: u32 },

    /// A merge was declared without any merge-on field.
    #[error("MERGE into `{0}` requires at least one merge-on field")]
    EmptyMergeKeys(String),

    /// An SCD2 publish was declared without a business key.
    #[error("PUBLISH_SCD2_DIM into `{0}` requires a business key")]
    EmptyBusinessKey(String),
}
