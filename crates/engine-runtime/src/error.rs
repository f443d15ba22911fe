use connectors::error::{CatalogError, StoreError, WarehouseError};
use engine_core::error::ActionError;
use model::error::ModelError;
use renderer::error::RenderError;
use thiserror::Error;

/// Top-level errors for the transformation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Metadata error: {0}")]
    Model(#[from] ModelError),

    #[error("Metadata store error: {0}")]
    Store(#[from] StoreError),

    #[error("Schema introspection error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("SQL generation error: {0}")]
    Action(#[from] ActionError),

    #[error("Template error: {0}")]
    Render(#[from] RenderError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),
}
