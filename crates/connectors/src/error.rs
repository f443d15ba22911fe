use thiserror::Error;

/// Errors surfaced by a warehouse session.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The warehouse rejected a submitted statement.
    #[error("statement execution failed: {0}")]
    Execution(String),

    /// HTTP transport failure talking to the warehouse endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The warehouse answered with a payload the session cannot interpret.
    #[error("malformed warehouse response: {0}")]
    Response(String),
}

/// Errors raised while building the schema catalog. Any of these aborts
/// the whole run; no partial catalog is ever used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("introspection query failed for schema `{schema}`: {source}")]
    Introspection {
        schema: String,
        source: WarehouseError,
    },

    #[error("primary-key describe failed for table `{table}`: {source}")]
    PrimaryKeyDescribe {
        table: String,
        source: WarehouseError,
    },
}

/// Errors raised while reading process metadata from the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fetching process metadata failed: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("rendering metadata query failed: {0}")]
    Render(#[from] renderer::error::RenderError),

    #[error("malformed metadata row: {0}")]
    MalformedRow(String),

    #[error("no command rows found for process `{0}`")]
    UnknownProcess(String),
}
