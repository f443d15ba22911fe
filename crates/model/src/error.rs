use thiserror::Error;

/// Validation errors raised while normalizing a command row. These surface
/// before any SQL for the step is rendered or executed.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A bind name referenced by the row is absent from the caller-supplied
    /// session variables.
    #[error("bind variable `{0}` does not exist in session variables")]
    MissingBindVariable(String),

    /// An additional-field entry did not split into expression and alias.
    #[error("malformed additional field entry `{0}`, expected `<expression> <alias>`")]
    MalformedAdditionalField(String),
}
