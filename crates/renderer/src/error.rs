use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// No template is registered for the requested action kind.
    #[error("no SQL template registered for action `{0}`")]
    UnknownTemplate(String),

    /// A template referenced a parameter the caller did not supply.
    #[error("template `{template}` is missing required parameter `{parameter}`")]
    MissingParameter { template: String, parameter: String },
}
