use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the configuration file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("Failed to parse the configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Could not determine the home directory")]
    HomeDirectory,

    #[error("Invalid session variables: {0}")]
    InvalidVariables(String),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Run finished with status {0}")]
    RunFailed(String),
}
