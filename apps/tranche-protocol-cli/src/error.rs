use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sdk(#[from] tranche_protocol_sdk::SdkError),

    #[error(transparent)]
    Protocol(#[from] tranche_protocol::ProtocolError),

    #[error("Invalid script: {0}")]
    InvalidScript(String),

    #[error("Simulation failed: {0}")]
    Simulation(String),
}
