use thiserror::Error;

use tranche_protocol::ProtocolError;

use crate::amounts::ParseAmountError;

pub type SdkResult<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid amount: {0}")]
    Amount(#[from] ParseAmountError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("allow-list row {row}: {reason}")]
    InvalidAllowlistRow { row: usize, reason: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
