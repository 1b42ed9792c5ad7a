use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelcallError {
    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SelcallError>;
