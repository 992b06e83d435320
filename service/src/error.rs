use std::fmt::{Display, Formatter, Result};

use remote_bridge::BridgeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    BridgeError(BridgeError),
    ConfigError(String),
    InvalidInput(String),
    OperationInProgress,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::BridgeError(err) => write!(f, "Bridge error: {}", err),
            Error::ConfigError(message) => write!(f, "Configuration error: {}", message),
            Error::InvalidInput(message) => write!(f, "Invalid input: {}", message),
            Error::OperationInProgress => write!(f, "Another operation is already in progress"),
        }
    }
}

impl std::error::Error for Error {}

impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        Error::BridgeError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
