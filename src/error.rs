use std::io;

use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum WikiError {
    #[error("Invalid page title: {0:?}")]
    InvalidTitle(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Template render error: {0}")]
    Render(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Service error: {0}")]
    Service(String),
}

impl WikiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WikiError::InvalidTitle(_) => StatusCode::NOT_FOUND,
            WikiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WikiError::NotFound(_) => StatusCode::NOT_FOUND,
            WikiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WikiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WikiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WikiError::NotFound(_))
    }
}

impl From<toml::de::Error> for WikiError {
    fn from(src: toml::de::Error) -> WikiError {
        WikiError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for WikiError {
    fn from(src: toml::ser::Error) -> WikiError {
        WikiError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<io::Error> for WikiError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => WikiError::NotFound(format!("{x}")),
            kind => WikiError::Io(format!("IOError: {kind}: {x}")),
        }
    }
}
