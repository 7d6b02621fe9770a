use gameservices_common::ContractError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    /// Non-success status from the management API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The pre-authorized blob upload failed after the metadata POST
    /// succeeded. The entity exists server-side but was never confirmed.
    #[error("Failed to upload {file_name} for {instance} (entity {entity_id}): {message}")]
    Storage {
        instance: String,
        entity_id: String,
        file_name: String,
        message: String,
    },

    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// HTTP status associated with the failure, if it has one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::NotFound { .. } => Some(404),
            SdkError::Validation(_) => Some(400),
            SdkError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound { .. })
    }
}

impl From<ContractError> for SdkError {
    fn from(err: ContractError) -> Self {
        SdkError::Validation(err.to_string())
    }
}

impl From<roxmltree::Error> for SdkError {
    fn from(err: roxmltree::Error) -> Self {
        SdkError::Xml(err.to_string())
    }
}
