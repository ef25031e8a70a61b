use thiserror::Error;

/// Library error type. Expected verification results (invalid key, exhausted
/// quota, provider refuses bare-credential validation) are `ValidationOutcome`
/// values, not errors; only transport and infrastructure faults land here.
#[derive(Error, Debug)]
pub enum LeakwatchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Curl error: {0}")]
    Curl(#[from] curl::Error),

    #[error("Probe timed out after {0}s")]
    ProbeTimeout(u64),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Unknown provider type: {0}")]
    UnknownProvider(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LeakwatchError {
    /// Whether this is a transport-level fault. The verification engine treats
    /// these as retryable: candidate status is preserved and only the error
    /// counter advances.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            LeakwatchError::Http(_) | LeakwatchError::Curl(_) | LeakwatchError::ProbeTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LeakwatchError>;
