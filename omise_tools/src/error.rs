use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmiseApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The request to Omise timed out")]
    Timeout,
    #[error("Could not reach Omise: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Omise rejected the request ({code}): {message}")]
    Api { code: String, message: String },
    #[error("Unexpected response from Omise: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for OmiseApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OmiseApiError::Timeout
        } else if e.is_decode() {
            OmiseApiError::JsonError(e.to_string())
        } else {
            OmiseApiError::Transport(e.to_string())
        }
    }
}
