use reqwest::StatusCode;
use rl_gate::GateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("Request cancelled while waiting for admission")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<GateError> for HttpError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Cancelled => HttpError::Cancelled,
            GateError::InvalidConfig(msg) => HttpError::InvalidConfig(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
