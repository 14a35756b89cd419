use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Missing required credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Completion contained no text")]
    EmptyCompletion,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("All {0} report sections failed to generate")]
    AllSectionsFailed(usize),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
