//! Error types for Pexels API calls.

use thiserror::Error;

pub type PexelsResult<T> = Result<T, PexelsError>;

#[derive(Debug, Error)]
pub enum PexelsError {
    #[error(
        "No Pexels API key configured. Set {} or add api_key under [pexels] in the config file",
        crate::config::API_KEY_ENV
    )]
    MissingApiKey,

    #[error("Pexels rejected the API key (status {0}). Check your Pexels API key")]
    Unauthorized(u16),

    #[error("Pexels rate limit reached, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    #[error("Pexels request failed ({code}): {body}")]
    Status { code: u16, body: String },

    #[error("Failed to reach Pexels: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse Pexels response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PexelsError {
    /// Map a non-success status and body to an error.
    pub fn from_status(code: u16, body: String, retry_after: Option<u64>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(code),
            429 => Self::RateLimited { retry_after },
            _ => Self::Status { code, body },
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Status { code, .. } => *code >= 500,
            Self::Transport(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}
