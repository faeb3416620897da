use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while asking the backend for a turn
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("could not reach agent backend: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("agent backend returned status {0}")]
    Status(StatusCode),

    #[error("agent backend sent a malformed reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("agent task did not complete: {0}")]
    TaskFailed(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
