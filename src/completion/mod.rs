//! Chat completion backends
//!
//! The relay forwards one `[system, user]` exchange per request. The
//! backend trait keeps the HTTP routes testable without a live Azure
//! resource.

pub mod azure;

pub use azure::AzureOpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Content returned when the model answers with an empty message
pub const EMPTY_CONTENT: &str = "Model returned empty content.";

/// One completion call, credentials included
#[derive(Clone)]
pub struct CompletionRequest {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl std::fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("user_prompt_chars", &self.user_prompt.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Text of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Upstream failures, rendered as the `detail` the relay returns
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Azure OpenAI Authentication Error: {0}")]
    Authentication(String),

    #[error("Azure OpenAI Rate Limit Exceeded: {0}")]
    RateLimited(String),

    #[error("Azure OpenAI Bad Request Error: {0}")]
    BadRequest(String),

    /// Any other upstream status, or the upstream could not be reached
    #[error("Azure OpenAI API Error: {0}")]
    Api(String),

    #[error("Failed to get valid response from OpenAI model.")]
    MissingChoices,

    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl CompletionError {
    /// Map an upstream HTTP failure to its variant
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("Error code: {} - {}", status, body);
        match status {
            400 => CompletionError::BadRequest(message),
            401 => CompletionError::Authentication(message),
            429 => CompletionError::RateLimited(message),
            _ => CompletionError::Api(message),
        }
    }

    /// HTTP status the relay answers with
    pub fn status_code(&self) -> u16 {
        match self {
            CompletionError::Authentication(_) => 401,
            CompletionError::RateLimited(_) => 429,
            CompletionError::BadRequest(_) => 400,
            CompletionError::Api(_) | CompletionError::MissingChoices | CompletionError::Internal(_) => 500,
        }
    }
}
