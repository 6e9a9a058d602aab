use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a chat backend implementation
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport-level failure (network, HTTP status, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but produced no usable text
    #[error("Backend returned an empty completion")]
    Empty,
}

/// External chat/LLM collaborator.
///
/// Invoked only when static extraction cannot produce a valid diagram.
/// The core treats the completion as an opaque diagram-text candidate and
/// always validates it before trusting it.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Request a completion for the given prompts
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, BackendError>;
}
