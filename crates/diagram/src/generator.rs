use crate::backend::ChatBackend;
use crate::error::{DiagramError, Result};
use crate::extractor::InteractionExtractor;
use crate::prompts;
use crate::renderer::DiagramRenderer;
use codeflow_chunker::Chunk;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Drives diagram generation: static extraction first, validated backend
/// fallback with bounded exponential backoff second.
pub struct DiagramGenerator<B> {
    backend: B,
    max_attempts: u32,
    backoff_base: Duration,
}

impl<B: ChatBackend> DiagramGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    /// Override the retry policy for the fallback path
    #[must_use]
    pub fn with_retry_policy(mut self, max_attempts: u32, backoff_base: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff_base = backoff_base;
        self
    }

    /// Generate diagram text for the chunk set.
    ///
    /// The static path (extract + render + validate) wins when it produces
    /// a valid document. Otherwise the chat backend is prompted; its output
    /// is never trusted without passing validation, and transport failures
    /// retry with exponential backoff up to the attempt bound.
    pub async fn generate(&self, chunks: &[Chunk]) -> Result<String> {
        match Self::generate_static(chunks) {
            Ok(text) => {
                log::info!("Generated sequence diagram from static extraction");
                return Ok(text);
            }
            Err(e) => {
                log::warn!("Static diagram generation failed ({e}), falling back to chat backend");
            }
        }

        let user_prompt = prompts::user_prompt(chunks);

        for attempt in 1..=self.max_attempts {
            match self.backend.complete(prompts::SYSTEM_PROMPT, &user_prompt).await {
                Ok(candidate) => {
                    let candidate = candidate.trim().to_string();
                    if DiagramRenderer::validate(&candidate) {
                        log::info!("Chat backend produced a valid diagram on attempt {attempt}");
                        return Ok(candidate);
                    }
                    log::warn!("Attempt {attempt}: backend candidate failed validation");
                }
                Err(e) => {
                    log::warn!("Attempt {attempt}: backend call failed: {e}");
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }
        }

        Err(DiagramError::ServiceExhausted {
            attempts: self.max_attempts,
        })
    }

    /// The static path alone: extract interactions and render them
    pub fn generate_static(chunks: &[Chunk]) -> Result<String> {
        let doc = InteractionExtractor::new().extract(chunks)?;
        DiagramRenderer::render(&doc)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt - 1)
    }
}
