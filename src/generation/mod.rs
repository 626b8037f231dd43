//! Text generation boundary.
//!
//! Everything above this module sees a single operation: prompt in,
//! text out, or a `GenerationError`. `OllamaClient` is the production
//! backend; `mock` holds deterministic doubles for tests.

pub mod mock;
pub mod ollama;

pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model not available: {0}")]
    NoModel(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Prompt-to-text generation. Implementations must be shareable across the
/// specialist worker threads.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}
