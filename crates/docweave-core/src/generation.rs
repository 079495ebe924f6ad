//! Generation client interface
//!
//! The engine never talks to a text-generation backend directly. It calls a
//! [`DocGenerator`] with the declaration's qualified name and source snippet
//! and expects documentation comment text back. The HTTP implementation lives
//! in the CLI crate; tests and offline runs use [`StaticGenerator`].

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single generation request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The service answered with a non-success status
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The response contained no documentation text
    #[error("empty response")]
    EmptyResponse,

    /// The request exceeded its time limit
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("{message}")]
    Other { message: String },
}

impl GenerationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Produces documentation text for one declaration
///
/// `context_name` is the fully-qualified symbol name (or `Unknown`),
/// `code_snippet` the declaration's source text without leading trivia. The
/// returned text is unindented and newline separated; lines may or may not
/// already carry the `///` prefix.
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(
        &self,
        context_name: &str,
        code_snippet: &str,
    ) -> Result<String, GenerationError>;
}

/// Generator that returns the same text for every declaration
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    text: String,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl DocGenerator for StaticGenerator {
    async fn generate(
        &self,
        _context_name: &str,
        _code_snippet: &str,
    ) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_generator_ignores_input() {
        let generator = StaticGenerator::new("<summary>stub</summary>");
        let first = generator.generate("Foo", "class Foo {}").await.unwrap();
        let second = generator.generate("Bar", "void Bar() {}").await.unwrap();
        assert_eq!(first, "<summary>stub</summary>");
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GenerationError::Status {
                status: 429,
                body: "slow down".into()
            }
            .to_string(),
            "service returned status 429: slow down"
        );
        assert_eq!(
            GenerationError::Timeout { seconds: 30 }.to_string(),
            "timed out after 30s"
        );
    }
}
