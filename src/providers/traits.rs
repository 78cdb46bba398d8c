//! Completion client abstraction over text-completion backends.

use async_trait::async_trait;

use crate::error::OrchestratorError;

/// A text-completion backend.
///
/// The engine treats this as its only language surface: routing, collaboration
/// sub-tasks, and direct replies all go through `complete`. Failures map onto
/// the shared taxonomy so the retry handler can classify them.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a single prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, OrchestratorError>;

    /// The name of this completion backend.
    fn name(&self) -> &str;
}
