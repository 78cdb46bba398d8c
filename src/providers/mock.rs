//! Test doubles for the completion client.
//!
//! Used by the crate's own tests and useful to embedding hosts that want to
//! exercise the engine without network access.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::traits::CompletionClient;
use crate::error::OrchestratorError;

/// Echo-style client: answers every prompt with a deterministic line derived
/// from the prompt. Records every prompt it sees.
#[derive(Default)]
pub struct ScriptedCompletion {
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// All prompts received so far, in call order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, OrchestratorError> {
        self.prompts.lock().push(prompt.to_string());
        let head: String = prompt.chars().take(60).collect();
        Ok(format!("[scripted] {head}"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Client that fails the first `fail_times` calls with a transient error,
/// then behaves like [`ScriptedCompletion`]. `usize::MAX` fails forever.
pub struct FlakyCompletion {
    fail_times: usize,
    attempts: AtomicUsize,
}

impl FlakyCompletion {
    pub fn new(fail_times: usize) -> Self {
        Self {
            fail_times,
            attempts: AtomicUsize::new(0),
        }
    }

    /// A client that never succeeds.
    pub fn always_failing() -> Self {
        Self::new(usize::MAX)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FlakyCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, OrchestratorError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            return Err(OrchestratorError::Unavailable {
                provider: self.name().to_string(),
                message: format!("simulated outage (attempt {})", attempt + 1),
            });
        }
        let head: String = prompt.chars().take(60).collect();
        Ok(format!("[flaky] {head}"))
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
