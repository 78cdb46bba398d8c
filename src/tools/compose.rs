//! Generative providers: music briefs and writing assistance.

use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{query_param, ToolProvider};
use crate::error::OrchestratorError;
use crate::providers::CompletionClient;

pub struct MusicGenerateTool {
    client: Arc<dyn CompletionClient>,
}

impl MusicGenerateTool {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolProvider for MusicGenerateTool {
    fn name(&self) -> &str {
        "music_generate"
    }

    fn description(&self) -> &str {
        "Produce a music generation brief (style, tempo, instrumentation)"
    }

    async fn invoke(&self, params: &serde_json::Value) -> Result<String, OrchestratorError> {
        let query = query_param(params)?;
        let prompt = format!(
            "Write a music generation brief (style, tempo, key, instrumentation, mood) for: {query}"
        );
        self.client.complete(&prompt).await
    }
}

pub struct WriteAssistTool {
    client: Arc<dyn CompletionClient>,
}

impl WriteAssistTool {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolProvider for WriteAssistTool {
    fn name(&self) -> &str {
        "write_assist"
    }

    fn description(&self) -> &str {
        "Draft structured written content from a short request"
    }

    async fn invoke(&self, params: &serde_json::Value) -> Result<String, OrchestratorError> {
        let query = query_param(params)?;
        let prompt = format!("Draft the requested piece with a clear structure: {query}");
        self.client.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedCompletion;

    #[tokio::test]
    async fn music_tool_relays_completion() {
        let client = Arc::new(ScriptedCompletion::new());
        let tool = MusicGenerateTool::new(client.clone());
        let out = tool
            .invoke(&serde_json::json!({"query": "calm piano for studying"}))
            .await
            .unwrap();
        assert!(!out.is_empty());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn write_tool_rejects_blank_query() {
        let client = Arc::new(ScriptedCompletion::new());
        let tool = WriteAssistTool::new(client.clone());
        let result = tool.invoke(&serde_json::json!({"query": ""})).await;
        assert!(result.is_err());
        assert_eq!(client.call_count(), 0);
    }
}
