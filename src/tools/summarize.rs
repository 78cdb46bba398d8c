//! Summarization providers: website and video.
//!
//! Both delegate to the completion backend; the summarization services they
//! stand in for are external collaborators, so the adapter only shapes the
//! request and relays the result.

use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{query_param, ToolProvider};
use crate::error::OrchestratorError;
use crate::providers::CompletionClient;

/// Pull the first URL out of free-form text, if any.
fn extract_url(text: &str) -> Option<&str> {
    text.split_whitespace()
        .find(|w| w.starts_with("http://") || w.starts_with("https://"))
        .map(|w| w.trim_end_matches(&[',', '.', ')', ';'][..]))
}

pub struct WebsiteSummarizeTool {
    client: Arc<dyn CompletionClient>,
}

impl WebsiteSummarizeTool {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolProvider for WebsiteSummarizeTool {
    fn name(&self) -> &str {
        "website_summarize"
    }

    fn description(&self) -> &str {
        "Summarize the content of a website"
    }

    async fn invoke(&self, params: &serde_json::Value) -> Result<String, OrchestratorError> {
        let query = query_param(params)?;
        let subject = extract_url(query).unwrap_or(query);
        let prompt =
            format!("Summarize the key points of this website for a busy reader: {subject}");
        self.client.complete(&prompt).await
    }
}

pub struct VideoSummarizeTool {
    client: Arc<dyn CompletionClient>,
}

impl VideoSummarizeTool {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolProvider for VideoSummarizeTool {
    fn name(&self) -> &str {
        "video_summarize"
    }

    fn description(&self) -> &str {
        "Summarize the content of a video"
    }

    async fn invoke(&self, params: &serde_json::Value) -> Result<String, OrchestratorError> {
        let query = query_param(params)?;
        let subject = extract_url(query).unwrap_or(query);
        let prompt = format!("Summarize this video, covering its main points in order: {subject}");
        self.client.complete(&prompt).await
    }
}
