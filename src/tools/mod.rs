//! Tool subsystem for named external capabilities.
//!
//! Each capability implements the [`ToolProvider`] trait defined in
//! [`traits`] and is assembled into a [`ToolRegistry`] by [`default_tools`].
//! The registry is the uniform adapter the executor invokes through; unknown
//! tool names are a caller input problem, not a transient failure.

pub mod compose;
pub mod summarize;
pub mod system_info;
pub mod traits;

pub use compose::{MusicGenerateTool, WriteAssistTool};
pub use summarize::{VideoSummarizeTool, WebsiteSummarizeTool};
pub use system_info::SystemInfoTool;
pub use traits::ToolProvider;

use crate::error::OrchestratorError;
use crate::providers::CompletionClient;
use std::collections::HashMap;
use std::sync::Arc;

/// Named capability providers with a uniform invocation surface.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolProvider>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn ToolProvider>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Invoke a named capability exactly once.
    pub async fn invoke(
        &self,
        name: &str,
        params: &serde_json::Value,
    ) -> Result<String, OrchestratorError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| OrchestratorError::InvalidRequest(format!("unknown tool: {name}")))?;
        tracing::debug!(tool = name, "invoking tool provider");
        tool.invoke(params).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the default capability registry (5 providers).
pub fn default_tools(client: Arc<dyn CompletionClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SystemInfoTool::new()));
    registry.register(Arc::new(WebsiteSummarizeTool::new(client.clone())));
    registry.register(Arc::new(VideoSummarizeTool::new(client.clone())));
    registry.register(Arc::new(MusicGenerateTool::new(client.clone())));
    registry.register(Arc::new(WriteAssistTool::new(client)));
    registry
}
