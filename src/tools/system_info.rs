//! Local host report tool. The only provider that needs no completion call.

use async_trait::async_trait;
use chrono::Utc;

use super::traits::ToolProvider;
use crate::error::OrchestratorError;

pub struct SystemInfoTool;

impl SystemInfoTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProvider for SystemInfoTool {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Report host platform, architecture, and current time"
    }

    async fn invoke(&self, _params: &serde_json::Value) -> Result<String, OrchestratorError> {
        Ok(format!(
            "os: {} | arch: {} | time: {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            Utc::now().to_rfc3339(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_platform_fields() {
        let tool = SystemInfoTool::new();
        let out = tool.invoke(&serde_json::json!({})).await.unwrap();
        assert!(out.contains("os:"));
        assert!(out.contains("arch:"));
        assert!(out.contains(std::env::consts::OS));
    }

    #[tokio::test]
    async fn output_is_deterministic_in_shape() {
        let tool = SystemInfoTool::new();
        let a = tool.invoke(&serde_json::json!({})).await.unwrap();
        let b = tool.invoke(&serde_json::json!({})).await.unwrap();
        assert_eq!(a.split('|').count(), b.split('|').count());
    }
}
