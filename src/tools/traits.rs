//! Tool provider traits and types.

use async_trait::async_trait;

use crate::error::OrchestratorError;

/// A named external capability consumed through a uniform request/response
/// interface. Providers fail independently; the error taxonomy tells the
/// retry handler whether an invocation may be re-attempted.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Registry name of this capability (e.g. `"system_info"`).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Invoke the capability once with JSON parameters.
    async fn invoke(&self, params: &serde_json::Value) -> Result<String, OrchestratorError>;
}

/// Extract the `query` string parameter common to all bundled providers.
pub fn query_param(params: &serde_json::Value) -> Result<&str, OrchestratorError> {
    params
        .get("query")
        .and_then(|v| v.as_str())
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| {
            OrchestratorError::InvalidRequest("missing \"query\" parameter".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_string() {
        let params = serde_json::json!({"query": "summarize this"});
        assert_eq!(query_param(&params).unwrap(), "summarize this");
    }

    #[test]
    fn query_param_rejects_missing_or_blank() {
        assert!(query_param(&serde_json::json!({})).is_err());
        assert!(query_param(&serde_json::json!({"query": "  "})).is_err());
        assert!(query_param(&serde_json::json!({"query": 42})).is_err());
    }
}
