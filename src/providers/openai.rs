//! OpenAI-compatible completion backend.
//!
//! Most hosted completion APIs follow the same `/v1/chat/completions` format,
//! so a single adapter covers OpenAI itself plus compatible gateways via a
//! base-URL override.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::sanitize_api_error;
use super::traits::CompletionClient;
use crate::config::ProviderConfig;
use crate::error::OrchestratorError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiCompletion {
    base_url: String,
    api_key: Option<String>,
    model: String,
    call_timeout: Duration,
    client: Client,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompletion {
    pub fn new(config: &ProviderConfig) -> Self {
        let call_timeout = Duration::from_secs(config.call_timeout_secs.max(1));
        Self {
            base_url: config
                .api_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: resolve_api_key(config),
            model: config.model.clone(),
            call_timeout,
            client: Client::builder()
                .timeout(call_timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Build the chat completions URL, tolerating base URLs that already
    /// include the full endpoint path.
    fn chat_completions_url(&self) -> String {
        if self
            .base_url
            .trim_end_matches('/')
            .ends_with("/chat/completions")
        {
            self.base_url.clone()
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }

    fn map_status_error(&self, status: StatusCode, body: &str) -> OrchestratorError {
        let sanitized = sanitize_api_error(body);
        match status {
            StatusCode::TOO_MANY_REQUESTS => OrchestratorError::RateLimited {
                provider: self.name().to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                OrchestratorError::PermissionDenied(sanitized)
            }
            s if s.is_server_error() => OrchestratorError::Unavailable {
                provider: self.name().to_string(),
                message: format!("{s}: {sanitized}"),
            },
            s => OrchestratorError::InvalidRequest(format!("{s}: {sanitized}")),
        }
    }
}

fn resolve_api_key(config: &ProviderConfig) -> Option<String> {
    if let Ok(value) = std::env::var("MAESTRO_API_KEY") {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
}

#[async_trait]
impl CompletionClient for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, OrchestratorError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut request = self.client.post(self.chat_completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OrchestratorError::Timeout {
                    operation: "complete".to_string(),
                    seconds: self.call_timeout.as_secs(),
                }
            } else {
                OrchestratorError::Unavailable {
                    provider: self.name().to_string(),
                    message: sanitize_api_error(&e.to_string()),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_status_error(status, &body));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            OrchestratorError::Unavailable {
                provider: self.name().to_string(),
                message: format!("malformed response: {e}"),
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OrchestratorError::Unavailable {
                provider: self.name().to_string(),
                message: "response contained no choices".to_string(),
            })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(url: Option<&str>) -> OpenAiCompletion {
        let config = ProviderConfig {
            api_url: url.map(ToString::to_string),
            api_key: Some("test-key".to_string()),
            ..ProviderConfig::default()
        };
        OpenAiCompletion::new(&config)
    }

    #[test]
    fn default_url_appends_endpoint() {
        let client = test_client(None);
        assert_eq!(
            client.chat_completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn explicit_endpoint_url_is_kept() {
        let client = test_client(Some("http://localhost:8080/v1/chat/completions"));
        assert_eq!(
            client.chat_completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = test_client(Some("http://localhost:11434/v1/"));
        assert_eq!(
            client.chat_completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn status_mapping_covers_taxonomy() {
        let client = test_client(None);
        assert!(matches!(
            client.map_status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            OrchestratorError::RateLimited { .. }
        ));
        assert!(matches!(
            client.map_status_error(StatusCode::BAD_GATEWAY, "upstream down"),
            OrchestratorError::Unavailable { .. }
        ));
        assert!(matches!(
            client.map_status_error(StatusCode::UNAUTHORIZED, "bad key"),
            OrchestratorError::PermissionDenied(_)
        ));
        assert!(matches!(
            client.map_status_error(StatusCode::BAD_REQUEST, "missing model"),
            OrchestratorError::InvalidRequest(_)
        ));
    }

    #[test]
    fn transient_statuses_are_retryable() {
        let client = test_client(None);
        assert!(client
            .map_status_error(StatusCode::TOO_MANY_REQUESTS, "")
            .is_transient());
        assert!(client
            .map_status_error(StatusCode::SERVICE_UNAVAILABLE, "")
            .is_transient());
        assert!(!client
            .map_status_error(StatusCode::BAD_REQUEST, "")
            .is_transient());
    }
}
