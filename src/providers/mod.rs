//! Completion provider subsystem.
//!
//! Each backend implements the [`CompletionClient`] trait defined in
//! [`traits`], and is registered in the factory function
//! [`create_completion_client`] by its canonical string key.

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::{FlakyCompletion, ScriptedCompletion};
pub use openai::OpenAiCompletion;
pub use traits::CompletionClient;

use crate::config::ProviderConfig;
use std::sync::Arc;

const MAX_API_ERROR_CHARS: usize = 200;

/// Scrub known secret-like token prefixes from provider error strings.
pub fn scrub_secret_patterns(input: &str) -> String {
    const PREFIXES: [&str; 2] = ["sk-", "Bearer "];

    let mut scrubbed = input.to_string();
    for prefix in PREFIXES {
        while let Some(start) = scrubbed.find(prefix) {
            let content_start = start + prefix.len();
            let end = content_start
                + scrubbed[content_start..]
                    .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
                    .unwrap_or(scrubbed.len() - content_start);
            if end == content_start {
                break;
            }
            scrubbed.replace_range(start..end, "[REDACTED]");
        }
    }
    scrubbed
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }

    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}

/// Factory: create the right completion client from config.
pub fn create_completion_client(
    config: &ProviderConfig,
) -> anyhow::Result<Arc<dyn CompletionClient>> {
    match config.name.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiCompletion::new(config))),
        "scripted" => Ok(Arc::new(ScriptedCompletion::new())),
        other => anyhow::bail!(
            "Unknown completion provider: {other}. Supported: \"openai\", \"scripted\"."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_openai() {
        let config = ProviderConfig::default();
        let client = create_completion_client(&config).unwrap();
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn factory_scripted() {
        let config = ProviderConfig {
            name: "scripted".to_string(),
            ..ProviderConfig::default()
        };
        let client = create_completion_client(&config).unwrap();
        assert_eq!(client.name(), "scripted");
    }

    #[test]
    fn factory_unknown_provider_errors() {
        let config = ProviderConfig {
            name: "nonexistent".to_string(),
            ..ProviderConfig::default()
        };
        let result = create_completion_client(&config);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Unknown"));
    }

    #[test]
    fn sanitize_scrubs_sk_prefix() {
        let input = "request failed: sk-1234567890abcdef";
        let out = sanitize_api_error(input);
        assert!(!out.contains("sk-1234567890abcdef"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn sanitize_truncates_long_error() {
        let long = "a".repeat(400);
        let result = sanitize_api_error(&long);
        assert!(result.len() <= 203);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn sanitize_no_secret_no_change() {
        let input = "simple upstream timeout";
        assert_eq!(sanitize_api_error(input), input);
    }
}
